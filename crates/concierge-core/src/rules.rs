//! # Compatibility / Business Rules Engine
//!
//! Declarative rules evaluated against a candidate item and the items already
//! in its room.
//!
//! ## Evaluation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  check_compatibility(candidate, existing, room)                         │
//! │                                                                         │
//! │  rules (sorted by priority, lowest first)                               │
//! │     │                                                                   │
//! │     ├── candidate outside rule scope? ──► skip                          │
//! │     │                                                                   │
//! │     └── dispatch on RuleKind                                            │
//! │           MutuallyExclusive ──► Conflict + ids to evict                 │
//! │           Requires          ──► Conflict (default: warning)             │
//! │           Prevents          ──► Conflict + ids of preventing items      │
//! │           Enhances          ──► Suggestion (never blocks)               │
//! │                                                                         │
//! │  room-level item checks (validation.rs)                                 │
//! │                                                                         │
//! │  ValidationResult { is_valid = errors.is_empty(), ... }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every rule is evaluated; nothing short-circuits, so the caller always gets
//! the full conflict set. Evaluation never fails: every outcome is data.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::room::RoomBooking;
use crate::types::{categories, BookingItem, ItemType};
use crate::validation::check_item_against_room;

// =============================================================================
// Severity
// =============================================================================

/// How strongly a rule outcome affects the commit decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks the commit.
    Error,
    /// Commits, but the widget should show the message.
    Warning,
    /// Purely informational.
    Info,
}

// =============================================================================
// Item Selector
// =============================================================================

/// Matches items by type, and optionally by category and chosen option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSelector {
    pub item_type: ItemType,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub option: Option<String>,
}

impl ItemSelector {
    pub fn of_type(item_type: ItemType) -> Self {
        ItemSelector {
            item_type,
            category: None,
            option: None,
        }
    }

    pub fn in_category(item_type: ItemType, category: impl Into<String>) -> Self {
        ItemSelector {
            item_type,
            category: Some(category.into()),
            option: None,
        }
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.option = Some(option.into());
        self
    }

    pub fn matches(&self, item: &BookingItem) -> bool {
        if item.item_type != self.item_type {
            return false;
        }
        if let Some(category) = &self.category {
            if item.category() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some(option) = &self.option {
            if item.metadata.option.as_deref() != Some(option.as_str()) {
                return false;
            }
        }
        true
    }
}

// =============================================================================
// Rules
// =============================================================================

/// The rule kinds, each carrying its own data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleKind {
    /// In-scope existing items conflict with an in-scope candidate.
    /// With `same_category`, only items sharing the candidate's category do.
    MutuallyExclusive { same_category: bool },

    /// The candidate needs an existing item in `category` (and `option`).
    Requires {
        category: String,
        option: Option<String>,
    },

    /// Existing items list names they prevent in `metadata.prevents`.
    Prevents,

    /// Suggests adding something from `category` alongside the candidate.
    Enhances { category: String, suggestion: String },
}

impl RuleKind {
    pub fn rule_type(&self) -> RuleType {
        match self {
            RuleKind::MutuallyExclusive { .. } => RuleType::MutuallyExclusive,
            RuleKind::Requires { .. } => RuleType::Requires,
            RuleKind::Prevents => RuleType::Prevents,
            RuleKind::Enhances { .. } => RuleType::Enhances,
        }
    }
}

/// Data-free tag of a [`RuleKind`], used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    MutuallyExclusive,
    Requires,
    Prevents,
    Enhances,
}

/// One declarative business rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRule {
    pub id: String,
    pub description: String,
    pub kind: RuleKind,
    /// Candidates the rule applies to. Empty means every item.
    #[serde(default)]
    pub applies_to: Vec<ItemSelector>,
    pub severity: Severity,
    /// Lower runs first.
    pub priority: u32,
}

impl BusinessRule {
    fn with_kind(
        id: impl Into<String>,
        description: impl Into<String>,
        kind: RuleKind,
        applies_to: Vec<ItemSelector>,
        severity: Severity,
    ) -> Self {
        BusinessRule {
            id: id.into(),
            description: description.into(),
            kind,
            applies_to,
            severity,
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn mutually_exclusive(
        id: impl Into<String>,
        description: impl Into<String>,
        applies_to: Vec<ItemSelector>,
        same_category: bool,
    ) -> Self {
        Self::with_kind(
            id,
            description,
            RuleKind::MutuallyExclusive { same_category },
            applies_to,
            Severity::Error,
        )
    }

    /// Requirement rules default to `Warning`: the pick still commits.
    pub fn requires(
        id: impl Into<String>,
        description: impl Into<String>,
        applies_to: Vec<ItemSelector>,
        category: impl Into<String>,
        option: Option<String>,
    ) -> Self {
        Self::with_kind(
            id,
            description,
            RuleKind::Requires {
                category: category.into(),
                option,
            },
            applies_to,
            Severity::Warning,
        )
    }

    pub fn prevents(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_kind(id, description, RuleKind::Prevents, Vec::new(), Severity::Error)
    }

    pub fn enhances(
        id: impl Into<String>,
        description: impl Into<String>,
        applies_to: Vec<ItemSelector>,
        category: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::with_kind(
            id,
            description,
            RuleKind::Enhances {
                category: category.into(),
                suggestion: suggestion.into(),
            },
            applies_to,
            Severity::Info,
        )
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    fn in_scope(&self, item: &BookingItem) -> bool {
        self.applies_to.is_empty() || self.applies_to.iter().any(|s| s.matches(item))
    }
}

const DEFAULT_PRIORITY: u32 = 100;

// =============================================================================
// Validation Result
// =============================================================================

/// A rule hit, with the ids of the existing items involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    pub rule_id: String,
    pub rule_type: RuleType,
    pub severity: Severity,
    pub message: String,
    pub conflicting_items: Vec<String>,
}

/// An upsell hint produced by an `enhances` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub rule_id: String,
    pub category: String,
    pub message: String,
}

/// Complete outcome of a compatibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub conflicts: Vec<Conflict>,
    pub suggestions: Vec<Suggestion>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        ValidationResult {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            conflicts: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

impl ValidationResult {
    fn record(&mut self, severity: Severity, message: String) {
        match severity {
            Severity::Error => self.errors.push(message),
            Severity::Warning => self.warnings.push(message),
            Severity::Info => {}
        }
        self.is_valid = self.errors.is_empty();
    }

    fn push_conflict(&mut self, conflict: Conflict) {
        self.record(conflict.severity, conflict.message.clone());
        self.conflicts.push(conflict);
    }

    /// Folds another result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.conflicts.extend(other.conflicts);
        self.suggestions.extend(other.suggestions);
        self.is_valid = self.errors.is_empty();
    }

    /// Conflicts that block a commit.
    pub fn blocking_conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts
            .iter()
            .filter(|c| c.severity == Severity::Error)
    }

    /// Ids of existing items an error-severity mutual exclusion would evict.
    pub fn evictable_items(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .blocking_conflicts()
            .filter(|c| c.rule_type == RuleType::MutuallyExclusive)
            .flat_map(|c| c.conflicting_items.iter().cloned())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

// =============================================================================
// Rule Set
// =============================================================================

/// An ordered collection of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<BusinessRule>,
}

impl RuleSet {
    /// Builds a rule set, ordering rules by priority (stable for ties).
    pub fn new(mut rules: Vec<BusinessRule>) -> Self {
        rules.sort_by_key(|r| r.priority);
        RuleSet { rules }
    }

    pub fn empty() -> Self {
        RuleSet::default()
    }

    /// The built-in hotel rules.
    ///
    /// | id | kind | priority |
    /// |----|------|----------|
    /// | `room-state-exclusive` | room / bid / room-upgrade exclude each other | 10 |
    /// | `one-per-category` | one customization per category | 20 |
    /// | `prevented-by-existing` | metadata-driven prevention | 30 |
    /// | `ocean-view-needs-high-floor` | requires (warning) | 50 |
    /// | `early-check-in-breakfast` | enhances | 90 |
    /// | `upgrade-late-checkout` | enhances | 90 |
    pub fn hotel_defaults() -> Self {
        RuleSet::new(vec![
            BusinessRule::mutually_exclusive(
                "room-state-exclusive",
                "A booking is either the base room, an upgrade, or an open bid",
                vec![
                    ItemSelector::of_type(ItemType::Room),
                    ItemSelector::of_type(ItemType::Bid),
                    ItemSelector::in_category(ItemType::Customization, categories::ROOM_UPGRADE),
                ],
                false,
            )
            .with_priority(10),
            BusinessRule::mutually_exclusive(
                "one-per-category",
                "Only one choice per customization category",
                vec![ItemSelector::of_type(ItemType::Customization)],
                true,
            )
            .with_priority(20),
            BusinessRule::prevents(
                "prevented-by-existing",
                "An item already in the booking rules this out",
            )
            .with_priority(30),
            BusinessRule::requires(
                "ocean-view-needs-high-floor",
                "Ocean view is only guaranteed on a high floor",
                vec![
                    ItemSelector::in_category(ItemType::Customization, categories::VIEW)
                        .with_option("ocean"),
                ],
                categories::FLOOR,
                Some("high".to_string()),
            )
            .with_priority(50),
            BusinessRule::enhances(
                "early-check-in-breakfast",
                "Early arrivals often add breakfast",
                vec![ItemSelector::in_category(
                    ItemType::Customization,
                    categories::CHECK_IN,
                )],
                categories::BREAKFAST,
                "Add breakfast to start your early arrival",
            )
            .with_priority(90),
            BusinessRule::enhances(
                "upgrade-late-checkout",
                "Upgraded guests often extend their stay",
                vec![ItemSelector::of_type(ItemType::Room)],
                categories::CHECK_OUT,
                "Enjoy your new room longer with a late checkout",
            )
            .with_priority(90),
        ])
    }

    /// Adds a rule, keeping priority order.
    pub fn add(&mut self, rule: BusinessRule) {
        let pos = self.rules.partition_point(|r| r.priority <= rule.priority);
        self.rules.insert(pos, rule);
    }

    pub fn rules(&self) -> &[BusinessRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluates every applicable rule plus the room-level item checks.
    pub fn check_compatibility(
        &self,
        candidate: &BookingItem,
        existing: &[BookingItem],
        room: &RoomBooking,
    ) -> ValidationResult {
        let mut result = ValidationResult::default();

        for rule in self.rules.iter().filter(|r| r.in_scope(candidate)) {
            evaluate(rule, candidate, existing, &mut result);
        }

        for issue in check_item_against_room(candidate, room) {
            result.record(issue.severity, issue.message);
        }

        result
    }

    /// Re-checks every item in a room against the others.
    pub fn validate_room(&self, room: &RoomBooking) -> ValidationResult {
        let mut result = ValidationResult::default();
        for (idx, item) in room.items.iter().enumerate() {
            let others: Vec<BookingItem> = room
                .items
                .iter()
                .enumerate()
                .filter(|(other_idx, _)| *other_idx != idx)
                .map(|(_, other)| other.clone())
                .collect();
            result.merge(self.check_compatibility(item, &others, room));
        }
        result
    }
}

// =============================================================================
// Dispatch
// =============================================================================

fn evaluate(
    rule: &BusinessRule,
    candidate: &BookingItem,
    existing: &[BookingItem],
    result: &mut ValidationResult,
) {
    match &rule.kind {
        RuleKind::MutuallyExclusive { same_category } => {
            mutually_exclusive(rule, *same_category, candidate, existing, result)
        }
        RuleKind::Requires { category, option } => {
            requires(rule, category, option.as_deref(), candidate, existing, result)
        }
        RuleKind::Prevents => prevents(rule, candidate, existing, result),
        RuleKind::Enhances {
            category,
            suggestion,
        } => enhances(rule, category, suggestion, candidate, existing, result),
    }
}

fn mutually_exclusive(
    rule: &BusinessRule,
    same_category: bool,
    candidate: &BookingItem,
    existing: &[BookingItem],
    result: &mut ValidationResult,
) {
    let hits: Vec<&BookingItem> = existing
        .iter()
        .filter(|item| item.id != candidate.id)
        .filter(|item| rule.in_scope(item))
        .filter(|item| !same_category || item.category == candidate.category)
        .collect();

    if hits.is_empty() {
        return;
    }

    let names: Vec<&str> = hits.iter().map(|i| i.name.as_str()).collect();
    result.push_conflict(Conflict {
        rule_id: rule.id.clone(),
        rule_type: RuleType::MutuallyExclusive,
        severity: rule.severity,
        message: format!(
            "{} cannot be combined with {}: {}",
            candidate.name,
            names.join(", "),
            rule.description
        ),
        conflicting_items: hits.iter().map(|i| i.id.clone()).collect(),
    });
}

fn requires(
    rule: &BusinessRule,
    category: &str,
    option: Option<&str>,
    candidate: &BookingItem,
    existing: &[BookingItem],
    result: &mut ValidationResult,
) {
    let satisfied = existing.iter().any(|item| {
        item.category() == Some(category)
            && option.map_or(true, |o| item.metadata.option.as_deref() == Some(o))
    });

    if satisfied {
        return;
    }

    let wanted = match option {
        Some(o) => format!("{} {}", o, category),
        None => category.to_string(),
    };
    result.push_conflict(Conflict {
        rule_id: rule.id.clone(),
        rule_type: RuleType::Requires,
        severity: rule.severity,
        message: format!("{} works best with {}: {}", candidate.name, wanted, rule.description),
        conflicting_items: Vec::new(),
    });
}

fn prevents(
    rule: &BusinessRule,
    candidate: &BookingItem,
    existing: &[BookingItem],
    result: &mut ValidationResult,
) {
    let blockers: Vec<&BookingItem> = existing
        .iter()
        .filter(|item| item.id != candidate.id)
        .filter(|item| item.metadata.prevents.iter().any(|n| *n == candidate.name))
        .collect();

    if blockers.is_empty() {
        return;
    }

    let names: Vec<&str> = blockers.iter().map(|i| i.name.as_str()).collect();
    result.push_conflict(Conflict {
        rule_id: rule.id.clone(),
        rule_type: RuleType::Prevents,
        severity: rule.severity,
        message: format!("{} is not available with {}", candidate.name, names.join(", ")),
        conflicting_items: blockers.iter().map(|i| i.id.clone()).collect(),
    });
}

fn enhances(
    rule: &BusinessRule,
    category: &str,
    suggestion: &str,
    candidate: &BookingItem,
    existing: &[BookingItem],
    result: &mut ValidationResult,
) {
    let present = candidate.category() == Some(category)
        || existing.iter().any(|item| item.category() == Some(category));

    if !present {
        result.suggestions.push(Suggestion {
            rule_id: rule.id.clone(),
            category: category.to_string(),
            message: suggestion.to_string(),
        });
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::room::NewRoom;
    use crate::types::{ItemInput, ItemMetadata};

    fn room() -> RoomBooking {
        RoomBooking::from(NewRoom::new("r1", "Deluxe", 2))
    }

    fn item(input: ItemInput) -> BookingItem {
        BookingItem::new(input, "r1")
    }

    fn custom(category: &str, option: &str, cents: i64) -> BookingItem {
        item(ItemInput::customization(
            format!("{} {}", option, category),
            category,
            option,
            Money::from_cents(cents),
        ))
    }

    #[test]
    fn test_same_category_view_is_rejected_with_existing_id() {
        let rules = RuleSet::hotel_defaults();
        let existing = vec![custom(categories::VIEW, "garden", 3000)];
        let candidate = custom(categories::VIEW, "city", 4500);

        let result = rules.check_compatibility(&candidate, &existing, &room());

        assert!(!result.is_valid);
        assert_eq!(result.conflicts[0].rule_id, "one-per-category");
        assert_eq!(result.conflicts[0].conflicting_items, vec![existing[0].id.clone()]);
        assert_eq!(result.evictable_items(), vec![existing[0].id.clone()]);
    }

    #[test]
    fn test_room_state_exclusivity_covers_upgrade_customization() {
        let rules = RuleSet::hotel_defaults();
        let existing = vec![item(
            ItemInput::new("Junior Suite", Money::from_cents(5000), ItemType::Customization)
                .with_category(categories::ROOM_UPGRADE),
        )];
        let bid = item(ItemInput::new("Bid", Money::from_cents(9000), ItemType::Bid));

        let result = rules.check_compatibility(&bid, &existing, &room());

        assert!(!result.is_valid);
        assert_eq!(result.conflicts[0].rule_id, "room-state-exclusive");
    }

    #[test]
    fn test_requires_is_a_warning_only() {
        let rules = RuleSet::hotel_defaults();
        let candidate = custom(categories::VIEW, "ocean", 3000);

        let result = rules.check_compatibility(&candidate, &[], &room());

        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.conflicts[0].rule_type, RuleType::Requires);

        let with_floor = vec![custom(categories::FLOOR, "high", 1500)];
        let result = rules.check_compatibility(&candidate, &with_floor, &room());
        assert!(result.warnings.is_empty());
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn test_requires_can_be_made_blocking() {
        let rules = RuleSet::new(vec![BusinessRule::requires(
            "bed-needs-floor",
            "test",
            vec![ItemSelector::in_category(ItemType::Customization, categories::BED)],
            categories::FLOOR,
            None,
        )
        .with_severity(Severity::Error)]);
        let candidate = custom(categories::BED, "king", 0);

        assert!(!rules.check_compatibility(&candidate, &[], &room()).is_valid);
    }

    #[test]
    fn test_prevents_by_name() {
        let rules = RuleSet::hotel_defaults();
        let blocker = item(
            ItemInput::offer("Room-only rate", Money::from_cents(-2000)).with_metadata(
                ItemMetadata {
                    prevents: vec!["Breakfast".to_string()],
                    ..ItemMetadata::default()
                },
            ),
        );
        let candidate = item(ItemInput::offer("Breakfast", Money::from_cents(2500)));

        let result = rules.check_compatibility(&candidate, &[blocker.clone()], &room());

        assert!(!result.is_valid);
        assert_eq!(result.conflicts[0].rule_type, RuleType::Prevents);
        assert_eq!(result.conflicts[0].conflicting_items, vec![blocker.id]);
        assert!(result.evictable_items().is_empty());
    }

    #[test]
    fn test_enhances_never_blocks() {
        let rules = RuleSet::hotel_defaults();
        let candidate = custom(categories::CHECK_IN, "early", 2000);

        let result = rules.check_compatibility(&candidate, &[], &room());

        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert_eq!(result.suggestions.len(), 1);
        assert_eq!(result.suggestions[0].category, categories::BREAKFAST);
    }

    #[test]
    fn test_all_rules_evaluated_in_priority_order() {
        let rules = RuleSet::new(vec![
            BusinessRule::mutually_exclusive(
                "late",
                "second",
                vec![ItemSelector::of_type(ItemType::Offer)],
                false,
            )
            .with_priority(50),
            BusinessRule::mutually_exclusive(
                "early",
                "first",
                vec![ItemSelector::of_type(ItemType::Offer)],
                false,
            )
            .with_priority(5),
        ]);
        let existing = vec![item(ItemInput::offer("Spa", Money::from_cents(100)))];
        let candidate = item(ItemInput::offer("Dinner", Money::from_cents(100)));

        let result = rules.check_compatibility(&candidate, &existing, &room());

        let ids: Vec<&str> = result.conflicts.iter().map(|c| c.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_add_keeps_priority_order() {
        let mut rules = RuleSet::hotel_defaults();
        rules.add(BusinessRule::prevents("first", "x").with_priority(1));

        assert_eq!(rules.rules()[0].id, "first");
        let priorities: Vec<u32> = rules.rules().iter().map(|r| r.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
    }

    #[test]
    fn test_capacity_check_runs_with_rules() {
        let rules = RuleSet::empty();
        let small = RoomBooking::from(NewRoom::new("r1", "Family", 2).with_guests(3));
        let candidate = item(
            ItemInput::new("Queen room", Money::from_cents(1000), ItemType::Room).with_metadata(
                ItemMetadata {
                    max_occupancy: Some(2),
                    ..ItemMetadata::default()
                },
            ),
        );

        let result = rules.check_compatibility(&candidate, &[], &small);
        assert!(!result.is_valid);
        assert!(result.conflicts.is_empty());
    }

    #[test]
    fn test_validate_room_flags_coexisting_room_states() {
        let rules = RuleSet::hotel_defaults();
        let mut room = room();
        room.items.push(item(ItemInput::new(
            "Suite",
            Money::from_cents(5000),
            ItemType::Room,
        )));
        room.items.push(item(
            ItemInput::new("Upgrade", Money::from_cents(3000), ItemType::Customization)
                .with_category(categories::ROOM_UPGRADE),
        ));

        assert!(!rules.validate_room(&room).is_valid);
    }

    #[test]
    fn test_result_wire_shape() {
        let result = ValidationResult::default();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isValid"], true);
        assert!(json["conflicts"].as_array().unwrap().is_empty());
    }
}
