//! # Booking Store
//!
//! The state container behind every upsell widget.
//!
//! ## Store Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Booking Store Operations                             │
//! │                                                                         │
//! │  Widget Intent            Store Method             State Change         │
//! │  ─────────────            ────────────             ────────────         │
//! │                                                                         │
//! │  Pick customization ────► add_item() ───────────► rules, then          │
//! │                              │                      insert_item()       │
//! │                              └─ error conflict ──► Blocked(result)     │
//! │                                                                         │
//! │  Replace a pick ────────► add_item_resolving() ─► evict conflicts,     │
//! │                                                   insert_item()        │
//! │                                                                         │
//! │  Upgrade room ──────────► handle_room_upgrade() ► purge room state,    │
//! │                                                   insert delta item    │
//! │                                                                         │
//! │  Bid for upgrade ───────► handle_room_bid() ────► purge room state,    │
//! │                                                   insert bid           │
//! │                                                                         │
//! │  Switch room tab ───────► set_active_room() ────► flip is_active       │
//! │                                                                         │
//! │  Pricing panel ─────────► total_price() ────────► (read only)          │
//! │                                                                         │
//! │  NOTE: every successful mutation stamps `last_update`.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is a plain value. Widgets share it through
//! [`StoreHandle`](crate::handle::StoreHandle).

use chrono::{DateTime, NaiveDate, Utc};
use concierge_core::pricing::{legacy_total, price_room};
use concierge_core::validation::{
    validate_bid_amount, validate_item_input, validate_nights, validate_room_id,
    validate_room_limit,
};
use concierge_core::{
    to_legacy, BidStatus, BookingItem, BookingMode, Concept, CoreError, CoreResult, ItemInput,
    ItemMetadata, ItemPatch, ItemType, LegacyBooking, Money, NewRoom, PriceBreakdown,
    PricingRule, RoomBooking, RoomOption, RuleSet, ValidationResult, MAX_ITEMS_PER_ROOM,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::{StoreError, StoreResult};
use crate::optimistic::{Change, OptimisticUpdates, RoomLabel};
use crate::persistence::{PersistedState, StateStorage, SINGLE_ROOM_ID, STATE_VERSION, STORAGE_KEY};

// =============================================================================
// Reservation
// =============================================================================

/// Reservation metadata handed over by the booking engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub locator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<NaiveDate>,
}

// =============================================================================
// Intent Outcome
// =============================================================================

/// Result of an intent-level add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentOutcome {
    /// The item is in the room. `validation` may still carry warnings and
    /// suggestions.
    Committed {
        item: BookingItem,
        evicted: Vec<BookingItem>,
        validation: ValidationResult,
    },
    /// An error-severity rule blocked the add; the room is unchanged.
    Blocked(ValidationResult),
}

impl IntentOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, IntentOutcome::Committed { .. })
    }

    pub fn validation(&self) -> &ValidationResult {
        match self {
            IntentOutcome::Committed { validation, .. } => validation,
            IntentOutcome::Blocked(validation) => validation,
        }
    }

    pub fn item(&self) -> Option<&BookingItem> {
        match self {
            IntentOutcome::Committed { item, .. } => Some(item),
            IntentOutcome::Blocked(_) => None,
        }
    }
}

// =============================================================================
// Booking Store
// =============================================================================

/// Rooms, the active-room pointer, and the mode flag.
///
/// ## Invariants
/// - At most one room has `is_active = true`, and it is the room named by
///   `active_room_id`
/// - Room ids are unique (first writer wins)
/// - In single mode the store holds at most one room
#[derive(Debug, Clone)]
pub struct BookingStore {
    mode: BookingMode,
    rooms: Vec<RoomBooking>,
    active_room_id: Option<String>,
    reservation: Option<Reservation>,
    show_mobile_pricing: bool,
    last_update: DateTime<Utc>,
    rules: RuleSet,
    pricing: Vec<PricingRule>,
    storage_key: String,
    optimistic: OptimisticUpdates,
}

impl Default for BookingStore {
    fn default() -> Self {
        BookingStore::new(BookingMode::default())
    }
}

impl BookingStore {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Empty store with the hotel rules and no pricing rules.
    pub fn new(mode: BookingMode) -> Self {
        BookingStore {
            mode,
            rooms: Vec::new(),
            active_room_id: None,
            reservation: None,
            show_mobile_pricing: false,
            last_update: Utc::now(),
            rules: RuleSet::hotel_defaults(),
            pricing: Vec::new(),
            storage_key: STORAGE_KEY.to_string(),
            optimistic: OptimisticUpdates::new(),
        }
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_pricing(mut self, pricing: Vec<PricingRule>) -> Self {
        self.pricing = pricing;
        self
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        let mut store = BookingStore::new(config.store.mode)
            .with_rules(config.store.rule_set())
            .with_pricing(config.pricing.pricing_rules());
        store.storage_key = config.persistence.storage_key.clone();
        store
    }

    fn touch(&mut self) {
        self.last_update = Utc::now();
    }

    fn require_room(&self, room_id: &str) -> CoreResult<&RoomBooking> {
        self.room(room_id)
            .ok_or_else(|| CoreError::RoomNotFound(room_id.to_string()))
    }

    // =========================================================================
    // Room Mutations
    // =========================================================================

    /// Registers a booked room.
    ///
    /// Returns `Ok(false)` when a room with the same id already exists; the
    /// existing room is left untouched. The first room added becomes active.
    pub fn add_room(&mut self, new_room: NewRoom) -> CoreResult<bool> {
        match self.insert_room(new_room) {
            Ok(()) => Ok(true),
            Err(CoreError::DuplicateRoom(room_id)) => {
                warn!(room_id = %room_id, "Ignoring duplicate room");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Registers a booked room, treating a duplicate id as an error.
    pub fn insert_room(&mut self, new_room: NewRoom) -> CoreResult<()> {
        validate_room_id(&new_room.id)?;
        validate_nights(new_room.nights)?;

        if self.room(&new_room.id).is_some() {
            return Err(CoreError::DuplicateRoom(new_room.id));
        }

        if self.mode == BookingMode::Single && !self.rooms.is_empty() {
            return Err(CoreError::ModeMismatch {
                mode: self.mode.to_string(),
                reason: "a single booking holds exactly one room".to_string(),
            });
        }

        let room = RoomBooking::from(new_room);
        let room_id = room.id.clone();
        debug!(room_id = %room_id, nights = room.nights, "Room added");
        self.rooms.push(room);
        self.optimistic.record(Change::RoomAdded {
            room_id: room_id.clone(),
        });

        if self.active_room_id.is_none() {
            self.activate(Some(room_id));
        }
        self.touch();
        Ok(())
    }

    /// Deletes a room. If it was active, the first remaining room takes over.
    pub fn remove_room(&mut self, room_id: &str) -> bool {
        let Some(pos) = self.rooms.iter().position(|r| r.id == room_id) else {
            warn!(room_id, "Cannot remove unknown room");
            return false;
        };

        let removed = self.rooms.remove(pos);
        if removed.is_active || self.active_room_id.as_deref() == Some(room_id) {
            // Journaled ahead of the removal so an undo re-inserts the room
            // before pointing back at it.
            let next = self.rooms.first().map(|r| r.id.clone());
            self.activate(next);
        }
        self.optimistic.record(Change::RoomRemoved {
            position: pos,
            room: removed,
        });

        debug!(room_id, active = ?self.active_room_id, "Room removed");
        self.touch();
        true
    }

    /// Makes `room_id` the active room.
    ///
    /// An unknown id is an error and leaves the current active room in place.
    pub fn set_active_room(&mut self, room_id: &str) -> CoreResult<()> {
        if self.room(room_id).is_none() {
            warn!(room_id, "Cannot activate unknown room");
            return Err(CoreError::ActiveRoomNotFound(room_id.to_string()));
        }

        self.activate(Some(room_id.to_string()));
        debug!(room_id, "Active room switched");
        self.touch();
        Ok(())
    }

    /// Switches between single and multi mode.
    ///
    /// Going to single mode with more than one room is refused.
    pub fn set_mode(&mut self, mode: BookingMode) -> CoreResult<()> {
        if mode == BookingMode::Single && self.rooms.len() > 1 {
            return Err(CoreError::ModeMismatch {
                mode: mode.to_string(),
                reason: format!("store holds {} rooms", self.rooms.len()),
            });
        }
        if self.mode != mode {
            info!(from = %self.mode, to = %mode, "Booking mode changed");
            self.mode = mode;
            self.touch();
        }
        Ok(())
    }

    /// Clears rooms, reservation, and in-flight operations. Mode, rules, and
    /// pricing stay.
    pub fn reset(&mut self) {
        self.rooms.clear();
        self.active_room_id = None;
        self.reservation = None;
        self.show_mobile_pricing = false;
        self.optimistic.clear();
        info!("Booking store reset");
        self.touch();
    }

    pub fn set_reservation(&mut self, reservation: Option<Reservation>) {
        self.reservation = reservation;
        self.touch();
    }

    pub fn set_show_mobile_pricing(&mut self, show: bool) {
        self.show_mobile_pricing = show;
    }

    // =========================================================================
    // Item Mutations (structural layer)
    // =========================================================================

    /// Adds an item with structural eviction only. Rules are not consulted;
    /// use [`add_item`](Self::add_item) for that.
    pub fn add_item_to_room(&mut self, room_id: &str, input: ItemInput) -> CoreResult<BookingItem> {
        validate_item_input(&input)?;
        let item = BookingItem::new(input, room_id);
        let displaced = self.require_room(room_id)?.displaced_by(&item);
        let evicted = self.commit_item(room_id, displaced, item.clone())?;

        debug!(
            room_id,
            item_id = %item.id,
            item_type = %item.item_type,
            category = ?item.category,
            evicted = evicted.len(),
            "Item added"
        );
        self.touch();
        Ok(item)
    }

    /// Removes an item. An unknown item id is a no-op.
    pub fn remove_item_from_room(
        &mut self,
        room_id: &str,
        item_id: &str,
    ) -> CoreResult<Option<BookingItem>> {
        let room = find_room_mut(&mut self.rooms, room_id)?;
        let Some(pos) = room.position_of(item_id) else {
            debug!(room_id, item_id, "Item not in room, nothing removed");
            return Ok(None);
        };

        let taken = room.take_at(&[pos]);
        let removed = self.record_taken(room_id, taken).pop();
        debug!(room_id, item_id, "Item removed");
        self.touch();
        Ok(removed)
    }

    /// Merges `patch` into an item. Returns false when the item is unknown.
    ///
    /// The patched item goes through the same structural eviction as a new
    /// one, so moving a customization into a taken category replaces the
    /// previous pick.
    pub fn update_item_in_room(
        &mut self,
        room_id: &str,
        item_id: &str,
        patch: ItemPatch,
    ) -> CoreResult<bool> {
        let room = find_room_mut(&mut self.rooms, room_id)?;
        let Some(before) = room.item(item_id).cloned() else {
            return Ok(false);
        };
        let mut after = before.clone();
        after.apply(patch);
        validate_item_input(&after.to_input())?;

        let displaced = room.displaced_by(&after);
        let taken = room.take_at(&displaced);
        if let Some(pos) = room.position_of(item_id) {
            room.items[pos] = after.clone();
        }

        let evicted = self.record_taken(room_id, taken);
        self.optimistic.record(Change::ItemUpdated {
            room_id: room_id.to_string(),
            before,
            after,
        });
        debug!(room_id, item_id, evicted = evicted.len(), "Item updated");
        self.touch();
        Ok(true)
    }

    // =========================================================================
    // Room State Transitions
    // =========================================================================

    /// Moves the room to `option`, charging the difference to the base room.
    ///
    /// ## Base Price Resolution
    /// 1. `current_room_price` when given
    /// 2. the room's `base_room.price`
    /// 3. `base_price` stored on the current room-state item
    /// 4. zero
    pub fn handle_room_upgrade(
        &mut self,
        room_id: &str,
        option: RoomOption,
        current_room_price: Option<Money>,
    ) -> CoreResult<BookingItem> {
        let room = self.require_room(room_id)?;

        let base_price = current_room_price
            .or_else(|| room.base_room.as_ref().map(|b| b.price))
            .or_else(|| {
                room.items
                    .iter()
                    .filter(|i| i.represents_room_state())
                    .find_map(|i| i.metadata.base_price)
            })
            .unwrap_or_default();
        let upgrade_amount = option.price - base_price;

        let input = ItemInput::new(option.name.clone(), upgrade_amount, ItemType::Room)
            .with_category(concierge_core::categories::ROOM_UPGRADE)
            .with_concept(Concept::ChooseYourSuperior)
            .with_metadata(ItemMetadata {
                room_code: Some(option.code.clone()),
                full_price: Some(option.price),
                base_price: Some(base_price),
                upgrade_amount: Some(upgrade_amount),
                max_occupancy: option.max_occupancy,
                ..ItemMetadata::default()
            });
        validate_item_input(&input)?;

        let purge = room.room_state_positions();
        let item = BookingItem::new(input, room_id);
        let purged = self.commit_item(room_id, purge, item.clone())?;

        let room = find_room_mut(&mut self.rooms, room_id)?;
        let before = RoomLabel::of(room);
        room.room_name = option.name.clone();
        if option.image.is_some() {
            room.room_image = option.image.clone();
        }
        let after = RoomLabel::of(room);
        if before != after {
            self.optimistic.record(Change::RoomRelabeled {
                room_id: room_id.to_string(),
                before,
                after,
            });
        }

        debug!(
            room_id,
            room_code = %option.code,
            %base_price,
            %upgrade_amount,
            purged = purged.len(),
            "Room upgraded"
        );
        self.touch();
        Ok(item)
    }

    /// Replaces the room state with an open bid at the absolute `amount`.
    pub fn handle_room_bid(
        &mut self,
        room_id: &str,
        amount: Money,
        room_type: &str,
    ) -> CoreResult<BookingItem> {
        validate_bid_amount(amount)?;
        let purge = self.require_room(room_id)?.room_state_positions();

        let input = ItemInput::new(format!("Upgrade bid: {}", room_type), amount, ItemType::Bid)
            .with_concept(Concept::BidForUpgrade)
            .with_metadata(ItemMetadata {
                room_code: Some(room_type.to_string()),
                bid_status: Some(BidStatus::Pending),
                ..ItemMetadata::default()
            });
        let item = BookingItem::new(input, room_id);
        let purged = self.commit_item(room_id, purge, item.clone())?;

        debug!(room_id, room_type, %amount, purged = purged.len(), "Bid placed");
        self.touch();
        Ok(item)
    }

    /// Moves the bid in a room to `status`. Returns false when there is no bid.
    pub fn set_bid_status(&mut self, room_id: &str, status: BidStatus) -> CoreResult<bool> {
        let room = find_room_mut(&mut self.rooms, room_id)?;
        let Some(bid) = room.items.iter_mut().find(|i| i.item_type == ItemType::Bid) else {
            return Ok(false);
        };

        let before = bid.clone();
        bid.metadata.bid_status = Some(status);
        let after = bid.clone();
        self.optimistic.record(Change::ItemUpdated {
            room_id: room_id.to_string(),
            before,
            after,
        });
        debug!(room_id, ?status, "Bid status changed");
        self.touch();
        Ok(true)
    }

    /// Selects a room option for the current booking at its absolute price,
    /// or clears the selection with `None`.
    ///
    /// In single mode a booking room is created on first use.
    pub fn select_room(&mut self, option: Option<RoomOption>) -> CoreResult<()> {
        if self.active_room_id.is_none() && self.mode == BookingMode::Single {
            self.add_room(NewRoom::new(SINGLE_ROOM_ID, "Room", 1))?;
        }
        let room_id = self
            .active_room_id
            .clone()
            .ok_or_else(|| CoreError::RoomNotFound("<active>".to_string()))?;
        let purge = self.require_room(&room_id)?.room_state_positions();

        if let Some(option) = option {
            let input = ItemInput::new(option.name.clone(), option.price, ItemType::Room)
                .with_concept(Concept::ChooseYourRoom)
                .with_metadata(ItemMetadata {
                    room_code: Some(option.code.clone()),
                    full_price: Some(option.price),
                    max_occupancy: option.max_occupancy,
                    ..ItemMetadata::default()
                });
            let item = BookingItem::new(input, room_id.as_str());
            self.commit_item(&room_id, purge, item)?;
            debug!(room_id = %room_id, room_code = %option.code, "Room selected");
        } else {
            let room = find_room_mut(&mut self.rooms, &room_id)?;
            let taken = room.take_at(&purge);
            let purged = self.record_taken(&room_id, taken);
            debug!(room_id = %room_id, purged = purged.len(), "Room selection cleared");
        }

        self.touch();
        Ok(())
    }

    // =========================================================================
    // Intent Layer (rules consulted)
    // =========================================================================

    /// Runs the rule set for `input` against the room without mutating it.
    pub fn check_item(&self, room_id: &str, input: &ItemInput) -> CoreResult<ValidationResult> {
        let room = self.require_room(room_id)?;
        let candidate = BookingItem::new(input.clone(), room_id);
        Ok(self.rules.check_compatibility(&candidate, &room.items, room))
    }

    /// Adds an item if no error-severity rule objects.
    ///
    /// Malformed input and unknown rooms are errors; rule conflicts come back
    /// as [`IntentOutcome::Blocked`].
    pub fn add_item(&mut self, room_id: &str, input: ItemInput) -> CoreResult<IntentOutcome> {
        validate_item_input(&input)?;
        let room = self.require_room(room_id)?;
        let candidate = BookingItem::new(input, room_id);
        let validation = self
            .rules
            .check_compatibility(&candidate, &room.items, room);

        if !validation.is_valid {
            debug!(
                room_id,
                item = %candidate.name,
                errors = validation.errors.len(),
                "Item blocked by rules"
            );
            return Ok(IntentOutcome::Blocked(validation));
        }

        let displaced = room.displaced_by(&candidate);
        let evicted = self.commit_item(room_id, displaced, candidate.clone())?;

        debug!(
            room_id,
            item_id = %candidate.id,
            warnings = validation.warnings.len(),
            "Item committed"
        );
        self.touch();
        Ok(IntentOutcome::Committed {
            item: candidate,
            evicted,
            validation,
        })
    }

    /// Like [`add_item`](Self::add_item), but items in error-severity
    /// mutual-exclusion conflicts are evicted instead of blocking.
    ///
    /// Any other error still blocks, and then nothing is evicted.
    pub fn add_item_resolving(
        &mut self,
        room_id: &str,
        input: ItemInput,
    ) -> CoreResult<IntentOutcome> {
        validate_item_input(&input)?;
        let first_pass = self.check_item(room_id, &input)?;
        let evict = first_pass.evictable_items();
        if first_pass.is_valid || evict.is_empty() {
            return self.add_item(room_id, input);
        }

        let room = self.require_room(room_id)?;
        let remaining: Vec<BookingItem> = room
            .items
            .iter()
            .filter(|i| !evict.contains(&i.id))
            .cloned()
            .collect();
        let candidate = BookingItem::new(input, room_id);
        let validation = self.rules.check_compatibility(&candidate, &remaining, room);
        if !validation.is_valid {
            return Ok(IntentOutcome::Blocked(validation));
        }

        let displaced = room.displaced_by(&candidate);
        let positions: Vec<usize> = room
            .items
            .iter()
            .enumerate()
            .filter(|(pos, item)| evict.contains(&item.id) || displaced.contains(pos))
            .map(|(pos, _)| pos)
            .collect();
        let evicted = self.commit_item(room_id, positions, candidate.clone())?;

        debug!(
            room_id,
            item_id = %candidate.id,
            evicted = evicted.len(),
            "Item committed after resolving conflicts"
        );
        self.touch();
        Ok(IntentOutcome::Committed {
            item: candidate,
            evicted,
            validation,
        })
    }

    // =========================================================================
    // Journaled Primitives
    // =========================================================================

    /// Takes out the items at `remove`, then appends `item`.
    ///
    /// Capacity is checked against the count left after the removals, before
    /// anything changes. Every change lands in the recording journal.
    fn commit_item(
        &mut self,
        room_id: &str,
        remove: Vec<usize>,
        item: BookingItem,
    ) -> CoreResult<Vec<BookingItem>> {
        let room = find_room_mut(&mut self.rooms, room_id)?;
        ensure_capacity(room_id, room.item_count().saturating_sub(remove.len()))?;

        let taken = room.take_at(&remove);
        let leftover = room.displaced_by(&item);
        let also_taken = room.take_at(&leftover);
        let item_id = item.id.clone();
        room.items.push(item);

        let mut evicted = self.record_taken(room_id, taken);
        evicted.extend(self.record_taken(room_id, also_taken));
        self.optimistic.record(Change::ItemAdded {
            room_id: room_id.to_string(),
            item_id,
        });
        Ok(evicted)
    }

    fn record_taken(&mut self, room_id: &str, taken: Vec<(usize, BookingItem)>) -> Vec<BookingItem> {
        taken
            .into_iter()
            .map(|(position, item)| {
                self.optimistic.record(Change::ItemRemoved {
                    room_id: room_id.to_string(),
                    position,
                    item: item.clone(),
                });
                item
            })
            .collect()
    }

    /// Points `active_room_id` and the `is_active` flags at `target`.
    fn activate(&mut self, target: Option<String>) {
        if self.active_room_id != target {
            self.optimistic.record(Change::ActiveRoom {
                before: self.active_room_id.clone(),
                after: target.clone(),
            });
        }
        self.set_active_flags(target);
    }

    fn set_active_flags(&mut self, target: Option<String>) {
        for room in &mut self.rooms {
            room.is_active = target.as_deref() == Some(room.id.as_str());
        }
        self.active_room_id = target;
    }

    // =========================================================================
    // Optimistic Updates
    // =========================================================================

    /// Marks `op_id` in flight. Mutations made from here on are journaled
    /// for `op_id` until [`end_optimistic_recording`](Self::end_optimistic_recording),
    /// the next start, or the end of the operation.
    pub fn start_optimistic_update(&mut self, op_id: &str) -> CoreResult<()> {
        self.optimistic.start(op_id)
    }

    /// Stops journaling for the operation that is recording.
    pub fn end_optimistic_recording(&mut self) {
        self.optimistic.stop_recording();
    }

    /// Confirms `op_id`. Returns false for unknown ids.
    pub fn complete_optimistic_update(&mut self, op_id: &str) -> bool {
        self.optimistic.complete(op_id)
    }

    /// Undoes the changes journaled for `op_id`, newest first.
    ///
    /// Changes made by other operations stay. A change is only undone while
    /// the state still shows it; an evicted item whose slot has since been
    /// filled is not brought back. Returns false for unknown ids.
    pub fn rollback_optimistic_update(&mut self, op_id: &str) -> bool {
        let Some(journal) = self.optimistic.rollback(op_id) else {
            warn!(op_id, "Rollback for unknown operation");
            return false;
        };

        let started_at = journal.started_at;
        let changes = journal.changes.len();
        for change in journal.changes.into_iter().rev() {
            self.undo(change);
        }
        info!(op_id, changes, %started_at, "Optimistic update undone");
        self.touch();
        true
    }

    /// Reverts one journaled change without journaling the revert.
    fn undo(&mut self, change: Change) {
        match change {
            Change::ItemAdded { room_id, item_id } => {
                if let Ok(room) = find_room_mut(&mut self.rooms, &room_id) {
                    room.remove_item(&item_id);
                }
            }
            Change::ItemRemoved {
                room_id,
                position,
                item,
            } => {
                let Ok(room) = find_room_mut(&mut self.rooms, &room_id) else {
                    return;
                };
                if room.position_of(&item.id).is_none() && room.displaced_by(&item).is_empty() {
                    room.restore_at(position, item);
                } else {
                    debug!(room_id = %room_id, item_id = %item.id, "Slot taken, evicted item stays out");
                }
            }
            Change::ItemUpdated {
                room_id,
                before,
                after,
            } => {
                let Ok(room) = find_room_mut(&mut self.rooms, &room_id) else {
                    return;
                };
                let Some(pos) = room.position_of(&after.id) else {
                    return;
                };
                if room.items[pos] == after && room.displaced_by(&before).is_empty() {
                    room.items[pos] = before;
                }
            }
            Change::RoomRelabeled {
                room_id,
                before,
                after,
            } => {
                if let Ok(room) = find_room_mut(&mut self.rooms, &room_id) {
                    if RoomLabel::of(room) == after {
                        room.room_name = before.name;
                        room.room_image = before.image;
                    }
                }
            }
            Change::ActiveRoom { before, after } => {
                let target_exists = before.as_deref().map_or(true, |id| self.room(id).is_some());
                if self.active_room_id == after && target_exists {
                    self.set_active_flags(before);
                }
            }
            Change::RoomAdded { room_id } => {
                self.rooms.retain(|r| r.id != room_id);
                if self.active_room_id.as_deref() == Some(room_id.as_str()) {
                    let next = self.rooms.first().map(|r| r.id.clone());
                    self.set_active_flags(next);
                }
            }
            Change::RoomRemoved { position, mut room } => {
                if self.room(&room.id).is_none() {
                    room.is_active = false;
                    let at = position.min(self.rooms.len());
                    self.rooms.insert(at, room);
                }
            }
        }
    }

    pub fn pending_operations(&self) -> &OptimisticUpdates {
        &self.optimistic
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn mode(&self) -> BookingMode {
        self.mode
    }

    pub fn rooms(&self) -> &[RoomBooking] {
        &self.rooms
    }

    pub fn room(&self, room_id: &str) -> Option<&RoomBooking> {
        self.rooms.iter().find(|r| r.id == room_id)
    }

    pub fn active_room_id(&self) -> Option<&str> {
        self.active_room_id.as_deref()
    }

    /// The active room.
    pub fn current_room(&self) -> Option<&RoomBooking> {
        self.active_room_id.as_deref().and_then(|id| self.room(id))
    }

    pub fn reservation(&self) -> Option<&Reservation> {
        self.reservation.as_ref()
    }

    pub fn show_mobile_pricing(&self) -> bool {
        self.show_mobile_pricing
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    /// Raw sum of the room's item prices.
    pub fn room_total(&self, room_id: &str) -> CoreResult<Money> {
        Ok(self.require_room(room_id)?.subtotal())
    }

    /// Grand total.
    ///
    /// Multi mode sums every room. Single mode uses the legacy formula, where
    /// a bid only counts while it is pending or submitted.
    pub fn total_price(&self) -> Money {
        match self.mode {
            BookingMode::Multi => self.rooms.iter().map(RoomBooking::subtotal).sum(),
            BookingMode::Single => legacy_total(&self.legacy_view()),
        }
    }

    /// Items across every room.
    pub fn item_count(&self) -> usize {
        self.rooms.iter().map(RoomBooking::item_count).sum()
    }

    /// Items of one type in a room. Empty for unknown rooms.
    pub fn items_by_type(&self, room_id: &str, item_type: ItemType) -> Vec<&BookingItem> {
        self.room(room_id)
            .map(|r| r.items_of_type(item_type).collect())
            .unwrap_or_default()
    }

    /// Items in one category in a room. Empty for unknown rooms.
    pub fn items_by_category(&self, room_id: &str, category: &str) -> Vec<&BookingItem> {
        self.room(room_id)
            .map(|r| r.items_in_category(category).collect())
            .unwrap_or_default()
    }

    /// Full rule check across every room.
    pub fn validate_booking(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        for room in &self.rooms {
            result.merge(self.rules.validate_room(room));
        }
        result
    }

    /// True when at least one room exists and no rule reports an error.
    pub fn is_valid_booking(&self) -> bool {
        !self.rooms.is_empty() && self.validate_booking().is_valid
    }

    /// Room price with the configured pricing rules applied.
    pub fn room_breakdown(&self, room_id: &str) -> CoreResult<PriceBreakdown> {
        Ok(price_room(self.require_room(room_id)?, &self.pricing))
    }

    /// Every room's breakdown folded together.
    pub fn total_breakdown(&self) -> PriceBreakdown {
        let mut total = PriceBreakdown::default();
        for room in &self.rooms {
            total.absorb(price_room(room, &self.pricing));
        }
        total
    }

    /// The current room in the single-booking shape.
    pub fn legacy_view(&self) -> LegacyBooking {
        self.current_room().map(to_legacy).unwrap_or_default()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// The persisted subset of the state.
    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            version: STATE_VERSION,
            mode: self.mode,
            rooms: self.rooms.clone(),
            active_room_id: self.active_room_id.clone(),
            reservation: self.reservation.clone(),
            legacy: (self.mode == BookingMode::Single).then(|| self.legacy_view()),
        }
    }

    /// Replaces rooms, mode, and reservation with a persisted state.
    ///
    /// In-flight operations are dropped. A stale active-room id falls back to
    /// the first room.
    pub fn apply_persisted(&mut self, state: PersistedState) {
        self.mode = state.mode;
        if self.mode == BookingMode::Single && state.rooms.len() > 1 {
            warn!(
                rooms = state.rooms.len(),
                "Persisted single booking holds several rooms, using multi mode"
            );
            self.mode = BookingMode::Multi;
        }

        self.rooms = state.rooms;
        self.reservation = state.reservation;
        self.optimistic.clear();

        let active = state
            .active_room_id
            .filter(|id| self.rooms.iter().any(|r| &r.id == id))
            .or_else(|| self.rooms.first().map(|r| r.id.clone()));
        for room in &mut self.rooms {
            room.is_active = active.as_deref() == Some(room.id.as_str());
        }
        self.active_room_id = active;
        self.touch();
    }

    /// Writes the persisted state under the configured key.
    pub fn save_to<S: StateStorage + ?Sized>(&self, storage: &S) -> StoreResult<()> {
        let json = self.persisted_state().to_json()?;
        storage.save(&self.storage_key, &json)?;
        info!(key = %self.storage_key, rooms = self.rooms.len(), "Booking state saved");
        Ok(())
    }

    /// Loads state saved under the configured key. Returns false when
    /// nothing was stored.
    pub fn restore_from<S: StateStorage + ?Sized>(&mut self, storage: &S) -> StoreResult<bool> {
        let Some(json) = storage.load(&self.storage_key)? else {
            return Ok(false);
        };
        let state = PersistedState::from_json(&json)?;
        self.apply_persisted(state);
        info!(key = %self.storage_key, rooms = self.rooms.len(), "Booking state restored");
        Ok(true)
    }

    /// Builds a store from configuration and restores any saved state.
    pub fn open(config: &EngineConfig) -> StoreResult<Self> {
        let mut store = BookingStore::from_config(config);
        if config.persistence.enabled {
            let storage = config.persistence.file_storage()?;
            if let Err(e) = store.restore_from(&storage) {
                match e {
                    StoreError::Serialization(_) | StoreError::UnsupportedVersion { .. } => {
                        warn!("Discarding unreadable booking state: {}", e);
                    }
                    other => return Err(other),
                }
            }
        }
        Ok(store)
    }
}

fn find_room_mut<'a>(rooms: &'a mut [RoomBooking], room_id: &str) -> CoreResult<&'a mut RoomBooking> {
    rooms
        .iter_mut()
        .find(|r| r.id == room_id)
        .ok_or_else(|| CoreError::RoomNotFound(room_id.to_string()))
}

fn ensure_capacity(room_id: &str, current_items: usize) -> CoreResult<()> {
    validate_room_limit(current_items).map_err(|_| CoreError::RoomLimitReached {
        room_id: room_id.to_string(),
        max: MAX_ITEMS_PER_ROOM,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
