//! # Domain Types
//!
//! The line-item model shared by every upsell widget.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Item Model                                      │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   ItemInput     │   │  BookingItem    │   │   ItemPatch     │       │
//! │  │  ─────────────  │──►│  ─────────────  │◄──│  ─────────────  │       │
//! │  │  name, price    │   │  id (UUID v4)   │   │  partial fields │       │
//! │  │  type, category │   │  room_id        │   │  merged in      │       │
//! │  │  metadata       │   │  added_at       │   │  place          │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   ItemType      │   │    Concept      │   │   RoomOption    │       │
//! │  │  room           │   │  which widget   │   │  sellable room  │       │
//! │  │  customization  │   │  produced the   │   │  code, name,    │       │
//! │  │  offer, bid     │   │  item           │   │  price          │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `type` and `category` together decide which compatibility rules apply to
//! an item.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Well-known categories
// =============================================================================

/// Category names used by the built-in rules and the widgets.
pub mod categories {
    /// A customization that represents the room itself being upgraded.
    pub const ROOM_UPGRADE: &str = "room-upgrade";
    pub const VIEW: &str = "view";
    pub const FLOOR: &str = "floor";
    pub const BED: &str = "bed";
    pub const CHECK_IN: &str = "check-in";
    pub const CHECK_OUT: &str = "check-out";
    pub const BREAKFAST: &str = "breakfast";
}

// =============================================================================
// Item Type
// =============================================================================

/// The kind of line item.
///
/// `Room` and `Bid` are structurally exclusive: a room booking holds at most
/// one of either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Room,
    Customization,
    Offer,
    Bid,
}

impl ItemType {
    /// True for the two types that describe which room the guest sleeps in.
    #[inline]
    pub const fn is_room_state(&self) -> bool {
        matches!(self, ItemType::Room | ItemType::Bid)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemType::Room => write!(f, "room"),
            ItemType::Customization => write!(f, "customization"),
            ItemType::Offer => write!(f, "offer"),
            ItemType::Bid => write!(f, "bid"),
        }
    }
}

// =============================================================================
// Concept
// =============================================================================

/// The upsell product that produced an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Concept {
    /// Room picker: pick a specific room type.
    ChooseYourRoom,
    /// Room picker: upgrade to a superior category.
    ChooseYourSuperior,
    /// Bid for an upgrade instead of paying list price.
    BidForUpgrade,
    /// Bed, view, floor and similar picks.
    CustomizeYourStay,
    /// Special offers (breakfast, late checkout, ...).
    SpecialOffer,
}

// =============================================================================
// Bid Status
// =============================================================================

/// Lifecycle of an upgrade bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    #[default]
    Draft,
    Pending,
    Submitted,
    Accepted,
    Rejected,
    Expired,
}

impl BidStatus {
    /// Whether an open bid counts towards the booking total.
    #[inline]
    pub const fn counts_towards_total(&self) -> bool {
        matches!(self, BidStatus::Submitted | BidStatus::Pending)
    }
}

// =============================================================================
// Item Metadata
// =============================================================================

/// Typed metadata attached to an item.
///
/// Everything is optional; the widgets only set what applies to them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemMetadata {
    /// Chosen value inside the category, e.g. `ocean` for `view`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,

    /// Price is per night; the pricing layer multiplies by the stay length.
    pub per_night: bool,

    /// Names of items this item rules out.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prevents: Vec<String>,

    /// Maximum guests the selected room accepts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_occupancy: Option<u32>,

    /// Absolute price of the target room (upgrade items carry a delta price).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_price: Option<Money>,

    /// Price of the room the upgrade was computed against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<Money>,

    /// `full_price - base_price`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_amount: Option<Money>,

    /// Room type code for room and bid items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bid_status: Option<BidStatus>,

    /// Free-form display data owned by the widgets.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

// =============================================================================
// Item Input
// =============================================================================

/// An item as submitted by a widget, before the store assigns identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    pub name: String,
    pub price: Money,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<Concept>,
    #[serde(default)]
    pub metadata: ItemMetadata,
}

impl ItemInput {
    /// Creates an input with empty category, concept and metadata.
    pub fn new(name: impl Into<String>, price: Money, item_type: ItemType) -> Self {
        ItemInput {
            name: name.into(),
            price,
            item_type,
            category: None,
            concept: None,
            metadata: ItemMetadata::default(),
        }
    }

    /// A customization pick, e.g. `("Ocean view", "view", "ocean", 30.00)`.
    pub fn customization(
        name: impl Into<String>,
        category: impl Into<String>,
        option: impl Into<String>,
        price: Money,
    ) -> Self {
        let mut input = ItemInput::new(name, price, ItemType::Customization)
            .with_category(category)
            .with_concept(Concept::CustomizeYourStay);
        input.metadata.option = Some(option.into());
        input
    }

    /// A special offer.
    pub fn offer(name: impl Into<String>, price: Money) -> Self {
        ItemInput::new(name, price, ItemType::Offer).with_concept(Concept::SpecialOffer)
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_concept(mut self, concept: Concept) -> Self {
        self.concept = Some(concept);
        self
    }

    pub fn with_metadata(mut self, metadata: ItemMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

// =============================================================================
// Booking Item
// =============================================================================

/// A committed line item inside a room booking.
///
/// ## Invariants
/// - `id` is unique within the owning room
/// - `price` may be negative (discount); it is integer cents, so always finite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BookingItem {
    pub id: String,
    pub name: String,
    pub price: Money,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<Concept>,
    #[serde(default)]
    pub metadata: ItemMetadata,
    pub room_id: String,
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl BookingItem {
    /// Stamps an input with a fresh id and the current time.
    pub fn new(input: ItemInput, room_id: impl Into<String>) -> Self {
        BookingItem {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            price: input.price,
            item_type: input.item_type,
            category: input.category,
            concept: input.concept,
            metadata: input.metadata,
            room_id: room_id.into(),
            added_at: Utc::now(),
        }
    }

    /// Returns the category, if any, as a `&str`.
    #[inline]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// True when the item is a customization in the given category.
    pub fn is_customization_in(&self, category: &str) -> bool {
        self.item_type == ItemType::Customization && self.category() == Some(category)
    }

    /// True for room, bid, and room-upgrade customization items.
    pub fn represents_room_state(&self) -> bool {
        self.item_type.is_room_state() || self.is_customization_in(categories::ROOM_UPGRADE)
    }

    /// Drops identity, giving back the input shape.
    pub fn to_input(&self) -> ItemInput {
        ItemInput {
            name: self.name.clone(),
            price: self.price,
            item_type: self.item_type,
            category: self.category.clone(),
            concept: self.concept,
            metadata: self.metadata.clone(),
        }
    }

    /// Merges a partial update into this item. Identity fields never change.
    pub fn apply(&mut self, patch: ItemPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(concept) = patch.concept {
            self.concept = Some(concept);
        }
        if let Some(metadata) = patch.metadata {
            self.metadata = metadata;
        }
    }
}

// =============================================================================
// Item Patch
// =============================================================================

/// Partial update for an existing item. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub category: Option<String>,
    pub concept: Option<Concept>,
    pub metadata: Option<ItemMetadata>,
}

// =============================================================================
// Room Option
// =============================================================================

/// A room type the guest can be moved into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoomOption {
    /// Room type code (e.g. `DLX-OCEAN`).
    pub code: String,
    pub name: String,
    /// Absolute price of the room for the stay.
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_occupancy: Option<u32>,
}

impl RoomOption {
    pub fn new(code: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        RoomOption {
            code: code.into(),
            name: name.into(),
            price,
            image: None,
            max_occupancy: None,
        }
    }
}

// =============================================================================
// Booking Mode
// =============================================================================

/// Whether the store edits one booking or several rooms at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum BookingMode {
    #[default]
    Single,
    Multi,
}

impl fmt::Display for BookingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingMode::Single => write!(f, "single"),
            BookingMode::Multi => write!(f, "multi"),
        }
    }
}

impl std::str::FromStr for BookingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(BookingMode::Single),
            "multi" | "multiple" => Ok(BookingMode::Multi),
            other => Err(format!(
                "Unknown booking mode: '{}'. Valid options: single, multi",
                other
            )),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_gets_identity() {
        let input = ItemInput::offer("Breakfast", Money::from_cents(2500));
        let a = BookingItem::new(input.clone(), "r1");
        let b = BookingItem::new(input, "r1");

        assert_ne!(a.id, b.id);
        assert_eq!(a.room_id, "r1");
        assert_eq!(a.item_type, ItemType::Offer);
        assert_eq!(a.concept, Some(Concept::SpecialOffer));
    }

    #[test]
    fn test_room_state_detection() {
        let bid = BookingItem::new(
            ItemInput::new("Bid", Money::from_cents(100), ItemType::Bid),
            "r1",
        );
        let upgrade = BookingItem::new(
            ItemInput::new("Suite", Money::from_cents(100), ItemType::Customization)
                .with_category(categories::ROOM_UPGRADE),
            "r1",
        );
        let view = BookingItem::new(
            ItemInput::customization("Ocean", categories::VIEW, "ocean", Money::zero()),
            "r1",
        );

        assert!(bid.represents_room_state());
        assert!(upgrade.represents_room_state());
        assert!(!view.represents_room_state());
    }

    #[test]
    fn test_patch_merges_only_given_fields() {
        let mut item = BookingItem::new(
            ItemInput::customization("Ocean", categories::VIEW, "ocean", Money::from_cents(3000)),
            "r1",
        );
        let id = item.id.clone();

        item.apply(ItemPatch {
            price: Some(Money::from_cents(4500)),
            ..ItemPatch::default()
        });

        assert_eq!(item.id, id);
        assert_eq!(item.name, "Ocean");
        assert_eq!(item.price.cents(), 4500);
        assert_eq!(item.category(), Some(categories::VIEW));
    }

    #[test]
    fn test_item_wire_shape() {
        let item = BookingItem::new(
            ItemInput::customization("Ocean", categories::VIEW, "ocean", Money::from_cents(3000)),
            "r1",
        );
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(json["type"], "customization");
        assert_eq!(json["roomId"], "r1");
        assert_eq!(json["price"], 3000);
        assert_eq!(json["concept"], "CUSTOMIZE_YOUR_STAY");
        assert_eq!(json["metadata"]["option"], "ocean");
    }

    #[test]
    fn test_booking_mode_parsing() {
        assert_eq!("single".parse::<BookingMode>().unwrap(), BookingMode::Single);
        assert_eq!("MULTI".parse::<BookingMode>().unwrap(), BookingMode::Multi);
        assert!("both".parse::<BookingMode>().is_err());
    }

    #[test]
    fn test_bid_status_counting() {
        assert!(BidStatus::Pending.counts_towards_total());
        assert!(BidStatus::Submitted.counts_towards_total());
        assert!(!BidStatus::Draft.counts_towards_total());
        assert!(!BidStatus::Rejected.counts_towards_total());
    }
}
