//! # Room Aggregate
//!
//! A named, dated booking unit that owns an ordered collection of items.
//!
//! ## Structural Eviction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert_item(new)                                                       │
//! │                                                                         │
//! │  new.type == customization ──► drop customizations with same category  │
//! │                                                                         │
//! │  new.type ∈ {room, bid}    ──► drop every room / bid item              │
//! │                                                                         │
//! │  otherwise                 ──► nothing dropped                          │
//! │                                                                         │
//! │  then: items.push(new)                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! This layer is unconditional. Declarative cross-category checks live in
//! [`crate::rules`] and are consulted by the store before it inserts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{BookingItem, ItemPatch, ItemType, RoomOption};

// =============================================================================
// New Room (initializer payload)
// =============================================================================

/// Everything the external initializer knows about a booked room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    pub id: String,
    pub room_name: String,
    #[serde(default)]
    pub room_number: String,
    #[serde(default)]
    pub guest_name: String,
    #[serde(default = "default_guests")]
    pub guests: u32,
    pub nights: u32,
    #[serde(default)]
    pub pay_at_hotel: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_room: Option<RoomOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub check_in: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub check_out: Option<NaiveDate>,
}

fn default_guests() -> u32 {
    1
}

impl NewRoom {
    /// Minimal initializer used by tests and the legacy migration.
    pub fn new(id: impl Into<String>, room_name: impl Into<String>, nights: u32) -> Self {
        NewRoom {
            id: id.into(),
            room_name: room_name.into(),
            room_number: String::new(),
            guest_name: String::new(),
            guests: default_guests(),
            nights,
            pay_at_hotel: false,
            base_room: None,
            check_in: None,
            check_out: None,
        }
    }

    pub fn with_base_room(mut self, base_room: RoomOption) -> Self {
        self.base_room = Some(base_room);
        self
    }

    pub fn with_guests(mut self, guests: u32) -> Self {
        self.guests = guests;
        self
    }
}

// =============================================================================
// Room Booking
// =============================================================================

/// One booked room and its basket of upsell items.
///
/// ## Invariants
/// - `items` never holds two customizations with the same category
/// - `items` holds at most one item of type `room` or `bid`
/// - `nights >= 1` (checked by the store before construction)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RoomBooking {
    pub id: String,
    pub room_name: String,
    pub room_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_image: Option<String>,
    pub guest_name: String,
    pub guests: u32,
    pub nights: u32,
    pub items: Vec<BookingItem>,
    pub is_active: bool,
    pub pay_at_hotel: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_room: Option<RoomOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub check_in: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub check_out: Option<NaiveDate>,
}

impl From<NewRoom> for RoomBooking {
    fn from(new: NewRoom) -> Self {
        RoomBooking {
            id: new.id,
            room_image: new.base_room.as_ref().and_then(|r| r.image.clone()),
            room_name: new.room_name,
            room_number: new.room_number,
            guest_name: new.guest_name,
            guests: new.guests,
            nights: new.nights,
            items: Vec::new(),
            is_active: false,
            pay_at_hotel: new.pay_at_hotel,
            base_room: new.base_room,
            check_in: new.check_in,
            check_out: new.check_out,
        }
    }
}

impl RoomBooking {
    // =========================================================================
    // Mutations
    // =========================================================================

    /// Applies structural eviction, then appends the item.
    ///
    /// Returns the evicted items so the caller can log or undo them.
    pub fn insert_item(&mut self, item: BookingItem) -> Vec<BookingItem> {
        let displaced = self.displaced_by(&item);
        let evicted = self.take_at(&displaced);
        self.items.push(item);
        evicted.into_iter().map(|(_, item)| item).collect()
    }

    /// Removes an item by id. Unknown ids leave the room untouched.
    pub fn remove_item(&mut self, item_id: &str) -> Option<BookingItem> {
        let pos = self.position_of(item_id)?;
        Some(self.items.remove(pos))
    }

    /// Merges `patch` into the item with this id, then evicts whatever the
    /// patched item structurally excludes (a customization moved into a taken
    /// category replaces the old pick).
    ///
    /// Returns `None` if the item is unknown, otherwise the evicted items.
    pub fn update_item(&mut self, item_id: &str, patch: ItemPatch) -> Option<Vec<BookingItem>> {
        let pos = self.position_of(item_id)?;
        self.items[pos].apply(patch);
        let displaced = self.displaced_by(&self.items[pos]);
        Some(self.take_at(&displaced).into_iter().map(|(_, item)| item).collect())
    }

    /// Removes every item that says which room the guest is in: room items,
    /// bids, and room-upgrade customizations.
    pub fn purge_room_state(&mut self) -> Vec<BookingItem> {
        let positions = self.room_state_positions();
        self.take_at(&positions)
            .into_iter()
            .map(|(_, item)| item)
            .collect()
    }

    /// Removes the items at `positions` (ascending, unique) and returns each
    /// with the position it held. Out-of-range positions are skipped.
    pub fn take_at(&mut self, positions: &[usize]) -> Vec<(usize, BookingItem)> {
        let mut taken: Vec<(usize, BookingItem)> = Vec::new();
        for &pos in positions.iter().rev() {
            if pos < self.items.len() {
                taken.push((pos, self.items.remove(pos)));
            }
        }
        taken.reverse();
        taken
    }

    /// Puts an item back at `position`, or at the end if the list got shorter.
    pub fn restore_at(&mut self, position: usize, item: BookingItem) {
        let at = position.min(self.items.len());
        self.items.insert(at, item);
    }

    // =========================================================================
    // Structural Queries
    // =========================================================================

    /// Positions of the items `item` would push out. The item's own position
    /// never counts, so this also works for an item already in the room.
    pub fn displaced_by(&self, item: &BookingItem) -> Vec<usize> {
        self.positions_where(|existing| existing.id != item.id && excludes(item, existing))
    }

    /// Positions of room, bid, and room-upgrade items.
    pub fn room_state_positions(&self) -> Vec<usize> {
        self.positions_where(BookingItem::represents_room_state)
    }

    pub fn position_of(&self, item_id: &str) -> Option<usize> {
        self.items.iter().position(|i| i.id == item_id)
    }

    fn positions_where<F>(&self, pred: F) -> Vec<usize>
    where
        F: Fn(&BookingItem) -> bool,
    {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| pred(item))
            .map(|(pos, _)| pos)
            .collect()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Raw sum of item prices.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(|i| i.price).sum()
    }

    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn item(&self, item_id: &str) -> Option<&BookingItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn items_of_type(&self, item_type: ItemType) -> impl Iterator<Item = &BookingItem> {
        self.items.iter().filter(move |i| i.item_type == item_type)
    }

    pub fn items_in_category<'a, 'c>(
        &'a self,
        category: &'c str,
    ) -> impl Iterator<Item = &'a BookingItem> + 'c
    where
        'a: 'c,
    {
        self.items
            .iter()
            .filter(move |i| i.category() == Some(category))
    }

    /// The current room or bid item, if any.
    pub fn room_state_item(&self) -> Option<&BookingItem> {
        self.items.iter().find(|i| i.item_type.is_room_state())
    }
}

/// Whether inserting `new` drops `existing` from the room.
fn excludes(new: &BookingItem, existing: &BookingItem) -> bool {
    match new.item_type {
        ItemType::Customization => {
            existing.item_type == ItemType::Customization && existing.category == new.category
        }
        ItemType::Room | ItemType::Bid => existing.item_type.is_room_state(),
        ItemType::Offer => false,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
