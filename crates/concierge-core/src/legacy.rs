//! # Legacy Single-Booking Adapter
//!
//! Older widgets read one booking as four separate fields instead of a list
//! of items. Internally there is only the item representation; this module
//! maps between the two at the boundary.
//!
//! ```text
//! ┌──────────────────────────────┐          ┌──────────────────────────────┐
//! │  RoomBooking.items           │ to_legacy│  LegacyBooking               │
//! │  ──────────────────────────  │ ───────► │  ──────────────────────────  │
//! │  room / room-upgrade item    │          │  selected_room               │
//! │  customization (per category)│          │  customizations{category}    │
//! │  offer*                      │          │  special_offers[]            │
//! │  bid                         │ ◄─────── │  active_bid                  │
//! └──────────────────────────────┘from_leg. └──────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::room::RoomBooking;
use crate::types::{
    categories, BidStatus, BookingItem, Concept, ItemInput, ItemMetadata, ItemType,
};

// =============================================================================
// Legacy Shapes
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SelectedRoom {
    pub code: String,
    pub name: String,
    /// Price the room contributes to the total.
    pub price: Money,
    /// Absolute room price when `price` is an upgrade delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_price: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LegacyCustomization {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub per_night: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SpecialOffer {
    pub name: String,
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ActiveBid {
    pub room_type: String,
    pub amount: Money,
    pub status: BidStatus,
}

/// The single-booking shape read by legacy widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LegacyBooking {
    #[serde(default)]
    pub selected_room: Option<SelectedRoom>,
    /// Keyed by customization category.
    #[serde(default)]
    pub customizations: BTreeMap<String, LegacyCustomization>,
    #[serde(default)]
    pub special_offers: Vec<SpecialOffer>,
    #[serde(default)]
    pub active_bid: Option<ActiveBid>,
}

impl LegacyBooking {
    pub fn is_empty(&self) -> bool {
        self.selected_room.is_none()
            && self.customizations.is_empty()
            && self.special_offers.is_empty()
            && self.active_bid.is_none()
    }
}

// =============================================================================
// Mapping
// =============================================================================

/// Projects a room's items onto the legacy shape.
pub fn to_legacy(room: &RoomBooking) -> LegacyBooking {
    let mut legacy = LegacyBooking::default();

    for item in &room.items {
        match item.item_type {
            ItemType::Bid => legacy.active_bid = Some(active_bid(item)),
            ItemType::Room => legacy.selected_room = Some(selected_room(item)),
            ItemType::Customization if item.is_customization_in(categories::ROOM_UPGRADE) => {
                legacy.selected_room = Some(selected_room(item));
            }
            ItemType::Customization => {
                let category = item.category.clone().unwrap_or_default();
                legacy.customizations.insert(
                    category,
                    LegacyCustomization {
                        name: item.name.clone(),
                        option: item.metadata.option.clone(),
                        price: item.price,
                        per_night: item.metadata.per_night,
                    },
                );
            }
            ItemType::Offer => legacy.special_offers.push(SpecialOffer {
                name: item.name.clone(),
                price: item.price,
            }),
        }
    }

    // A bid sits on top of the booked room, which then lives in `base_room`.
    if legacy.selected_room.is_none() && legacy.active_bid.is_some() {
        legacy.selected_room = room.base_room.as_ref().map(|base| SelectedRoom {
            code: base.code.clone(),
            name: base.name.clone(),
            price: base.price,
            full_price: None,
        });
    }

    legacy
}

fn selected_room(item: &BookingItem) -> SelectedRoom {
    SelectedRoom {
        code: item.metadata.room_code.clone().unwrap_or_default(),
        name: item.name.clone(),
        price: item.price,
        full_price: item.metadata.full_price,
    }
}

fn active_bid(item: &BookingItem) -> ActiveBid {
    ActiveBid {
        room_type: item
            .metadata
            .room_code
            .clone()
            .unwrap_or_else(|| item.name.clone()),
        amount: item.price,
        status: item.metadata.bid_status.unwrap_or(BidStatus::Pending),
    }
}

/// Turns a legacy booking back into item intents, room state first.
pub fn from_legacy(legacy: &LegacyBooking) -> Vec<ItemInput> {
    let mut inputs = Vec::new();

    if let Some(room) = &legacy.selected_room {
        inputs.push(
            ItemInput::new(room.name.clone(), room.price, ItemType::Room)
                .with_concept(Concept::ChooseYourRoom)
                .with_metadata(ItemMetadata {
                    room_code: Some(room.code.clone()).filter(|c| !c.is_empty()),
                    full_price: room.full_price,
                    ..ItemMetadata::default()
                }),
        );
    }

    if let Some(bid) = &legacy.active_bid {
        inputs.push(
            ItemInput::new(
                format!("Upgrade bid: {}", bid.room_type),
                bid.amount,
                ItemType::Bid,
            )
            .with_concept(Concept::BidForUpgrade)
            .with_metadata(ItemMetadata {
                room_code: Some(bid.room_type.clone()),
                bid_status: Some(bid.status),
                ..ItemMetadata::default()
            }),
        );
    }

    for (category, custom) in &legacy.customizations {
        let mut input = ItemInput::new(custom.name.clone(), custom.price, ItemType::Customization)
            .with_category(category.clone())
            .with_concept(Concept::CustomizeYourStay);
        input.metadata.option = custom.option.clone();
        input.metadata.per_night = custom.per_night;
        inputs.push(input);
    }

    inputs.extend(
        legacy
            .special_offers
            .iter()
            .map(|o| ItemInput::offer(o.name.clone(), o.price)),
    );

    inputs
}

// =============================================================================
// Unit Tests
// =============================================================================
