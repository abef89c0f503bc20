//! # Pricing Derivation
//!
//! Pure functions that turn stored item prices into totals.
//!
//! ## Two Passes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Pass 1: raw sum                                                        │
//! │    room_total = Σ item.price                                            │
//! │    (upgrade items already hold a delta, bids an absolute amount)       │
//! │                                                                         │
//! │  Pass 2: pricing rules (optional)                                       │
//! │    PerNight        + price × (nights − 1) for per-night items           │
//! │    VolumeDiscount  − bps of offer sum when enough offers are picked     │
//! │    Surcharge       + bps of matching item prices                        │
//! │                                                                         │
//! │  Adjustments are reported next to the subtotal. Stored prices are      │
//! │  never rewritten.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::legacy::LegacyBooking;
use crate::money::Money;
use crate::room::RoomBooking;
use crate::rules::ItemSelector;
use crate::types::{BookingItem, ItemType};

// =============================================================================
// Raw Totals
// =============================================================================

/// Arithmetic sum of item prices.
pub fn room_total(items: &[BookingItem]) -> Money {
    items.iter().map(|i| i.price).sum()
}

/// Total of a legacy single booking.
///
/// `selected_room + Σ customizations + Σ special_offers + bid`, where the bid
/// only counts while it is `Submitted` or `Pending`.
pub fn legacy_total(booking: &LegacyBooking) -> Money {
    let room = booking
        .selected_room
        .as_ref()
        .map_or(Money::zero(), |r| r.price);
    let customizations: Money = booking.customizations.values().map(|c| c.price).sum();
    let offers: Money = booking.special_offers.iter().map(|o| o.price).sum();
    let bid = booking
        .active_bid
        .as_ref()
        .filter(|b| b.status.counts_towards_total())
        .map_or(Money::zero(), |b| b.amount);

    room + customizations + offers + bid
}

// =============================================================================
// Pricing Rules
// =============================================================================

/// An adjustment layered on top of the raw sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PricingRule {
    /// Items flagged `metadata.per_night` are charged for every night.
    PerNight,

    /// `discount_bps` off the offer sum once `min_offers` offers are picked.
    VolumeDiscount { min_offers: usize, discount_bps: u32 },

    /// `bps` on top of every matching item.
    Surcharge {
        applies_to: ItemSelector,
        bps: u32,
        label: String,
    },
}

/// Per-night charging plus "10% off three or more offers".
pub fn default_pricing_rules() -> Vec<PricingRule> {
    vec![
        PricingRule::PerNight,
        PricingRule::VolumeDiscount {
            min_offers: 3,
            discount_bps: 1000,
        },
    ]
}

/// One line in a price breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceAdjustment {
    pub label: String,
    pub amount: Money,
    /// Item the adjustment stems from, if it is item-specific.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
}

/// Subtotal, adjustments, and the resulting total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub subtotal: Money,
    pub adjustments: Vec<PriceAdjustment>,
    pub total: Money,
}

impl PriceBreakdown {
    /// Adds another breakdown (e.g. the next room) into this one.
    pub fn absorb(&mut self, other: PriceBreakdown) {
        self.subtotal += other.subtotal;
        self.total += other.total;
        self.adjustments.extend(other.adjustments);
    }
}

/// Prices a room: raw subtotal plus every rule's adjustments.
pub fn price_room(room: &RoomBooking, rules: &[PricingRule]) -> PriceBreakdown {
    let subtotal = room.subtotal();
    let adjustments: Vec<PriceAdjustment> = rules
        .iter()
        .flat_map(|rule| adjustments_for(rule, room))
        .collect();
    let total = subtotal + adjustments.iter().map(|a| a.amount).sum::<Money>();

    PriceBreakdown {
        subtotal,
        adjustments,
        total,
    }
}

fn adjustments_for(rule: &PricingRule, room: &RoomBooking) -> Vec<PriceAdjustment> {
    match rule {
        PricingRule::PerNight => per_night(room),
        PricingRule::VolumeDiscount {
            min_offers,
            discount_bps,
        } => volume_discount(room, *min_offers, *discount_bps)
            .into_iter()
            .collect(),
        PricingRule::Surcharge {
            applies_to,
            bps,
            label,
        } => room
            .items
            .iter()
            .filter(|i| applies_to.matches(i))
            .map(|i| PriceAdjustment {
                label: format!("{} ({})", label, i.name),
                amount: i.price.percentage(*bps),
                item_id: Some(i.id.clone()),
            })
            .filter(|a| !a.amount.is_zero())
            .collect(),
    }
}

fn per_night(room: &RoomBooking) -> Vec<PriceAdjustment> {
    if room.nights <= 1 {
        return Vec::new();
    }
    let extra_nights = i64::from(room.nights - 1);

    room.items
        .iter()
        .filter(|i| i.metadata.per_night)
        .map(|i| PriceAdjustment {
            label: format!("{} x {} nights", i.name, room.nights),
            amount: i.price.times(extra_nights),
            item_id: Some(i.id.clone()),
        })
        .collect()
}

fn volume_discount(room: &RoomBooking, min_offers: usize, bps: u32) -> Option<PriceAdjustment> {
    let offers: Vec<&BookingItem> = room.items_of_type(ItemType::Offer).collect();
    if offers.is_empty() || offers.len() < min_offers {
        return None;
    }

    let offer_sum: Money = offers.iter().map(|o| o.price).sum();
    let discount = offer_sum.percentage(bps);
    if discount.is_zero() {
        return None;
    }

    Some(PriceAdjustment {
        label: format!("{}% off {} offers", bps / 100, offers.len()),
        amount: -discount,
        item_id: None,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
