//! # concierge-core: Pure Booking Logic for Concierge
//!
//! This crate holds the booking rules of the upsell widgets as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Concierge Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Upsell Widgets (UI)                          │   │
//! │  │   Room picker ──► Customizer ──► Offers ──► Pricing summary    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ intents / reads                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 concierge-store                                 │   │
//! │  │   BookingStore, optimistic updates, persistence, config        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ concierge-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   room    │  │   rules   │  │  pricing  │  │   │
//! │  │   │ Item model│  │ RoomBook. │  │  RuleSet  │  │ Breakdown │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐                 │   │
//! │  │   │   money   │  │validation │  │  legacy   │                 │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘                 │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO GLOBAL STATE • PURE FUNCTIONS                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Item model (ItemInput, BookingItem, RoomOption, ...)
//! - [`room`] - Room aggregate with structural eviction
//! - [`rules`] - Declarative compatibility rules
//! - [`validation`] - Input validators and room-level item checks
//! - [`pricing`] - Totals and pricing-rule adjustments
//! - [`legacy`] - Adapter for widgets that read the single-booking shape
//! - [`money`] - Integer-cent Money type
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use concierge_core::{categories, BookingItem, ItemInput, Money, NewRoom, RoomBooking, RuleSet};
//!
//! let mut room = RoomBooking::from(NewRoom::new("r1", "Deluxe King", 2));
//! room.insert_item(BookingItem::new(
//!     ItemInput::customization("Garden view", categories::VIEW, "garden", Money::from_cents(3000)),
//!     "r1",
//! ));
//!
//! let candidate = BookingItem::new(
//!     ItemInput::customization("Ocean view", categories::VIEW, "ocean", Money::from_cents(4500)),
//!     "r1",
//! );
//! let result = RuleSet::hotel_defaults().check_compatibility(&candidate, &room.items, &room);
//!
//! assert!(!result.is_valid);
//! assert_eq!(result.conflicts[0].conflicting_items, vec![room.items[0].id.clone()]);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod legacy;
pub mod money;
pub mod pricing;
pub mod room;
pub mod rules;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use legacy::{from_legacy, to_legacy, LegacyBooking};
pub use money::Money;
pub use pricing::{PriceAdjustment, PriceBreakdown, PricingRule};
pub use room::{NewRoom, RoomBooking};
pub use rules::{
    BusinessRule, Conflict, ItemSelector, RuleKind, RuleSet, RuleType, Severity, Suggestion,
    ValidationResult,
};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum items a single room booking may hold.
///
/// Guards against a widget stuck in an add loop.
pub const MAX_ITEMS_PER_ROOM: usize = 50;

/// Longest stay a booking may cover.
pub const MAX_NIGHTS: u32 = 365;

/// Maximum length of an item display name.
pub const MAX_NAME_LENGTH: usize = 120;
