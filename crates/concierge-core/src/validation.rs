//! # Validation Module
//!
//! Pure validators for booking intents.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Input validators (this module, Result-returning)             │
//! │  ├── empty names, bad ids, non-positive bids                           │
//! │  └── failure = ValidationError, the intent never reaches the rules     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Room-level item checks (this module, issue-returning)        │
//! │  ├── guest capacity, negative absolute room price                      │
//! │  └── look at ONE item and its room, never at the other items           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Compatibility rules (rules.rs)                               │
//! │  └── candidate vs. existing items                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::room::RoomBooking;
use crate::rules::Severity;
use crate::types::{BookingItem, ItemInput, ItemType};
use crate::{MAX_ITEMS_PER_ROOM, MAX_NAME_LENGTH, MAX_NIGHTS};

/// Result type for validation operations.
pub type InputResult<T> = Result<T, ValidationError>;

// =============================================================================
// Input Validators
// =============================================================================

/// Validates an item display name.
///
/// ```rust
/// use concierge_core::validation::validate_item_name;
///
/// assert!(validate_item_name("Ocean view").is_ok());
/// assert!(validate_item_name("  ").is_err());
/// ```
pub fn validate_item_name(name: &str) -> InputResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a room id supplied by the initializer.
///
/// ## Rules
/// - Must not be empty
/// - No whitespace (ids end up in storage keys and log fields)
pub fn validate_room_id(id: &str) -> InputResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "room id".to_string(),
        });
    }

    if id.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "room id".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates the stay length. A booking covers at least one night.
pub fn validate_nights(nights: u32) -> InputResult<()> {
    if nights == 0 || nights > MAX_NIGHTS {
        return Err(ValidationError::OutOfRange {
            field: "nights".to_string(),
            min: 1,
            max: MAX_NIGHTS as i64,
        });
    }

    Ok(())
}

/// Validates an upgrade bid. Bids are absolute amounts and must be positive.
pub fn validate_bid_amount(amount: Money) -> InputResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "bid amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a whole item intent before it reaches the rules engine.
pub fn validate_item_input(input: &ItemInput) -> InputResult<()> {
    validate_item_name(&input.name)?;

    if input.item_type == ItemType::Customization
        && input.category.as_deref().map_or(true, |c| c.trim().is_empty())
    {
        return Err(ValidationError::Required {
            field: "category".to_string(),
        });
    }

    if input.item_type == ItemType::Bid {
        validate_bid_amount(input.price)?;
    }

    Ok(())
}

/// Validates that a room can take one more item.
pub fn validate_room_limit(current_items: usize) -> InputResult<()> {
    if current_items >= MAX_ITEMS_PER_ROOM {
        return Err(ValidationError::OutOfRange {
            field: "room items".to_string(),
            min: 0,
            max: MAX_ITEMS_PER_ROOM as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Room-level Item Checks
// =============================================================================

/// A finding from a room-level item check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemIssue {
    pub severity: Severity,
    pub message: String,
}

impl ItemIssue {
    fn error(message: String) -> Self {
        ItemIssue {
            severity: Severity::Error,
            message,
        }
    }

    fn warning(message: String) -> Self {
        ItemIssue {
            severity: Severity::Warning,
            message,
        }
    }
}

/// Runs every room-level check for one item.
///
/// ## Checks
/// - Guest capacity: a room/bid item whose `max_occupancy` is below the
///   room's guest count is an error
/// - A `room` item must not carry a negative absolute price
///   (upgrade deltas carry `upgrade_amount` and are exempt)
/// - A per-night item on a room without nights is a warning
pub fn check_item_against_room(item: &BookingItem, room: &RoomBooking) -> Vec<ItemIssue> {
    let mut issues = Vec::new();

    if let Some(max) = item.metadata.max_occupancy {
        if item.item_type.is_room_state() && max < room.guests {
            issues.push(ItemIssue::error(format!(
                "{} accommodates {} guests, booking has {}",
                item.name, max, room.guests
            )));
        }
    }

    if item.item_type == ItemType::Room
        && item.price.is_negative()
        && item.metadata.upgrade_amount.is_none()
    {
        issues.push(ItemIssue::error(format!(
            "{} has a negative room price",
            item.name
        )));
    }

    if item.metadata.per_night && room.nights == 0 {
        issues.push(ItemIssue::warning(format!(
            "{} is priced per night but the stay has no nights",
            item.name
        )));
    }

    issues
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::NewRoom;
    use crate::types::{categories, ItemMetadata};

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Late checkout").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name(&"A".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_room_id() {
        assert!(validate_room_id("room-101").is_ok());
        assert!(validate_room_id("").is_err());
        assert!(validate_room_id("room 101").is_err());
    }

    #[test]
    fn test_validate_nights() {
        assert!(validate_nights(1).is_ok());
        assert!(validate_nights(MAX_NIGHTS).is_ok());
        assert!(validate_nights(0).is_err());
        assert!(validate_nights(MAX_NIGHTS + 1).is_err());
    }

    #[test]
    fn test_validate_bid_amount() {
        assert!(validate_bid_amount(Money::from_cents(1)).is_ok());
        assert!(validate_bid_amount(Money::zero()).is_err());
        assert!(validate_bid_amount(Money::from_cents(-100)).is_err());
    }

    #[test]
    fn test_customization_requires_category() {
        let missing = ItemInput::new("Ocean", Money::zero(), ItemType::Customization);
        assert!(matches!(
            validate_item_input(&missing),
            Err(ValidationError::Required { .. })
        ));

        let ok = missing.with_category(categories::VIEW);
        assert!(validate_item_input(&ok).is_ok());
    }

    #[test]
    fn test_room_capacity_limit() {
        assert!(validate_room_limit(0).is_ok());
        assert!(validate_room_limit(MAX_ITEMS_PER_ROOM).is_err());
    }

    #[test]
    fn test_guest_capacity_check() {
        let room = RoomBooking::from(NewRoom::new("r1", "Family", 3).with_guests(4));
        let item = BookingItem::new(
            ItemInput::new("Junior Suite", Money::from_cents(5000), ItemType::Room)
                .with_metadata(ItemMetadata {
                    max_occupancy: Some(2),
                    ..ItemMetadata::default()
                }),
            "r1",
        );

        let issues = check_item_against_room(&item, &room);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn test_upgrade_delta_may_be_negative() {
        let room = RoomBooking::from(NewRoom::new("r1", "Suite", 1));
        let downgrade = BookingItem::new(
            ItemInput::new("Standard", Money::from_cents(-2000), ItemType::Room).with_metadata(
                ItemMetadata {
                    upgrade_amount: Some(Money::from_cents(-2000)),
                    ..ItemMetadata::default()
                },
            ),
            "r1",
        );

        assert!(check_item_against_room(&downgrade, &room).is_empty());
    }
}
