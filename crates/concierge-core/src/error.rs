//! # Error Types
//!
//! Domain-specific error types for concierge-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  concierge-core errors (this file)                                     │
//! │  ├── CoreError        - Structural failures (unknown room, ...)        │
//! │  └── ValidationError  - Malformed intent input                         │
//! │                                                                         │
//! │  concierge-store errors (separate crate)                               │
//! │  └── StoreError       - Persistence / configuration failures           │
//! │                                                                         │
//! │  NOT errors: business-rule conflicts. Those are data, returned in a    │
//! │  `ValidationResult` so the widget can explain why an add was blocked.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Structural errors raised by store mutations.
///
/// These are thrown back to the calling widget, which typically surfaces them
/// as a toast. Business-rule conflicts are never reported through this type.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A mutation referenced a room id that is not in the store.
    #[error("Room not found: {0}")]
    RoomNotFound(String),

    /// A room with this id already exists.
    ///
    /// Returned by `insert_room`. `add_room` swallows it (first writer wins).
    #[error("Room already exists: {0}")]
    DuplicateRoom(String),

    /// `set_active_room` was given an id that is not in the store.
    #[error("Cannot activate unknown room: {0}")]
    ActiveRoomNotFound(String),

    /// Operation not allowed in the current booking mode.
    #[error("Operation not allowed in {mode} mode: {reason}")]
    ModeMismatch { mode: String, reason: String },

    /// Room already holds the maximum number of items.
    #[error("Room {room_id} cannot hold more than {max} items")]
    RoomLimitReached { room_id: String, max: usize },

    /// An optimistic operation with this id is already in flight.
    #[error("Optimistic operation already in flight: {0}")]
    OperationInFlight(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for item and room intents.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
