//! # Store Error Types
//!
//! Error type for everything the store does beyond pure booking logic.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Store Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │   Booking       │  │   Persistence   │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Core(CoreError)│  │  Io             │  │  ConfigParse            │ │
//! │  │                 │  │  Serialization  │  │  ConfigSerialize        │ │
//! │  │                 │  │  Unsupported-   │  │  InvalidConfig          │ │
//! │  │                 │  │   Version       │  │  NoDataDir              │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use concierge_core::CoreError;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // Booking Errors
    // =========================================================================
    /// A booking mutation failed.
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    /// Reading or writing persisted state failed.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted state is not valid JSON for this version.
    #[error("Persisted state could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisted state was written by a newer engine.
    #[error("Unsupported persisted state version {found} (max {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// No platform data directory could be determined.
    #[error("No data directory available on this platform")]
    NoDataDir,

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// concierge.toml could not be parsed.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Config could not be written back.
    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// Config parsed but holds invalid values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
