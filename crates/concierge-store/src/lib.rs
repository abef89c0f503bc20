//! # concierge-store: Booking State for the Upsell Widgets
//!
//! Holds the rooms a guest is editing, routes every intent through the rules
//! in `concierge-core`, and keeps enough history to undo optimistic changes.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Widgets ──► StoreHandle (Arc<Mutex<BookingStore>>)                    │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │   ┌─────────────────────────────────────────────────────────────────┐  │
//! │   │                BookingStore (store.rs)                          │  │
//! │   │   rooms ─ active room ─ mode ─ reservation ─ last_update        │  │
//! │   │      │              │                         │                 │  │
//! │   │      ▼              ▼                         ▼                 │  │
//! │   │   RuleSet      OptimisticUpdates        PersistedState          │  │
//! │   │  (core)        (journals)               (StateStorage)          │  │
//! │   └─────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │   EngineConfig (concierge.toml, CONCIERGE_* env)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`store`] - BookingStore: mutations, intents, reads
//! - [`optimistic`] - In-flight operations and their change journals
//! - [`handle`] - Shared handle with async optimistic wrappers
//! - [`persistence`] - Persisted state and storage backends
//! - [`config`] - Engine configuration
//! - [`telemetry`] - Tracing subscriber setup
//! - [`error`] - Store error type
//!
//! ## Example Usage
//!
//! ```rust
//! use concierge_store::{BookingStore, IntentOutcome};
//! use concierge_core::{categories, BookingMode, ItemInput, Money, NewRoom};
//!
//! let mut store = BookingStore::new(BookingMode::Multi);
//! store.add_room(NewRoom::new("r1", "Deluxe King", 2)).unwrap();
//! store.add_room(NewRoom::new("r2", "Twin", 2)).unwrap();
//!
//! let outcome = store
//!     .add_item("r1", ItemInput::customization("High floor", categories::FLOOR, "high", Money::from_cents(1500)))
//!     .unwrap();
//! assert!(matches!(outcome, IntentOutcome::Committed { .. }));
//! assert_eq!(store.total_price().cents(), 1500);
//! ```

pub mod config;
pub mod error;
pub mod handle;
pub mod optimistic;
pub mod persistence;
pub mod store;
pub mod telemetry;

pub use config::EngineConfig;
pub use error::{StoreError, StoreResult};
pub use handle::StoreHandle;
pub use optimistic::{Change, Journal, OptimisticUpdates, RoomLabel};
pub use persistence::{FileStorage, MemoryStorage, PersistedState, StateStorage, STORAGE_KEY};
pub use store::{BookingStore, IntentOutcome, Reservation};
pub use telemetry::init_tracing;
