//! # Persisted Booking State
//!
//! The subset of store state that survives a page reload, and the storage
//! backends it is written to.
//!
//! ## What Is Persisted
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PersistedState (JSON, key "concierge-booking-state")                   │
//! │  ─────────────────────────────────────────────────────────────────────  │
//! │  version          schema version, newer versions are refused           │
//! │  mode             single | multi                                       │
//! │  rooms            every RoomBooking with its items                     │
//! │  activeRoomId                                                          │
//! │  reservation      reservation metadata                                 │
//! │  legacy           single-booking shape, read for migration only        │
//! │                                                                         │
//! │  NOT persisted: optimistic bookkeeping, showMobilePricing, rules,      │
//! │  pricing rules (those come from configuration)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use concierge_core::{
    from_legacy, BookingItem, BookingMode, ItemType, LegacyBooking, NewRoom, RoomBooking,
    RoomOption,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::store::Reservation;

/// Fixed storage key for the booking state.
pub const STORAGE_KEY: &str = "concierge-booking-state";

/// Current schema version.
///
/// Version 1 held only the single-booking fields; version 2 added rooms.
pub const STATE_VERSION: u32 = 2;

/// Room id given to a single booking migrated from the legacy shape.
pub const SINGLE_ROOM_ID: &str = "single";

// =============================================================================
// Persisted State
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default = "legacy_version")]
    pub version: u32,
    #[serde(default)]
    pub mode: BookingMode,
    #[serde(default)]
    pub rooms: Vec<RoomBooking>,
    #[serde(default)]
    pub active_room_id: Option<String>,
    #[serde(default)]
    pub reservation: Option<Reservation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy: Option<LegacyBooking>,
}

/// Documents without a version field predate rooms.
fn legacy_version() -> u32 {
    1
}

impl PersistedState {
    /// Parses and upgrades a stored document.
    ///
    /// A document that only carries the legacy single booking gets that
    /// booking turned into one room.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        let mut state: PersistedState = serde_json::from_str(json)?;

        if state.version > STATE_VERSION {
            return Err(StoreError::UnsupportedVersion {
                found: state.version,
                supported: STATE_VERSION,
            });
        }

        if state.rooms.is_empty() {
            if let Some(legacy) = state.legacy.take().filter(|l| !l.is_empty()) {
                info!(from_version = state.version, "Migrating legacy single booking");
                state.rooms.push(migrate_legacy(&legacy));
                state.active_room_id = Some(SINGLE_ROOM_ID.to_string());
            }
        }
        state.version = STATE_VERSION;

        Ok(state)
    }

    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Builds the room a legacy single booking becomes.
pub fn migrate_legacy(legacy: &LegacyBooking) -> RoomBooking {
    let name = legacy
        .selected_room
        .as_ref()
        .map_or_else(|| "Room".to_string(), |r| r.name.clone());
    let mut new_room = NewRoom::new(SINGLE_ROOM_ID, name, 1);

    // A bid placed over a booked room keeps both: the room becomes the base
    // room and the bid takes the room-state slot.
    let bid_over_room = match (&legacy.selected_room, &legacy.active_bid) {
        (Some(selected), Some(_)) => {
            new_room = new_room.with_base_room(RoomOption::new(
                selected.code.clone(),
                selected.name.clone(),
                selected.price,
            ));
            true
        }
        _ => false,
    };

    let mut room = RoomBooking::from(new_room);
    room.is_active = true;

    for input in from_legacy(legacy) {
        if bid_over_room && input.item_type == ItemType::Room {
            continue;
        }
        room.insert_item(BookingItem::new(input, SINGLE_ROOM_ID));
    }
    room
}

// =============================================================================
// Storage Backends
// =============================================================================

/// Key/value storage for serialized state.
pub trait StateStorage {
    fn load(&self, key: &str) -> StoreResult<Option<String>>;
    fn save(&self, key: &str, value: &str) -> StoreResult<()>;
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStorage { dir: dir.into() }
    }

    /// Platform data directory for the engine.
    ///
    /// - Linux: `~/.local/share/concierge`
    /// - macOS: `~/Library/Application Support/com.concierge.concierge`
    pub fn default_location() -> StoreResult<Self> {
        directories::ProjectDirs::from("com", "concierge", "concierge")
            .map(|dirs| FileStorage::new(dirs.data_dir()))
            .ok_or(StoreError::NoDataDir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StateStorage for FileStorage {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!(?path, "No persisted state");
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    /// Writes through a temp file and a rename so readers never see a
    /// half-written document.
    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        debug!(?path, bytes = value.len(), "State written");
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// In-process storage for tests and embedders without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::legacy::{ActiveBid, LegacyCustomization, SelectedRoom};
    use concierge_core::pricing::legacy_total;
    use concierge_core::{to_legacy, BidStatus, Money};

    fn legacy_booking() -> LegacyBooking {
        let mut legacy = LegacyBooking {
            selected_room: Some(SelectedRoom {
                code: "DLX".to_string(),
                name: "Deluxe".to_string(),
                price: Money::from_cents(12000),
                full_price: None,
            }),
            ..LegacyBooking::default()
        };
        legacy.customizations.insert(
            "view".to_string(),
            LegacyCustomization {
                name: "Ocean view".to_string(),
                option: Some("ocean".to_string()),
                price: Money::from_cents(3000),
                per_night: false,
            },
        );
        legacy
    }

    #[test]
    fn test_legacy_document_is_migrated() {
        let json = serde_json::json!({
            "mode": "single",
            "legacy": legacy_booking(),
        })
        .to_string();

        let state = PersistedState::from_json(&json).unwrap();

        assert_eq!(state.version, STATE_VERSION);
        assert_eq!(state.rooms.len(), 1);
        assert_eq!(state.rooms[0].id, SINGLE_ROOM_ID);
        assert_eq!(state.rooms[0].item_count(), 2);
        assert_eq!(state.rooms[0].subtotal().cents(), 15000);
        assert_eq!(state.active_room_id.as_deref(), Some(SINGLE_ROOM_ID));
        assert!(state.legacy.is_none());
    }

    #[test]
    fn test_legacy_bid_over_room_keeps_both() {
        let mut legacy = legacy_booking();
        legacy.customizations.clear();
        legacy.active_bid = Some(ActiveBid {
            room_type: "STE".to_string(),
            amount: Money::from_cents(5000),
            status: BidStatus::Pending,
        });
        let expected = legacy_total(&legacy);

        let room = migrate_legacy(&legacy);

        assert_eq!(expected, Money::from_cents(17000));
        assert_eq!(room.base_room.as_ref().map(|b| b.code.as_str()), Some("DLX"));
        assert_eq!(room.items_of_type(ItemType::Bid).count(), 1);
        assert_eq!(room.items_of_type(ItemType::Room).count(), 0);
        assert_eq!(legacy_total(&to_legacy(&room)), expected);
    }

    #[test]
    fn test_newer_version_is_refused() {
        let json = serde_json::json!({ "version": STATE_VERSION + 1 }).to_string();
        assert!(matches!(
            PersistedState::from_json(&json),
            Err(StoreError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_garbage_is_a_serialization_error() {
        assert!(matches!(
            PersistedState::from_json("{not json"),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("state"));

        assert_eq!(storage.load(STORAGE_KEY).unwrap(), None);
        storage.save(STORAGE_KEY, "{\"version\":2}").unwrap();
        assert_eq!(
            storage.load(STORAGE_KEY).unwrap().as_deref(),
            Some("{\"version\":2}")
        );

        storage.remove(STORAGE_KEY).unwrap();
        assert_eq!(storage.load(STORAGE_KEY).unwrap(), None);
        // Removing twice is fine
        storage.remove(STORAGE_KEY).unwrap();
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        storage.save("k", "v").unwrap();
        assert_eq!(storage.load("k").unwrap().as_deref(), Some("v"));
        storage.remove("k").unwrap();
        assert!(storage.load("k").unwrap().is_none());
    }
}
