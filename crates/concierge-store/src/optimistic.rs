//! # Optimistic Update Coordinator
//!
//! Bookkeeping for mutations that are applied before an external
//! confirmation arrives.
//!
//! ## Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  start(op) ───► open an empty journal, op starts recording             │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  synchronous mutation ───► each change is appended to op's journal     │
//! │     │                      (already visible to readers)                 │
//! │     ▼                                                                   │
//! │  stop_recording()  (or the next start)                                  │
//! │     │                                                                   │
//! │     ├── confirmation ok ───► complete(op): drop journal                │
//! │     │                                                                   │
//! │     └── confirmation err ──► rollback(op): undo op's changes only,     │
//! │                              newest first, caller rethrows             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only one operation records at a time, so two operations in flight never
//! share a journal. Undoing one operation leaves changes made by any other
//! operation in place.
//!
//! Nothing here times out. The caller that started an operation is the one
//! that completes or rolls it back.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use concierge_core::{BookingItem, CoreError, CoreResult, RoomBooking};
use tracing::debug;

// =============================================================================
// Changes
// =============================================================================

/// One reversible change to room state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// An item was appended to a room.
    ItemAdded { room_id: String, item_id: String },
    /// An item left a room from `position`.
    ItemRemoved {
        room_id: String,
        position: usize,
        item: BookingItem,
    },
    /// An item was changed in place.
    ItemUpdated {
        room_id: String,
        before: BookingItem,
        after: BookingItem,
    },
    /// Display name and image of a room changed.
    RoomRelabeled {
        room_id: String,
        before: RoomLabel,
        after: RoomLabel,
    },
    /// The active-room pointer moved.
    ActiveRoom {
        before: Option<String>,
        after: Option<String>,
    },
    RoomAdded { room_id: String },
    RoomRemoved { position: usize, room: RoomBooking },
}

/// The display fields an upgrade rewrites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomLabel {
    pub name: String,
    pub image: Option<String>,
}

impl RoomLabel {
    pub fn of(room: &RoomBooking) -> Self {
        RoomLabel {
            name: room.room_name.clone(),
            image: room.room_image.clone(),
        }
    }
}

/// Changes made on behalf of one operation, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journal {
    pub changes: Vec<Change>,
    pub started_at: DateTime<Utc>,
}

impl Journal {
    fn new() -> Self {
        Journal {
            changes: Vec::new(),
            started_at: Utc::now(),
        }
    }
}

// =============================================================================
// Coordinator
// =============================================================================

/// In-flight optimistic operations keyed by operation id.
#[derive(Debug, Clone, Default)]
pub struct OptimisticUpdates {
    in_flight: BTreeMap<String, Journal>,
    recording: Option<String>,
}

impl OptimisticUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `op_id` as in flight and makes it the recording operation.
    ///
    /// Reusing an id that has not finished is an error; the existing journal
    /// is kept.
    pub fn start(&mut self, op_id: &str) -> CoreResult<()> {
        if self.in_flight.contains_key(op_id) {
            return Err(CoreError::OperationInFlight(op_id.to_string()));
        }
        debug!(op_id, in_flight = self.in_flight.len(), "Optimistic update started");
        self.in_flight.insert(op_id.to_string(), Journal::new());
        self.recording = Some(op_id.to_string());
        Ok(())
    }

    /// Appends a change to the recording operation's journal, if any.
    pub fn record(&mut self, change: Change) {
        let Some(op_id) = &self.recording else {
            return;
        };
        if let Some(journal) = self.in_flight.get_mut(op_id) {
            journal.changes.push(change);
        }
    }

    /// Ends recording. Later mutations belong to no operation.
    pub fn stop_recording(&mut self) {
        self.recording = None;
    }

    pub fn recording(&self) -> Option<&str> {
        self.recording.as_deref()
    }

    /// Confirms `op_id`. Returns false for unknown ids.
    pub fn complete(&mut self, op_id: &str) -> bool {
        let known = self.finish(op_id).is_some();
        debug!(op_id, known, "Optimistic update completed");
        known
    }

    /// Removes `op_id` and hands back its journal to undo.
    pub fn rollback(&mut self, op_id: &str) -> Option<Journal> {
        let journal = self.finish(op_id);
        debug!(op_id, known = journal.is_some(), "Optimistic update rolled back");
        journal
    }

    fn finish(&mut self, op_id: &str) -> Option<Journal> {
        if self.recording.as_deref() == Some(op_id) {
            self.recording = None;
        }
        self.in_flight.remove(op_id)
    }

    pub fn is_in_flight(&self, op_id: &str) -> bool {
        self.in_flight.contains_key(op_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.in_flight.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    pub fn clear(&mut self) {
        self.in_flight.clear();
        self.recording = None;
    }
}
