//! # Store Handle
//!
//! Cloneable handle through which widgets share one [`BookingStore`].
//!
//! ## Thread Safety
//! The store is wrapped in `Arc<Mutex<T>>`:
//! - `Arc`: every widget holds its own clone of the handle
//! - `Mutex`: only one intent mutates the store at a time
//!
//! The lock is taken per closure and never held across an `.await`, so a
//! slow confirmation does not stall readers.
//!
//! ## Optimistic Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  switch_room / add_item                                                 │
//! │                                                                         │
//! │  lock ─► start(op) ─► mutation ─► end recording ─► unlock              │
//! │                                                        │                │
//! │                                      confirm().await ◄─┘                │
//! │                                         │                               │
//! │             Ok ─► lock ─► complete(op)  │  Err ─► lock ─► rollback(op)  │
//! │                                         │         return caller's error │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use concierge_core::{CoreError, CoreResult, ItemInput};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::store::{BookingStore, IntentOutcome};

#[derive(Debug, Clone, Default)]
pub struct StoreHandle {
    store: Arc<Mutex<BookingStore>>,
}

impl StoreHandle {
    pub fn new(store: BookingStore) -> Self {
        StoreHandle {
            store: Arc::new(Mutex::new(store)),
        }
    }

    /// Executes a function with read access to the store.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let total = handle.read(|store| store.total_price());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&BookingStore) -> R,
    {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&store)
    }

    /// Executes a function with write access to the store.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// handle.write(|store| store.set_active_room("r2"))?;
    /// ```
    pub fn write<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut BookingStore) -> R,
    {
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }

    /// Activates `room_id` right away, then waits for `confirm`.
    ///
    /// On a confirmation error the previous active room is restored and the
    /// error is returned unchanged.
    pub async fn switch_room<F, Fut, E>(&self, room_id: &str, confirm: F) -> Result<(), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: From<CoreError>,
    {
        let op_id = format!("switch-room-{}", Uuid::new_v4());
        self.begin(&op_id, |store| store.set_active_room(room_id))?;
        self.finish(&op_id, confirm().await)
    }

    /// Adds an item through the rules right away, then waits for `confirm`.
    ///
    /// A [`IntentOutcome::Blocked`] add changes nothing, so it is returned
    /// without calling `confirm`. On a confirmation error the item is taken
    /// out again and any items it evicted come back.
    pub async fn add_item<F, Fut, E>(
        &self,
        room_id: &str,
        input: ItemInput,
        confirm: F,
    ) -> Result<IntentOutcome, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: From<CoreError>,
    {
        let op_id = format!("add-item-{}", Uuid::new_v4());
        let outcome = self.begin(&op_id, |store| store.add_item(room_id, input))?;
        if !outcome.is_committed() {
            debug!(op_id = %op_id, room_id, "Add blocked by rules, nothing to confirm");
            self.write(|store| store.rollback_optimistic_update(&op_id));
            return Ok(outcome);
        }

        self.finish(&op_id, confirm().await)?;
        Ok(outcome)
    }

    /// Starts `op_id` and applies `mutation` under one lock, so only that
    /// mutation is journaled for the operation. A failed mutation rolls the
    /// operation back before returning.
    fn begin<T, M>(&self, op_id: &str, mutation: M) -> CoreResult<T>
    where
        M: FnOnce(&mut BookingStore) -> CoreResult<T>,
    {
        self.write(|store| {
            store.start_optimistic_update(op_id)?;
            let result = mutation(store);
            store.end_optimistic_recording();
            result.map_err(|e| {
                store.rollback_optimistic_update(op_id);
                e
            })
        })
    }

    fn finish<E>(&self, op_id: &str, confirmation: Result<(), E>) -> Result<(), E> {
        match confirmation {
            Ok(()) => {
                self.write(|store| store.complete_optimistic_update(op_id));
                Ok(())
            }
            Err(e) => {
                warn!(op_id, "Confirmation failed, rolling back");
                self.write(|store| store.rollback_optimistic_update(op_id));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::{BookingMode, Money, NewRoom};

    #[derive(Debug, PartialEq)]
    enum WidgetError {
        Core(String),
        Network,
    }

    impl From<CoreError> for WidgetError {
        fn from(e: CoreError) -> Self {
            WidgetError::Core(e.to_string())
        }
    }

    fn handle() -> StoreHandle {
        let mut store = BookingStore::new(BookingMode::Multi);
        store.add_room(NewRoom::new("r1", "Deluxe", 2)).unwrap();
        store.add_room(NewRoom::new("r2", "Twin", 2)).unwrap();
        StoreHandle::new(store)
    }

    #[tokio::test]
    async fn test_switch_room_confirmed() {
        let handle = handle();

        let result: Result<(), WidgetError> = handle.switch_room("r2", || async { Ok(()) }).await;

        assert!(result.is_ok());
        assert_eq!(handle.read(|s| s.active_room_id().map(String::from)), Some("r2".to_string()));
        assert!(handle.read(|s| s.pending_operations().is_empty()));
    }

    #[tokio::test]
    async fn test_switch_room_rolled_back() {
        let handle = handle();

        let result = handle
            .switch_room("r2", || async { Err(WidgetError::Network) })
            .await;

        assert_eq!(result, Err(WidgetError::Network));
        assert_eq!(handle.read(|s| s.active_room_id().map(String::from)), Some("r1".to_string()));
        assert!(handle.read(|s| s.room("r1").map(|r| r.is_active)).unwrap_or(false));
    }

    #[tokio::test]
    async fn test_switch_to_unknown_room_never_confirms() {
        let handle = handle();
        let mut confirmed = false;

        let result: Result<(), WidgetError> = handle
            .switch_room("r9", || {
                confirmed = true;
                async { Ok(()) }
            })
            .await;

        assert!(matches!(result, Err(WidgetError::Core(_))));
        assert!(!confirmed);
        assert!(handle.read(|s| s.pending_operations().is_empty()));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let handle = handle();
        let other = handle.clone();

        let outcome = other
            .add_item::<_, _, WidgetError>(
                "r1",
                ItemInput::offer("Spa", Money::from_cents(5000)),
                || async { Ok(()) },
            )
            .await
            .unwrap();

        assert_eq!(outcome.item().map(|i| i.room_id.as_str()), Some("r1"));
        assert_eq!(handle.read(|s| s.total_price()).cents(), 5000);
    }

    #[tokio::test]
    async fn test_prevented_item_is_blocked_without_confirming() {
        let handle = handle();
        let mut no_pets = ItemInput::offer("Allergy-free room", Money::zero());
        no_pets.metadata.prevents = vec!["Pet package".to_string()];
        handle.write(|s| s.add_item_to_room("r1", no_pets)).unwrap();
        let mut confirmed = false;

        let outcome = handle
            .add_item::<_, _, WidgetError>(
                "r1",
                ItemInput::offer("Pet package", Money::from_cents(2000)),
                || {
                    confirmed = true;
                    async { Ok(()) }
                },
            )
            .await
            .unwrap();

        assert!(!outcome.is_committed());
        assert!(!confirmed);
        assert_eq!(handle.read(|s| s.item_count()), 1);
        assert!(handle.read(|s| s.pending_operations().is_empty()));
    }

    #[tokio::test]
    async fn test_interleaved_adds_roll_back_independently() {
        let handle = handle();

        let failing = handle.add_item(
            "r1",
            ItemInput::offer("Spa", Money::from_cents(100)),
            || async {
                tokio::task::yield_now().await;
                Err(WidgetError::Network)
            },
        );
        let confirmed = handle.add_item::<_, _, WidgetError>(
            "r2",
            ItemInput::offer("Wine", Money::from_cents(200)),
            || async { Ok(()) },
        );
        let (failed, succeeded) = tokio::join!(failing, confirmed);

        assert_eq!(failed, Err(WidgetError::Network));
        assert!(succeeded.unwrap().is_committed());
        assert_eq!(handle.read(|s| s.room_total("r1").unwrap()).cents(), 0);
        assert_eq!(handle.read(|s| s.room_total("r2").unwrap()).cents(), 200);
        assert!(handle.read(|s| s.pending_operations().is_empty()));
    }
}
