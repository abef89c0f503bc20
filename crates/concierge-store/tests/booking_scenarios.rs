//! End-to-end booking scenarios driven through the public store API.

use concierge_core::legacy::{ActiveBid, SelectedRoom};
use concierge_core::pricing::legacy_total;
use concierge_core::{
    categories, BidStatus, BookingMode, CoreError, ItemInput, ItemPatch, ItemType, LegacyBooking,
    Money, NewRoom, RoomOption, MAX_ITEMS_PER_ROOM,
};
use concierge_store::{
    BookingStore, EngineConfig, FileStorage, IntentOutcome, MemoryStorage, StateStorage,
    StoreHandle, STORAGE_KEY,
};

fn cents(value: i64) -> Money {
    Money::from_cents(value)
}

fn view(option: &str, price: i64) -> ItemInput {
    ItemInput::customization(format!("{} view", option), categories::VIEW, option, cents(price))
}

fn multi_store() -> BookingStore {
    let mut store = BookingStore::new(BookingMode::Multi);
    store.add_room(NewRoom::new("r1", "Deluxe King", 2)).unwrap();
    store.add_room(NewRoom::new("r2", "Twin", 2)).unwrap();
    store
}

// =============================================================================
// Structural Bounds
// =============================================================================

#[test]
fn test_one_customization_per_category_after_any_adds() {
    let mut store = multi_store();
    let picks = [
        view("garden", 1000),
        ItemInput::customization("High floor", categories::FLOOR, "high", cents(1500)),
        view("ocean", 3000),
        ItemInput::customization("King bed", categories::BED, "king", cents(0)),
        view("city", 2000),
        ItemInput::customization("Low floor", categories::FLOOR, "low", cents(0)),
    ];
    for pick in picks {
        store.add_item_to_room("r1", pick).unwrap();
    }

    for category in [categories::VIEW, categories::FLOOR, categories::BED] {
        assert_eq!(store.items_by_category("r1", category).len(), 1, "{}", category);
    }
    let view_items = store.items_by_category("r1", categories::VIEW);
    assert_eq!(view_items[0].metadata.option.as_deref(), Some("city"));
}

#[test]
fn test_at_most_one_room_or_bid() {
    let mut store = multi_store();
    store
        .add_item_to_room("r1", ItemInput::new("Deluxe", cents(10000), ItemType::Room))
        .unwrap();
    store
        .handle_room_upgrade("r1", RoomOption::new("STE", "Suite", cents(18000)), None)
        .unwrap();
    store.handle_room_bid("r1", cents(15000), "Suite").unwrap();
    store
        .handle_room_upgrade("r1", RoomOption::new("PH", "Penthouse", cents(40000)), Some(cents(10000)))
        .unwrap();

    let room = store.room("r1").unwrap();
    let room_state = room
        .items
        .iter()
        .filter(|i| i.item_type.is_room_state())
        .count();
    assert_eq!(room_state, 1);
    assert_eq!(store.room_total("r1").unwrap(), cents(30000));
}

#[test]
fn test_room_total_is_stable_between_mutations() {
    let mut store = multi_store();
    store.add_item_to_room("r1", view("ocean", 3000)).unwrap();
    store.add_item_to_room("r1", ItemInput::offer("Spa", cents(4999))).unwrap();

    let first = store.room_total("r1").unwrap();
    let second = store.room_total("r1").unwrap();

    assert_eq!(first, second);
    assert_eq!(first, cents(7999));
}

// =============================================================================
// No-op Edge Cases
// =============================================================================

#[test]
fn test_removing_unknown_item_changes_nothing() {
    let mut store = multi_store();
    store.add_item_to_room("r1", view("ocean", 3000)).unwrap();
    let before = store.room("r1").unwrap().items.clone();

    let removed = store.remove_item_from_room("r1", "no-such-item").unwrap();

    assert!(removed.is_none());
    assert_eq!(store.room("r1").unwrap().items, before);
}

#[test]
fn test_duplicate_room_keeps_original() {
    let mut store = multi_store();
    store.add_item_to_room("r1", view("ocean", 3000)).unwrap();

    let added = store.add_room(NewRoom::new("r1", "Replacement", 4)).unwrap();

    assert!(!added);
    assert_eq!(store.rooms().len(), 2);
    let room = store.room("r1").unwrap();
    assert_eq!(room.room_name, "Deluxe King");
    assert_eq!(room.item_count(), 1);
}

#[test]
fn test_exactly_one_active_room() {
    let mut store = multi_store();
    store.add_room(NewRoom::new("r3", "Family", 4)).unwrap();

    for target in ["r2", "r3", "r1"] {
        store.set_active_room(target).unwrap();
        for room in store.rooms() {
            assert_eq!(room.is_active, room.id == target);
        }
        assert_eq!(store.active_room_id(), Some(target));
    }
}

// =============================================================================
// Worked Scenarios
// =============================================================================

#[test]
fn test_view_replaced_by_pricier_view() {
    let mut store = multi_store();
    store.add_item_to_room("r1", view("garden", 3000)).unwrap();

    store.add_item_to_room("r1", view("ocean", 4500)).unwrap();

    let views = store.items_by_category("r1", categories::VIEW);
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].price, cents(4500));
    assert_eq!(store.room_total("r1").unwrap(), cents(4500));
}

#[test]
fn test_category_lookup_accepts_temporary_name() {
    let mut store = multi_store();
    store.add_item_to_room("r1", view("ocean", 3000)).unwrap();

    let names: Vec<String> = store
        .items_by_category("r1", &String::from("view"))
        .into_iter()
        .map(|i| i.name.clone())
        .collect();

    assert_eq!(names, vec!["ocean view".to_string()]);
}

#[test]
fn test_patching_category_leaves_one_view() {
    let mut store = multi_store();
    store.add_item_to_room("r1", view("garden", 3000)).unwrap();
    let floor = store
        .add_item_to_room(
            "r1",
            ItemInput::customization("High floor", categories::FLOOR, "high", cents(1500)),
        )
        .unwrap();

    let patch = ItemPatch {
        category: Some(categories::VIEW.to_string()),
        ..ItemPatch::default()
    };
    assert!(store.update_item_in_room("r1", &floor.id, patch).unwrap());

    let views = store.items_by_category("r1", categories::VIEW);
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].id, floor.id);
    assert!(store.items_by_category("r1", categories::FLOOR).is_empty());
}

#[test]
fn test_full_room_still_replaces_view() {
    let mut store = multi_store();
    store.add_item_to_room("r1", view("garden", 3000)).unwrap();
    for i in 0..MAX_ITEMS_PER_ROOM - 1 {
        store
            .add_item_to_room("r1", ItemInput::offer(format!("Extra {}", i), cents(0)))
            .unwrap();
    }

    store.add_item_to_room("r1", view("ocean", 4500)).unwrap();

    assert_eq!(store.room("r1").unwrap().item_count(), MAX_ITEMS_PER_ROOM);
    let views = store.items_by_category("r1", categories::VIEW);
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].price, cents(4500));

    let err = store
        .add_item_to_room("r1", ItemInput::offer("One too many", cents(100)))
        .unwrap_err();
    assert!(matches!(err, CoreError::RoomLimitReached { .. }));
}

#[test]
fn test_bid_replaces_room_selection() {
    let mut store = multi_store();
    store
        .add_item_to_room("r1", ItemInput::new("Deluxe", cents(10000), ItemType::Room))
        .unwrap();

    store.handle_room_bid("r1", cents(15000), "Suite").unwrap();

    assert!(store.items_by_type("r1", ItemType::Room).is_empty());
    let bids = store.items_by_type("r1", ItemType::Bid);
    assert_eq!(bids.len(), 1);
    assert_eq!(bids[0].price, cents(15000));
    assert_eq!(store.room_total("r1").unwrap(), cents(15000));
}

#[test]
fn test_conflicting_view_is_reported_by_id() {
    let mut store = multi_store();
    let existing = store.add_item_to_room("r1", view("garden", 3000)).unwrap();

    let result = store.check_item("r1", &view("ocean", 4500)).unwrap();

    assert!(!result.is_valid);
    assert_eq!(result.conflicts[0].conflicting_items, vec![existing.id]);
}

#[test]
fn test_multi_total_sums_rooms() {
    let mut store = multi_store();
    store.add_item_to_room("r1", ItemInput::offer("Late checkout", cents(5000))).unwrap();
    store.add_item_to_room("r2", ItemInput::offer("Spa", cents(10000))).unwrap();

    assert_eq!(store.total_price(), cents(15000));
}

// =============================================================================
// Intents
// =============================================================================

#[test]
fn test_intent_blocks_then_resolves() {
    let mut store = multi_store();
    let garden = store.add_item_to_room("r1", view("garden", 3000)).unwrap();

    let blocked = store.add_item("r1", view("ocean", 4500)).unwrap();
    assert!(!blocked.is_committed());
    assert_eq!(store.room_total("r1").unwrap(), cents(3000));

    match store.add_item_resolving("r1", view("ocean", 4500)).unwrap() {
        IntentOutcome::Committed { evicted, .. } => {
            assert_eq!(evicted.len(), 1);
            assert_eq!(evicted[0].id, garden.id);
        }
        IntentOutcome::Blocked(v) => panic!("unexpected block: {:?}", v.errors),
    }
    assert_eq!(store.room_total("r1").unwrap(), cents(4500));
}

// =============================================================================
// Optimistic Updates
// =============================================================================

#[derive(Debug)]
enum ConfirmError {
    Core(CoreError),
    Offline,
}

impl From<CoreError> for ConfirmError {
    fn from(e: CoreError) -> Self {
        ConfirmError::Core(e)
    }
}

#[tokio::test]
async fn test_failed_confirmation_restores_items() {
    let handle = StoreHandle::new(multi_store());
    handle
        .write(|s| s.add_item_to_room("r1", view("garden", 3000)))
        .unwrap();

    let result = handle
        .add_item("r1", view("ocean", 4500), || async { Err(ConfirmError::Offline) })
        .await;

    assert!(matches!(result, Err(ConfirmError::Offline)));
    let views = handle.read(|s| {
        s.items_by_category("r1", categories::VIEW)
            .into_iter()
            .map(|i| i.price)
            .collect::<Vec<_>>()
    });
    assert_eq!(views, vec![cents(3000)]);
    assert!(handle.read(|s| s.pending_operations().is_empty()));
}

#[tokio::test]
async fn test_add_to_unknown_room_fails_before_confirming() {
    let handle = StoreHandle::new(multi_store());
    let mut confirmed = false;

    let result = handle
        .add_item("r9", view("ocean", 4500), || {
            confirmed = true;
            async { Ok::<(), ConfirmError>(()) }
        })
        .await;

    assert!(matches!(
        result,
        Err(ConfirmError::Core(CoreError::RoomNotFound(id))) if id == "r9"
    ));
    assert!(!confirmed);
    assert!(handle.read(|s| s.pending_operations().is_empty()));
}

#[test]
fn test_rolling_back_first_operation_keeps_second() {
    let mut store = multi_store();

    store.start_optimistic_update("op-a").unwrap();
    store.add_item_to_room("r1", ItemInput::offer("Spa", cents(100))).unwrap();
    store.end_optimistic_recording();
    store.start_optimistic_update("op-b").unwrap();
    store.add_item_to_room("r2", ItemInput::offer("Wine", cents(200))).unwrap();
    store.end_optimistic_recording();

    assert!(store.rollback_optimistic_update("op-a"));
    assert_eq!(store.room_total("r1").unwrap(), cents(0));
    assert_eq!(store.room_total("r2").unwrap(), cents(200));

    assert!(store.complete_optimistic_update("op-b"));
    assert_eq!(store.total_price(), cents(200));
    assert!(store.pending_operations().is_empty());
}

#[test]
fn test_rolling_back_switch_keeps_confirmed_add() {
    let mut store = multi_store();

    store.start_optimistic_update("switch").unwrap();
    store.set_active_room("r2").unwrap();
    store.end_optimistic_recording();
    store.start_optimistic_update("add").unwrap();
    store.add_item_to_room("r1", ItemInput::offer("Spa", cents(100))).unwrap();
    store.end_optimistic_recording();
    assert!(store.complete_optimistic_update("add"));

    assert!(store.rollback_optimistic_update("switch"));

    assert_eq!(store.active_room_id(), Some("r1"));
    assert_eq!(store.room_total("r1").unwrap(), cents(100));
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());

    let mut store = multi_store();
    store.add_item_to_room("r2", ItemInput::offer("Spa", cents(10000))).unwrap();
    store.set_active_room("r2").unwrap();
    store.save_to(&storage).unwrap();

    let mut restored = BookingStore::new(BookingMode::Single);
    assert!(restored.restore_from(&storage).unwrap());

    assert_eq!(restored.mode(), BookingMode::Multi);
    assert_eq!(restored.rooms().len(), 2);
    assert_eq!(restored.active_room_id(), Some("r2"));
    assert_eq!(restored.total_price(), cents(10000));
}

#[test]
fn test_open_discards_unreadable_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = EngineConfig::default();
    config.persistence.data_dir = Some(dir.path().to_path_buf());

    let storage = FileStorage::new(dir.path());
    storage
        .save(&config.persistence.storage_key, "{ definitely not json")
        .unwrap();

    let store = BookingStore::open(&config).unwrap();

    assert!(store.rooms().is_empty());
}

#[test]
fn test_legacy_room_and_bid_keep_their_total() {
    let legacy = LegacyBooking {
        selected_room: Some(SelectedRoom {
            code: "DLX".to_string(),
            name: "Deluxe".to_string(),
            price: cents(12000),
            full_price: None,
        }),
        active_bid: Some(ActiveBid {
            room_type: "STE".to_string(),
            amount: cents(5000),
            status: BidStatus::Pending,
        }),
        ..LegacyBooking::default()
    };
    let expected = legacy_total(&legacy);
    let document = serde_json::json!({ "mode": "single", "legacy": legacy }).to_string();
    let storage = MemoryStorage::new();
    storage.save(STORAGE_KEY, &document).unwrap();

    let mut store = BookingStore::new(BookingMode::Single);
    assert!(store.restore_from(&storage).unwrap());

    assert_eq!(expected, cents(17000));
    assert_eq!(store.total_price(), expected);
    assert_eq!(store.items_by_type("single", ItemType::Bid).len(), 1);
    let room = store.room("single").unwrap();
    assert_eq!(room.base_room.as_ref().map(|b| b.price), Some(cents(12000)));
}

#[test]
fn test_huge_restored_prices_saturate_total() {
    let storage = MemoryStorage::new();
    let mut store = multi_store();
    store
        .add_item_to_room("r1", ItemInput::offer("Everything", Money::from_cents(i64::MAX)))
        .unwrap();
    store.add_item_to_room("r2", ItemInput::offer("Mint", cents(1))).unwrap();
    store.save_to(&storage).unwrap();

    let mut restored = BookingStore::new(BookingMode::Multi);
    assert!(restored.restore_from(&storage).unwrap());

    assert_eq!(restored.total_price(), Money::from_cents(i64::MAX));
}
