mod common;

use std::{collections::HashSet, sync::Arc};

use chrono::{Duration, TimeZone, Utc};
use common::{lunch, memory_manager, reference_now, sample, temp_dir, FlakyStore};
use expense_core::{
    core::{Clock, ExpenseManager, ManualClock, SystemClock},
    domain::{Expense, ExpenseDraft, NewExpense},
    domain::expense::INVALID_AMOUNT_MESSAGE,
    errors::{ExpenseError, ADD_FAILURE_MESSAGE, DELETE_FAILURE_MESSAGE, LOAD_FAILURE_MESSAGE},
    storage::{decode_expenses, encode_expenses, JsonFileStore, KeyValueStore, EXPENSES_KEY},
};

fn stored(store: &FlakyStore) -> Vec<Expense> {
    store
        .peek(EXPENSES_KEY)
        .map(|raw| decode_expenses(&raw).unwrap())
        .unwrap_or_default()
}

#[tokio::test]
async fn loading_without_stored_value_yields_empty_list() {
    let (manager, _, _) = memory_manager();
    assert_eq!(manager.load().await.unwrap(), 0);

    let state = manager.snapshot();
    assert!(state.expenses.is_empty());
    assert!(state.error.is_none());
    assert!(!state.loading);
}

#[tokio::test]
async fn loading_preserves_stored_order() {
    let (seed, _, clock) = memory_manager();
    for description in ["first", "second", "third"] {
        seed.add(sample(1.0, description, "Other")).await.unwrap();
        clock.advance(Duration::seconds(1));
    }
    let payload = encode_expenses(&seed.expenses()).unwrap();

    let (manager, store, _) = memory_manager();
    store.set(EXPENSES_KEY, payload).await.unwrap();
    assert_eq!(manager.load().await.unwrap(), 3);

    let descriptions: Vec<_> = manager
        .expenses()
        .into_iter()
        .map(|expense| expense.description)
        .collect();
    assert_eq!(descriptions, ["first", "second", "third"]);
}

#[tokio::test]
async fn add_assigns_id_and_persists_list() {
    let (manager, store, _) = memory_manager();
    manager.load().await.unwrap();

    let added = manager.add(lunch()).await.unwrap();
    assert!(!added.id.is_empty());

    let state = manager.snapshot();
    assert_eq!(state.expenses, vec![added.clone()]);

    let persisted = decode_expenses(&store.peek(EXPENSES_KEY).unwrap()).unwrap();
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].amount, 12.5);
    assert_eq!(persisted[0].description, "Lunch");
    assert_eq!(persisted[0].category, "Food");
    assert_eq!(persisted[0].date, reference_now());
    assert_eq!(persisted[0].id, added.id);
}

#[tokio::test]
async fn delete_removes_present_id_from_memory_and_store() {
    let (manager, store, clock) = memory_manager();
    let first = manager.add(sample(5.0, "Bus", "Transport")).await.unwrap();
    clock.advance(Duration::milliseconds(5));
    let second = manager.add(lunch()).await.unwrap();

    let removed = manager.delete(&first.id).await.unwrap();
    assert_eq!(removed.map(|expense| expense.id), Some(first.id.clone()));

    let state = manager.snapshot();
    assert_eq!(state.expenses, vec![second.clone()]);
    let persisted = decode_expenses(&store.peek(EXPENSES_KEY).unwrap()).unwrap();
    assert_eq!(persisted, vec![second]);
}

#[tokio::test]
async fn delete_of_absent_id_changes_nothing() {
    let store = Arc::new(FlakyStore::new());
    let manager = ExpenseManager::new(store.clone(), Arc::new(ManualClock::new(reference_now())));
    manager.add(lunch()).await.unwrap();
    let before = store.peek(EXPENSES_KEY);

    assert!(manager.delete("does-not-exist").await.unwrap().is_none());
    assert_eq!(manager.expenses().len(), 1);
    assert_eq!(store.peek(EXPENSES_KEY), before);
    assert_eq!(store.writes(), 1, "no write for a missing id");
}

#[tokio::test]
async fn repeated_loads_are_idempotent() {
    let (manager, _, _) = memory_manager();
    manager.add(lunch()).await.unwrap();
    manager.add(sample(3.0, "Coffee", "Food")).await.unwrap();

    manager.load().await.unwrap();
    let first = manager.expenses();
    manager.load().await.unwrap();
    assert_eq!(manager.expenses(), first);
}

#[tokio::test]
async fn added_expense_survives_restart_through_file_store() {
    let dir = temp_dir();
    let date = Utc.with_ymd_and_hms(2024, 2, 29, 18, 30, 15).unwrap() + Duration::milliseconds(250);

    let added = {
        let store = JsonFileStore::new(&dir).unwrap();
        let manager = ExpenseManager::new(Arc::new(store), Arc::new(SystemClock));
        manager.activate().await;
        manager
            .add(NewExpense::new(42.75, "Groceries", "Shopping", date))
            .await
            .unwrap()
    };

    let restarted = ExpenseManager::new(
        Arc::new(JsonFileStore::new(&dir).unwrap()),
        Arc::new(SystemClock),
    );
    let state = restarted.activate().await;
    assert!(state.error.is_none());
    assert_eq!(state.expenses, vec![added.clone()]);
    assert_eq!(state.expenses[0].date, date);

    let raw = std::fs::read_to_string(dir.join("expenses.json")).unwrap();
    assert!(raw.contains("\"2024-02-29T18:30:15.250Z\""), "{raw}");
}

#[tokio::test]
async fn failed_add_keeps_list_and_store() {
    let store = Arc::new(FlakyStore::new());
    let manager = ExpenseManager::new(store.clone(), Arc::new(ManualClock::new(reference_now())));
    let kept = manager.add(lunch()).await.unwrap();

    store.fail_writes(true);
    let err = manager.add(sample(9.0, "Taxi", "Transport")).await.unwrap_err();
    assert!(matches!(err, ExpenseError::Add(_)));
    assert_eq!(err.to_string(), ADD_FAILURE_MESSAGE);

    let state = manager.snapshot();
    assert_eq!(state.expenses, vec![kept.clone()]);
    assert_eq!(state.error.as_deref(), Some(ADD_FAILURE_MESSAGE));
    assert_eq!(stored(&store), vec![kept]);

    store.fail_writes(false);
    manager.add(sample(9.0, "Taxi", "Transport")).await.unwrap();
    assert!(manager.snapshot().error.is_none(), "success clears the error");
}

#[tokio::test]
async fn failed_delete_keeps_list_and_store() {
    let store = Arc::new(FlakyStore::new());
    let manager = ExpenseManager::new(store.clone(), Arc::new(ManualClock::new(reference_now())));
    let kept = manager.add(lunch()).await.unwrap();

    store.fail_writes(true);
    let err = manager.delete(&kept.id).await.unwrap_err();
    assert_eq!(err.to_string(), DELETE_FAILURE_MESSAGE);

    let state = manager.snapshot();
    assert_eq!(state.expenses, vec![kept.clone()]);
    assert_eq!(state.error.as_deref(), Some(DELETE_FAILURE_MESSAGE));
    assert_eq!(stored(&store), vec![kept]);
}

#[tokio::test]
async fn failed_load_retains_previous_list() {
    let store = Arc::new(FlakyStore::new());
    let manager = ExpenseManager::new(store.clone(), Arc::new(ManualClock::new(reference_now())));
    let kept = manager.add(lunch()).await.unwrap();

    store.fail_reads(true);
    let err = manager.load().await.unwrap_err();
    assert!(matches!(err, ExpenseError::Load(_)));

    let state = manager.snapshot();
    assert_eq!(state.expenses, vec![kept]);
    assert_eq!(state.error.as_deref(), Some(LOAD_FAILURE_MESSAGE));
    assert!(!state.loading);

    store.fail_reads(false);
    manager.load().await.unwrap();
    assert!(manager.snapshot().error.is_none());
}

#[tokio::test]
async fn malformed_payload_is_a_load_error() {
    let (manager, store, _) = memory_manager();
    let kept = manager.add(lunch()).await.unwrap();
    store.set(EXPENSES_KEY, "{not json".into()).await.unwrap();

    assert!(manager.load().await.is_err());
    let state = manager.snapshot();
    assert_eq!(state.error.as_deref(), Some(LOAD_FAILURE_MESSAGE));
    assert_eq!(state.expenses, vec![kept]);
    assert!(!state.loading);
}

#[tokio::test]
async fn blank_payload_reads_as_empty_list() {
    let (manager, store, _) = memory_manager();
    store.set(EXPENSES_KEY, "   ".into()).await.unwrap();
    assert_eq!(manager.load().await.unwrap(), 0);
    assert!(manager.snapshot().error.is_none());
}

#[tokio::test]
async fn concurrent_adds_are_all_kept() {
    let store = Arc::new(FlakyStore::new());
    store.delay_writes(10);
    let manager = ExpenseManager::new(store.clone(), Arc::new(ManualClock::new(reference_now())));

    let (a, b, c) = tokio::join!(
        manager.add(sample(1.0, "a", "Other")),
        manager.add(sample(2.0, "b", "Other")),
        manager.add(sample(3.0, "c", "Other")),
    );
    let ids: HashSet<_> = [a.unwrap().id, b.unwrap().id, c.unwrap().id].into_iter().collect();
    assert_eq!(ids.len(), 3, "ids are unique within one millisecond");

    assert_eq!(manager.expenses().len(), 3);
    let persisted = stored(&store);
    assert_eq!(persisted.len(), 3);
    assert_eq!(persisted, manager.expenses());
}

#[tokio::test]
async fn concurrent_add_and_delete_do_not_lose_updates() {
    let (manager, store, _) = memory_manager();
    let existing = manager.add(lunch()).await.unwrap();

    let (added, deleted) = tokio::join!(
        manager.add(sample(7.0, "Movie", "Entertainment")),
        manager.delete(&existing.id),
    );
    let added = added.unwrap();
    assert!(deleted.unwrap().is_some());

    assert_eq!(manager.expenses(), vec![added.clone()]);
    let persisted = decode_expenses(&store.peek(EXPENSES_KEY).unwrap()).unwrap();
    assert_eq!(persisted, vec![added]);
}

#[tokio::test]
async fn validated_drafts_accept_date_only_input() {
    let (manager, _, clock) = memory_manager();
    let data = ExpenseDraft::new("8.40", "Sandwich", "Food")
        .with_date("2024-03-01")
        .validate(clock.now())
        .unwrap();
    let added = manager.add(data).await.unwrap();
    assert_eq!(added.date, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
}

#[tokio::test]
async fn load_publishes_loading_state_while_reading() {
    let store = Arc::new(FlakyStore::new());
    let manager = ExpenseManager::new(store.clone(), Arc::new(ManualClock::new(reference_now())));
    store.fail_writes(true);
    assert!(manager.add(lunch()).await.is_err());
    store.fail_writes(false);
    assert_eq!(manager.snapshot().error.as_deref(), Some(ADD_FAILURE_MESSAGE));

    store.delay_reads(20);
    let mut updates = manager.subscribe();
    let observe_first_change = async {
        updates.changed().await.unwrap();
        updates.borrow_and_update().clone()
    };
    let (loaded, during) = tokio::join!(manager.load(), observe_first_change);

    assert!(during.loading, "read in flight");
    assert!(during.error.is_none(), "starting a load clears the error");
    assert_eq!(loaded.unwrap(), 0);
    let after = manager.snapshot();
    assert!(!after.loading);
    assert!(after.error.is_none());
}

#[tokio::test]
async fn non_finite_or_non_positive_amounts_are_never_stored() {
    let store = Arc::new(FlakyStore::new());
    let manager = ExpenseManager::new(store.clone(), Arc::new(ManualClock::new(reference_now())));
    let kept = manager.add(sample(5.0, "Bus", "Transport")).await.unwrap();

    for amount in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY, 0.0, -3.0] {
        let err = manager
            .add(sample(amount, "Broken", "Other"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExpenseError::InvalidInput(_)), "amount {amount}");
        assert_eq!(err.to_string(), INVALID_AMOUNT_MESSAGE);
    }

    assert_eq!(store.writes(), 1, "rejected amounts never reach the store");
    assert_eq!(manager.expenses(), vec![kept.clone()]);
    assert_eq!(manager.load().await.unwrap(), 1);
    assert_eq!(manager.expenses(), vec![kept]);
    assert!(manager.snapshot().error.is_none());
}
