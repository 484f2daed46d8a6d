use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::{
    core::clock::Clock,
    domain::{expense::INVALID_AMOUNT_MESSAGE, Expense, Identifiable, NewExpense},
    errors::{
        ExpenseError, ADD_FAILURE_MESSAGE, DELETE_FAILURE_MESSAGE, LOAD_FAILURE_MESSAGE,
    },
    storage::{self, decode_expenses, encode_expenses, KeyValueStore, EXPENSES_KEY},
};

/// Shared handle passed to every consumer of the one manager instance.
pub type ExpenseHandle = Arc<ExpenseManager>;

/// Snapshot of the state published by [`ExpenseManager`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseState {
    /// Expenses in insertion order.
    pub expenses: Vec<Expense>,
    /// Set while a load is reading the store.
    pub loading: bool,
    /// Fixed user-facing message of the last failed operation.
    pub error: Option<String>,
}

impl ExpenseState {
    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id() == id)
    }
}

/// Issues timestamp-derived ids that never repeat.
#[derive(Debug, Default)]
struct IdSequence {
    last: Option<i64>,
}

impl IdSequence {
    fn next(&mut self, now: DateTime<Utc>, existing: &[Expense]) -> String {
        let floor = existing
            .iter()
            .filter_map(Expense::numeric_id)
            .chain(self.last)
            .max();
        let candidate = now.timestamp_millis();
        let id = match floor {
            Some(floor) if candidate <= floor => floor.saturating_add(1),
            _ => candidate,
        };
        self.last = Some(id);
        id.to_string()
    }
}

/// Owns the in-memory expense list and mirrors it into a [`KeyValueStore`].
///
/// Every state-changing operation holds the writer lock until its store write
/// resolves, so overlapping calls apply one after another. New state is
/// published only once the store has accepted it; a failed write leaves the
/// list untouched and records the fixed failure message instead.
pub struct ExpenseManager {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
    writer: Mutex<IdSequence>,
    state: watch::Sender<ExpenseState>,
    activated: AtomicBool,
}

impl ExpenseManager {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_key(store, clock, EXPENSES_KEY)
    }

    /// Creates a manager persisting under a custom key.
    pub fn with_key(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        key: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(ExpenseState::default());
        Self {
            store,
            clock,
            key: key.into(),
            writer: Mutex::new(IdSequence::default()),
            state,
            activated: AtomicBool::new(false),
        }
    }

    pub fn into_handle(self) -> ExpenseHandle {
        Arc::new(self)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Returns a clone of the latest published state.
    pub fn snapshot(&self) -> ExpenseState {
        self.state.borrow().clone()
    }

    pub fn expenses(&self) -> Vec<Expense> {
        self.state.borrow().expenses.clone()
    }

    /// Receives every state published from now on.
    pub fn subscribe(&self) -> watch::Receiver<ExpenseState> {
        self.state.subscribe()
    }

    /// Loads persisted expenses the first time it is called; later calls only
    /// return the current snapshot.
    pub async fn activate(&self) -> ExpenseState {
        if !self.activated.swap(true, Ordering::SeqCst) {
            // A failure is already recorded in the published state.
            let _ = self.load().await;
        }
        self.snapshot()
    }

    /// Replaces the in-memory list with the persisted one.
    ///
    /// A missing (or blank) stored value yields an empty list. On failure the
    /// current list is kept and `error` is set.
    pub async fn load(&self) -> Result<usize, ExpenseError> {
        let _writer = self.writer.lock().await;
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        match self.read_persisted().await {
            Ok(expenses) => {
                let count = expenses.len();
                info!(count, key = %self.key, "expenses loaded");
                self.state.send_modify(|state| {
                    state.expenses = expenses;
                    state.loading = false;
                    state.error = None;
                });
                Ok(count)
            }
            Err(err) => {
                warn!(error = %err, key = %self.key, "unable to load expenses");
                self.record_failure(LOAD_FAILURE_MESSAGE);
                Err(ExpenseError::Load(err))
            }
        }
    }

    /// Assigns a fresh id, persists the extended list, then publishes it.
    ///
    /// Amounts must be finite and positive; anything else is rejected before
    /// the store is touched.
    pub async fn add(&self, data: NewExpense) -> Result<Expense, ExpenseError> {
        if !(data.amount.is_finite() && data.amount > 0.0) {
            warn!(amount = data.amount, "rejected expense with invalid amount");
            return Err(ExpenseError::InvalidInput(INVALID_AMOUNT_MESSAGE.into()));
        }

        let mut ids = self.writer.lock().await;
        let mut next = self.expenses();
        let expense = Expense::from_new(ids.next(self.clock.now(), &next), data);
        next.push(expense.clone());

        if let Err(err) = self.persist(&next).await {
            warn!(error = %err, id = %expense.id, "unable to persist new expense");
            self.record_failure(ADD_FAILURE_MESSAGE);
            return Err(ExpenseError::Add(err));
        }

        info!(id = %expense.id, count = next.len(), "expense added");
        self.state.send_modify(|state| {
            state.expenses = next;
            state.error = None;
        });
        Ok(expense)
    }

    /// Removes the expense with `id`. Unknown ids are ignored without
    /// touching the store and yield `Ok(None)`.
    pub async fn delete(&self, id: &str) -> Result<Option<Expense>, ExpenseError> {
        let _writer = self.writer.lock().await;
        let (removed, kept): (Vec<Expense>, Vec<Expense>) = self
            .expenses()
            .into_iter()
            .partition(|expense| expense.id() == id);

        if removed.is_empty() {
            debug!(id, "delete ignored, no matching expense");
            return Ok(None);
        }

        if let Err(err) = self.persist(&kept).await {
            warn!(error = %err, id, "unable to persist deletion");
            self.record_failure(DELETE_FAILURE_MESSAGE);
            return Err(ExpenseError::Delete(err));
        }

        info!(id, count = kept.len(), "expense deleted");
        self.state.send_modify(|state| {
            state.expenses = kept;
            state.error = None;
        });
        Ok(removed.into_iter().next())
    }

    async fn read_persisted(&self) -> storage::Result<Vec<Expense>> {
        match self.store.get(&self.key).await? {
            Some(raw) if !raw.trim().is_empty() => decode_expenses(&raw),
            _ => Ok(Vec::new()),
        }
    }

    async fn persist(&self, expenses: &[Expense]) -> storage::Result<()> {
        let payload = encode_expenses(expenses)?;
        self.store.set(&self.key, payload).await
    }

    fn record_failure(&self, message: &str) {
        self.state.send_modify(|state| {
            state.loading = false;
            state.error = Some(message.to_string());
        });
    }
}
