#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use expense_core::{
    core::{ExpenseManager, ManualClock},
    domain::NewExpense,
    errors::StoreError,
    storage::{self, KeyValueStore, MemoryStore},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique directory that survives until the test binary exits.
pub fn temp_dir() -> std::path::PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// Fixed reference instant used across the suite.
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()
}

pub fn lunch() -> NewExpense {
    NewExpense::new(12.5, "Lunch", "Food", reference_now())
}

pub fn sample(amount: f64, description: &str, category: &str) -> NewExpense {
    NewExpense::new(amount, description, category, reference_now())
}

/// Manager over a fresh memory store with a manual clock at [`reference_now`].
pub fn memory_manager() -> (ExpenseManager, Arc<MemoryStore>, Arc<ManualClock>) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(reference_now()));
    let manager = ExpenseManager::new(store.clone(), clock.clone());
    (manager, store, clock)
}

/// Wraps a [`MemoryStore`] and fails reads or writes on demand.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    delay_ms: AtomicUsize,
    read_delay_ms: AtomicUsize,
    writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    /// Makes every write yield to the runtime for `millis` before completing.
    pub fn delay_writes(&self, millis: usize) {
        self.delay_ms.store(millis, Ordering::SeqCst);
    }

    /// Makes every read yield to the runtime for `millis` before completing.
    pub fn delay_reads(&self, millis: usize) {
        self.read_delay_ms.store(millis, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn peek(&self, key: &str) -> Option<String> {
        self.inner.peek(key)
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> storage::Result<Option<String>> {
        let delay = self.read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(StdDuration::from_millis(delay as u64)).await;
        }
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("read refused".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> storage::Result<()> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(StdDuration::from_millis(delay as u64)).await;
        }
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write refused".into()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value).await
    }
}
