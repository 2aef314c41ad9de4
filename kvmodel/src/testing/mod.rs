use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::storage::{MemoryStore, ReadOptions, Store, StoreError, StoreRecord};

static TEST_NAMESPACE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Create a namespace no other test in this process uses.
pub fn unique_namespace(prefix: &str) -> String {
    let counter = TEST_NAMESPACE_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{prefix}{}x{counter}", std::process::id())
}

/// A memory store whose writes and deletes start failing after a budget.
///
/// Reads always succeed, so tables can still plan saves and tests can
/// inspect what was left behind.
pub struct FailingStore {
    inner: MemoryStore,
    remaining: AtomicUsize,
}

impl FailingStore {
    /// Allow `mutations` writes or deletes, then fail every one after.
    pub fn failing_after(mutations: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            remaining: AtomicUsize::new(mutations),
        }
    }

    pub const fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn take_budget(&self) -> Result<(), StoreError> {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .map(|_| ())
            .map_err(|_| StoreError::Io(std::io::Error::other("injected store failure")))
    }
}

impl Store for FailingStore {
    fn write(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.take_budget()?;
        self.inner.write(key, value)
    }

    fn read(&self, key: &[u8], opts: ReadOptions) -> Result<Vec<StoreRecord>, StoreError> {
        self.inner.read(key, opts)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.take_budget()?;
        self.inner.delete(key)
    }
}
