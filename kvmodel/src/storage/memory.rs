//! In-memory store backed by an ordered map.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::RwLock;

use crate::storage::{ReadOptions, Store, StoreError, StoreRecord, scan_prefix};

/// In-memory [`Store`] using a `BTreeMap`.
///
/// Nothing is persisted. Useful for tests and for tables whose data can be
/// rebuilt.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub fn len(&self) -> Result<usize, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.len())
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// All keys in order. Handy when asserting on index layout.
    pub fn keys(&self) -> Result<Vec<Vec<u8>>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.keys().cloned().collect())
    }
}

impl Store for MemoryStore {
    fn write(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn read(&self, key: &[u8], opts: ReadOptions) -> Result<Vec<StoreRecord>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;

        if opts.prefix {
            let range = entries.range::<[u8], _>((Bound::Included(key), Bound::Unbounded));
            return Ok(scan_prefix(range, key));
        }

        entries
            .get(key)
            .map(|value| {
                vec![StoreRecord {
                    key: key.to_vec(),
                    value: value.clone(),
                }]
            })
            .ok_or(StoreError::NotFound)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_read_missing_key() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.read(b"missing", ReadOptions::exact()),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn test_prefix_scan_is_ordered_and_bounded() {
        let store = MemoryStore::new();
        store.write(b"ns:b:2", b"two").expect("write");
        store.write(b"ns:b:1", b"one").expect("write");
        store.write(b"ns:a:1", b"other index").expect("write");
        store.write(b"ns:c:1", b"after").expect("write");

        let records = store.read(b"ns:b:", ReadOptions::prefix()).expect("scan");
        let keys: Vec<&[u8]> = records.iter().map(|r| r.key.as_slice()).collect();
        assert_eq!(keys, vec![b"ns:b:1".as_slice(), b"ns:b:2".as_slice()]);
    }

    #[test]
    fn test_prefix_scan_without_matches_is_empty() {
        let store = MemoryStore::new();
        store.write(b"x", b"1").expect("write");
        let records = store.read(b"y", ReadOptions::prefix()).expect("scan");
        assert!(records.is_empty());
    }

    #[test]
    fn test_write_overwrites_and_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.write(b"k", b"1").expect("write");
        store.write(b"k", b"2").expect("overwrite");
        assert_eq!(store.len().expect("len"), 1);

        let records = store.read(b"k", ReadOptions::exact()).expect("read");
        assert_eq!(records[0].value, b"2");

        store.delete(b"k").expect("delete");
        store.delete(b"k").expect("delete again");
        assert!(store.is_empty().expect("is_empty"));
    }
}
