//! Key-value stores the model layer runs on.
//!
//! The model only needs four things from a store: write a key, read a key,
//! read every key under a prefix, and delete a key. Keys and values are
//! opaque bytes; the model owns all structure inside them.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: an ordered map behind a lock. Used by tests and by
//!   callers that don't need durability.
//! - [`FileStore`]: an append-only log replayed into memory on open.
//!
//! # Usage
//!
//! ```ignore
//! use kvmodel::storage::{MemoryStore, ReadOptions, Store};
//!
//! let store = MemoryStore::new();
//! store.write(b"users:byId:1", b"{}")?;
//!
//! let records = store.read(b"users:byId:", ReadOptions::prefix())?;
//! assert_eq!(records.len(), 1);
//! ```

mod file;
mod memory;

use std::sync::Arc;

pub use file::{FileStore, FileStoreOptions};
pub use memory::MemoryStore;

/// A single key/value pair returned by a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRecord {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

/// Options for [`Store::read`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Treat the key as a prefix and return every record under it.
    pub prefix: bool,
}

impl ReadOptions {
    /// Exact-key read.
    #[must_use]
    pub const fn exact() -> Self {
        Self { prefix: false }
    }

    /// Prefix scan.
    #[must_use]
    pub const fn prefix() -> Self {
        Self { prefix: true }
    }
}

/// The contract the model layer needs from a key-value store.
///
/// # Invariants
///
/// - Reads return records in ascending key byte order.
/// - An exact read of a missing key fails with [`StoreError::NotFound`].
/// - A prefix read with no matches returns an empty vector.
/// - Deleting a missing key succeeds.
pub trait Store: Send + Sync {
    /// Write `value` under `key`, replacing any previous value.
    fn write(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Read one key, or every key starting with `key` when `opts.prefix` is set.
    fn read(&self, key: &[u8], opts: ReadOptions) -> Result<Vec<StoreRecord>, StoreError>;

    /// Remove `key` from the store.
    fn delete(&self, key: &[u8]) -> Result<(), StoreError>;
}

impl<S: Store + ?Sized> Store for Arc<S> {
    fn write(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn read(&self, key: &[u8], opts: ReadOptions) -> Result<Vec<StoreRecord>, StoreError> {
        (**self).read(key, opts)
    }

    fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

/// Errors raised by store implementations.
#[derive(Debug)]
pub enum StoreError {
    /// Exact read of a key that doesn't exist.
    NotFound,
    /// Underlying I/O failed.
    Io(std::io::Error),
    /// A persisted log record could not be decoded.
    Corrupt { offset: u64, reason: String },
    /// A lock guarding store state was poisoned by a panicking thread.
    LockPoisoned,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Io(e) => write!(f, "store I/O error: {e}"),
            Self::Corrupt { offset, reason } => {
                write!(f, "corrupt store record at offset {offset}: {reason}")
            }
            Self::LockPoisoned => write!(f, "store lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::NotFound | Self::Corrupt { .. } | Self::LockPoisoned => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Collect every entry of an ordered map whose key starts with `prefix`.
fn scan_prefix<'a>(
    entries: impl Iterator<Item = (&'a Vec<u8>, &'a Vec<u8>)>,
    prefix: &[u8],
) -> Vec<StoreRecord> {
    entries
        .take_while(|(key, _)| key.starts_with(prefix))
        .map(|(key, value)| StoreRecord {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}
