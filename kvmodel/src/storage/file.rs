//! Append-only log file store.
//!
//! Every write and delete is appended to a single log file. On open the log
//! is replayed into an in-memory ordered map which then serves all reads.
//!
//! # Log Record Format
//!
//! ```text
//! +----------+--------------------------------------------+
//! | 0        | op (1 byte): 0x01 = put, 0x02 = delete     |
//! | 1-4      | key_len (4 bytes)                          |
//! | 5-8      | value_len (4 bytes, 0 for delete)          |
//! | 9-N      | key bytes, then value bytes                |
//! | N-N+3    | CRC32 checksum (4 bytes)                   |
//! +----------+--------------------------------------------+
//! ```
//!
//! All integers are little-endian. The checksum covers everything before it.
//! A torn or corrupt tail (e.g. a crash mid-append) is truncated on open.
//! While open, the store tracks the length of the clean log and cuts any
//! bytes past it before the next append, so a failed append can't hide the
//! records written after it.

// key and value lengths are bounded by u32 when encoded
#![allow(clippy::cast_possible_truncation)]

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::ops::Bound;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::storage::{ReadOptions, Store, StoreError, StoreRecord, scan_prefix};

/// Header size: op (1) + `key_len` (4) + `value_len` (4).
const RECORD_HEADER_SIZE: usize = 9;

/// CRC32 checksum size at end of record.
const CHECKSUM_SIZE: usize = 4;

/// Log record operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum LogOp {
    Put = 0x01,
    Delete = 0x02,
}

impl TryFrom<u8> for LogOp {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::Put),
            0x02 => Ok(Self::Delete),
            _ => Err(value),
        }
    }
}

/// Options for [`FileStore`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStoreOptions {
    /// Call `sync_data` after every append.
    pub sync_writes: bool,
}

struct Inner {
    file: File,
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
    /// Bytes of the log made of whole records.
    log_len: u64,
}

/// A durable [`Store`] backed by an append-only log.
pub struct FileStore {
    path: PathBuf,
    options: FileStoreOptions,
    inner: RwLock<Inner>,
}

impl FileStore {
    /// Open the log at `path`, creating it if missing, and replay it.
    pub fn open(path: &Path, options: FileStoreOptions) -> Result<Self, StoreError> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let replay = replay_log(&bytes);
        if let Some(error) = &replay.error {
            tracing::warn!(
                "Truncating log {} at offset {}: {error}",
                path.display(),
                replay.valid_len
            );
            file.set_len(replay.valid_len as u64)?;
        }

        tracing::info!(
            "Opened store {}: {} records replayed, {} keys live",
            path.display(),
            replay.records,
            replay.entries.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            options,
            inner: RwLock::new(Inner {
                file,
                entries: replay.entries,
                log_len: replay.valid_len as u64,
            }),
        })
    }

    /// Path of the underlying log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, op: LogOp, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let bytes = encode_record(op, key, value);

        let mut guard = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        let inner = &mut *guard;

        let file_len = inner.file.metadata()?.len();
        if file_len > inner.log_len {
            tracing::warn!(
                "Discarding {} bytes of an incomplete append to {}",
                file_len - inner.log_len,
                self.path.display()
            );
            inner.file.set_len(inner.log_len)?;
        }

        if let Err(e) = write_record(&mut inner.file, &bytes, self.options.sync_writes) {
            // Cut the partial record now; if that fails too, the next append retries.
            if let Err(truncate_error) = inner.file.set_len(inner.log_len) {
                tracing::warn!(
                    "Failed to cut incomplete append to {}: {truncate_error}",
                    self.path.display()
                );
            }
            return Err(e.into());
        }
        inner.log_len += bytes.len() as u64;

        match op {
            LogOp::Put => {
                inner.entries.insert(key.to_vec(), value.to_vec());
            }
            LogOp::Delete => {
                inner.entries.remove(key);
            }
        }
        Ok(())
    }
}

impl Store for FileStore {
    fn write(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.append(LogOp::Put, key, value)
    }

    fn read(&self, key: &[u8], opts: ReadOptions) -> Result<Vec<StoreRecord>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;

        if opts.prefix {
            let range = inner
                .entries
                .range::<[u8], _>((Bound::Included(key), Bound::Unbounded));
            return Ok(scan_prefix(range, key));
        }

        inner
            .entries
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
        self.append(LogOp::Delete, key, &[])
    }
}

fn write_record(file: &mut File, bytes: &[u8], sync: bool) -> std::io::Result<()> {
    file.write_all(bytes)?;
    if sync {
        file.sync_data()?;
    }
    Ok(())
}

fn encode_record(op: LogOp, key: &[u8], value: &[u8]) -> Vec<u8> {
    let total_len = RECORD_HEADER_SIZE + key.len() + value.len() + CHECKSUM_SIZE;
    let mut bytes = Vec::with_capacity(total_len);

    bytes.push(op as u8);
    bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
    bytes.extend_from_slice(key);
    bytes.extend_from_slice(value);

    let checksum = crc32fast::hash(&bytes);
    bytes.extend_from_slice(&checksum.to_le_bytes());

    bytes
}

/// One decoded log record and the number of bytes it occupied.
struct DecodedRecord<'a> {
    op: LogOp,
    key: &'a [u8],
    value: &'a [u8],
    len: usize,
}

fn decode_record(bytes: &[u8]) -> Result<DecodedRecord<'_>, String> {
    if bytes.len() < RECORD_HEADER_SIZE + CHECKSUM_SIZE {
        return Err("truncated header".to_string());
    }

    let op = LogOp::try_from(bytes[0]).map_err(|t| format!("invalid op 0x{t:02x}"))?;
    let key_len = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
    let value_len = u32::from_le_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]) as usize;

    let body_end = RECORD_HEADER_SIZE + key_len + value_len;
    let record_len = body_end + CHECKSUM_SIZE;
    if record_len > bytes.len() {
        return Err("truncated record".to_string());
    }

    let stored_checksum = u32::from_le_bytes([
        bytes[body_end],
        bytes[body_end + 1],
        bytes[body_end + 2],
        bytes[body_end + 3],
    ]);
    let computed_checksum = crc32fast::hash(&bytes[..body_end]);
    if stored_checksum != computed_checksum {
        return Err(format!(
            "checksum mismatch: expected 0x{stored_checksum:08x}, got 0x{computed_checksum:08x}"
        ));
    }

    let key_end = RECORD_HEADER_SIZE + key_len;
    Ok(DecodedRecord {
        op,
        key: &bytes[RECORD_HEADER_SIZE..key_end],
        value: &bytes[key_end..body_end],
        len: record_len,
    })
}

struct Replay {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
    records: usize,
    /// Length of the log prefix that decoded cleanly.
    valid_len: usize,
    error: Option<StoreError>,
}

fn replay_log(bytes: &[u8]) -> Replay {
    let mut replay = Replay {
        entries: BTreeMap::new(),
        records: 0,
        valid_len: 0,
        error: None,
    };

    while replay.valid_len < bytes.len() {
        match decode_record(&bytes[replay.valid_len..]) {
            Ok(record) => {
                match record.op {
                    LogOp::Put => {
                        replay
                            .entries
                            .insert(record.key.to_vec(), record.value.to_vec());
                    }
                    LogOp::Delete => {
                        replay.entries.remove(record.key);
                    }
                }
                replay.records += 1;
                replay.valid_len += record.len;
            }
            Err(reason) => {
                replay.error = Some(StoreError::Corrupt {
                    offset: replay.valid_len as u64,
                    reason,
                });
                break;
            }
        }
    }

    replay
}
