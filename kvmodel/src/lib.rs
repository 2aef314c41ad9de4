// Life of a save:
// 1. Serialize the record into a JSON document
// 2. Load the previous version through the identity index
// 3. Check unique indexes against other identities
// 4. Plan one put per index, plus a delete for every changed value
// 5. Apply the plan to the store in order
//
// System components:
//  - Key encoder (order-preserving keys per index)
//  - Tables (index maintenance and query resolution)
//  - Stores (in-memory map, append-only log file)
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod model;
pub mod repository;
pub mod storage;
pub mod types;

mod e2e_tests;
#[cfg(test)]
mod testing;

pub use model::{ModelError, Table, TableOptions};
pub use storage::{FileStore, MemoryStore, Store, StoreError};
pub use types::{FieldValue, Index, Order, Query};
