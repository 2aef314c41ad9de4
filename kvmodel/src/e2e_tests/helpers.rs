//! Common helpers for end-to-end tests.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::model::{Table, TableOptions};
use crate::storage::{MemoryStore, Store};
use crate::testing::unique_namespace;
use crate::types::Index;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub age: i64,
    pub has_pet: bool,
    pub created: i64,
    pub tag: String,
    pub updated: i64,
}

impl User {
    pub fn with_id(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub slug: String,
    pub age: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A table over a fresh memory store.
pub fn memory_table(indexes: Vec<Index>) -> Table<MemoryStore> {
    memory_table_with(indexes, TableOptions::default())
}

pub fn memory_table_with(indexes: Vec<Index>, options: TableOptions) -> Table<MemoryStore> {
    table_over(MemoryStore::new(), indexes, options)
}

/// A table with a namespace no other test uses.
pub fn table_over<S: Store>(store: S, indexes: Vec<Index>, options: TableOptions) -> Table<S> {
    Table::new(store, unique_namespace("e2e"), indexes, options)
}

/// `values` in random order, so tests don't depend on insertion order.
pub fn shuffled<T: Clone>(values: &[T]) -> Vec<T> {
    let mut values = values.to_vec();
    values.shuffle(&mut rand::rng());
    values
}

/// Random identity, so saves never collide.
pub fn random_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}
