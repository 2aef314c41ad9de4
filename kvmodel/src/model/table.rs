//! Tables: indexed records over a flat key-value store.
//!
//! A table owns a namespace in the store and a fixed list of indexes. Every
//! saved record is written once per index, each copy under a key built by
//! [`crate::model::encoding`]. The identity index always comes last and is
//! the canonical place a record lives; the other indexes exist so records
//! can be found and listed by other fields.
//!
//! # Consistency
//!
//! A save is a read of the previous version, a unique check, then a sequence
//! of independent store writes. Nothing is locked or rolled back: concurrent
//! saves of the same identity can race, and a store failure partway through
//! leaves the earlier writes in place. Callers that need more must serialize
//! access themselves.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::encoding::{encode_identity, index_key, index_range_prefix, value_prefix};
use crate::model::{Document, ModelError};
use crate::storage::{ReadOptions, Store, StoreError, StoreRecord};
use crate::types::{FieldValue, Index, Query};

/// Per-table settings.
#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    /// Log every key read or written at debug level instead of trace.
    pub debug: bool,
    /// Replaces the default identity index (unordered equality on `id`).
    pub id_index: Option<Index>,
}

/// One step of a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Remove an index entry left behind by a changed field.
    Delete { key: Vec<u8> },
    /// Write the record under one index key.
    Put { key: Vec<u8>, value: Vec<u8> },
}

impl WriteOp {
    #[must_use]
    pub fn key(&self) -> &[u8] {
        match self {
            Self::Delete { key } | Self::Put { key, .. } => key,
        }
    }
}

/// A namespace of records with a fixed set of indexes.
pub struct Table<S: Store> {
    store: S,
    namespace: String,
    /// User indexes in declaration order, then the identity index.
    indexes: Vec<Index>,
    identity: usize,
    options: TableOptions,
}

impl<S: Store> Table<S> {
    /// Create a table over `store`.
    ///
    /// The identity index from `options` (or [`Index::identity`]) is added
    /// after `indexes`. Queries resolve against the first index of matching
    /// shape, so a later declaration with the same field and order as an
    /// earlier one is written but never read.
    pub fn new(
        store: S,
        namespace: impl Into<String>,
        indexes: Vec<Index>,
        options: TableOptions,
    ) -> Self {
        let namespace = namespace.into();
        let mut indexes = indexes;

        for (position, index) in indexes.iter().enumerate() {
            if indexes[..position].iter().any(|earlier| earlier.same_shape(index)) {
                tracing::warn!(
                    "Table '{namespace}': index on '{}' ({}) is shadowed by an earlier declaration",
                    index.field_name,
                    index.order
                );
            }
        }

        indexes.push(options.id_index.clone().unwrap_or_else(Index::identity));
        let identity = indexes.len() - 1;

        Self {
            store,
            namespace,
            indexes,
            identity,
            options,
        }
    }

    /// Key namespace of every entry the table writes.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Every index the table maintains, identity last.
    #[must_use]
    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    #[must_use]
    pub fn identity_index(&self) -> &Index {
        &self.indexes[self.identity]
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Create or update `record`.
    ///
    /// Equivalent to [`Self::prepare_save`] followed by
    /// [`Self::apply_writes`]. If a store write fails, the writes before it
    /// stay applied and the error is returned as is.
    pub fn save<R: Serialize + ?Sized>(&self, record: &R) -> Result<(), ModelError> {
        let plan = self.prepare_save(record)?;
        self.apply_writes(&plan)
    }

    /// Work out the writes that saving `record` takes, without writing.
    ///
    /// Reads the previous version through the identity index and checks
    /// unique indexes. For each index, in order, the plan deletes the entry
    /// for the previous value when that value was set and has changed, then
    /// puts the entry for the new value.
    pub fn prepare_save<R: Serialize + ?Sized>(
        &self,
        record: &R,
    ) -> Result<Vec<WriteOp>, ModelError> {
        let document = Document::from_record(record)?;
        let identity_field = &self.identity_index().field_name;
        let id = document.field(identity_field);
        if id.is_null() {
            return Err(ModelError::MissingField {
                field: identity_field.clone(),
            });
        }

        let suffix = encode_identity(identity_field, &id)?;
        let previous = self.load(&id)?;
        self.check_unique(&document, &id)?;

        let mut plan = Vec::with_capacity(self.indexes.len() * 2);
        for (position, index) in self.indexes.iter().enumerate() {
            let suffix = (position != self.identity).then_some(suffix.as_slice());
            let value = document.field(&index.field_name);

            if let Some(previous) = &previous {
                let old = previous.field(&index.field_name);
                if !old.is_null() && old != value {
                    plan.push(WriteOp::Delete {
                        key: index_key(&self.namespace, index, &old, suffix)?,
                    });
                }
            }

            plan.push(WriteOp::Put {
                key: index_key(&self.namespace, index, &value, suffix)?,
                value: document.as_bytes().to_vec(),
            });
        }

        Ok(plan)
    }

    /// Apply a plan from [`Self::prepare_save`] in order, stopping at the first error.
    pub fn apply_writes(&self, plan: &[WriteOp]) -> Result<(), ModelError> {
        for op in plan {
            match op {
                WriteOp::Delete { key } => {
                    self.log_key("delete", key);
                    self.store.delete(key)?;
                }
                WriteOp::Put { key, value } => {
                    self.log_key("put", key);
                    self.store.write(key, value)?;
                }
            }
        }
        Ok(())
    }

    /// Read the single record matching `query`.
    pub fn read<R: DeserializeOwned>(&self, query: &Query) -> Result<R, ModelError> {
        let record = single(self.scan(query)?)?;
        Document::from_bytes(record.value)?.decode()
    }

    /// List the records matching `query` in key order.
    ///
    /// `query.offset` and `query.limit` are applied to the matches.
    pub fn list<R: DeserializeOwned>(&self, query: &Query) -> Result<Vec<R>, ModelError> {
        let records = self.scan(query)?;
        let limit = query.limit.unwrap_or(usize::MAX);

        let size: usize = records.iter().map(|r| r.value.len() + 1).sum();
        let mut array = Vec::with_capacity(size + 2);
        array.push(b'[');
        for (n, record) in records.iter().skip(query.offset).take(limit).enumerate() {
            if n > 0 {
                array.push(b',');
            }
            array.extend_from_slice(&record.value);
        }
        array.push(b']');

        Ok(serde_json::from_slice(&array)?)
    }

    /// Delete the record identified by `query`.
    ///
    /// Only the identity index's query with a value is accepted. Only the
    /// identity entry is removed; entries in other indexes stay in the store
    /// and still answer queries on those indexes.
    pub fn delete(&self, query: &Query) -> Result<(), ModelError> {
        let Some(value) = &query.value else {
            return Err(ModelError::DeleteRequiresIdentityQuery);
        };
        if !self.identity_index().matches(query) {
            return Err(ModelError::DeleteRequiresIdentityQuery);
        }

        let record = single(self.scan_at(self.identity, Some(value))?)?;
        self.log_key("delete", &record.key);
        self.store.delete(&record.key)?;
        Ok(())
    }

    fn resolve(&self, query: &Query) -> Result<usize, ModelError> {
        self.indexes
            .iter()
            .position(|index| index.matches(query))
            .ok_or_else(|| ModelError::NoMatchingIndex {
                field: query.field_name.clone(),
                kind: query.kind,
                order: query.order,
            })
    }

    fn scan(&self, query: &Query) -> Result<Vec<StoreRecord>, ModelError> {
        let position = self.resolve(query)?;
        self.scan_at(position, query.value.as_ref())
    }

    /// Entries of the index at `position`, all of them or those holding `value`.
    ///
    /// A value prefix can also cover entries of longer values, such as
    /// ordered strings past their pad length, so secondary matches are
    /// checked against the stored field.
    fn scan_at(
        &self,
        position: usize,
        value: Option<&FieldValue>,
    ) -> Result<Vec<StoreRecord>, ModelError> {
        let index = &self.indexes[position];
        let (key, opts) = match value {
            None => (index_range_prefix(&self.namespace, index), ReadOptions::prefix()),
            Some(value) if position == self.identity => (
                index_key(&self.namespace, index, value, None)?,
                ReadOptions::exact(),
            ),
            Some(value) => (
                value_prefix(&self.namespace, index, value)?,
                ReadOptions::prefix(),
            ),
        };

        self.log_key("read", &key);
        let records = match self.store.read(&key, opts) {
            Ok(records) => records,
            Err(StoreError::NotFound) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let Some(value) = value.filter(|_| position != self.identity) else {
            return Ok(records);
        };
        let mut matching = Vec::with_capacity(records.len());
        for record in records {
            let document = Document::from_bytes(record.value)?;
            if document.field(&index.field_name) == *value {
                matching.push(StoreRecord {
                    key: record.key,
                    value: document.into_bytes(),
                });
            }
        }
        Ok(matching)
    }

    fn load(&self, id: &FieldValue) -> Result<Option<Document>, ModelError> {
        self.scan_at(self.identity, Some(id))?
            .into_iter()
            .next()
            .map(|record| Document::from_bytes(record.value))
            .transpose()
    }

    fn check_unique(&self, document: &Document, id: &FieldValue) -> Result<(), ModelError> {
        let identity_field = &self.identity_index().field_name;
        for (position, index) in self.indexes.iter().enumerate() {
            if !index.unique {
                continue;
            }
            let value = document.field(&index.field_name);
            if value.is_null() {
                continue;
            }

            let records = self.scan_at(position, Some(&value))?;
            if records.len() > 1 {
                return Err(ModelError::AmbiguousResult {
                    count: records.len(),
                });
            }
            for record in records {
                let existing = Document::from_bytes(record.value)?;
                if existing.field(identity_field) != *id {
                    tracing::warn!(
                        "Table '{}': unique index on '{}' already holds '{value}'",
                        self.namespace,
                        index.field_name
                    );
                    return Err(ModelError::UniqueConstraintViolated {
                        field: index.field_name.clone(),
                        value: value.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn log_key(&self, action: &str, key: &[u8]) {
        let key = String::from_utf8_lossy(key);
        if self.options.debug {
            tracing::debug!("{} {action} {key}", self.namespace);
        } else {
            tracing::trace!("{} {action} {key}", self.namespace);
        }
    }
}

fn single(records: Vec<StoreRecord>) -> Result<StoreRecord, ModelError> {
    let count = records.len();
    let mut records = records.into_iter();
    match (records.next(), count) {
        (Some(record), 1) => Ok(record),
        (None, _) => Err(ModelError::NotFound),
        _ => Err(ModelError::AmbiguousResult { count }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::Order;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Item {
        id: String,
        tag: String,
        rank: i64,
    }

    fn item(id: &str, tag: &str, rank: i64) -> Item {
        Item {
            id: id.to_string(),
            tag: tag.to_string(),
            rank,
        }
    }

    fn table() -> Table<MemoryStore> {
        Table::new(
            MemoryStore::new(),
            "items",
            vec![Index::by_equality("tag").unordered(), Index::by_equality("rank")],
            TableOptions::default(),
        )
    }

    fn keys(plan: &[WriteOp]) -> Vec<String> {
        plan.iter()
            .map(|op| String::from_utf8_lossy(op.key()).into_owned())
            .collect()
    }

    #[test]
    fn test_identity_index_is_last() {
        let table = table();
        assert_eq!(table.indexes().len(), 3);
        assert_eq!(table.identity_index(), &Index::identity());
        assert_eq!(table.indexes().last(), Some(&Index::identity()));
    }

    #[test]
    fn test_custom_identity_index() {
        let options = TableOptions {
            id_index: Some(Index::by_equality("slug").unordered()),
            ..TableOptions::default()
        };
        let table: Table<MemoryStore> = Table::new(MemoryStore::new(), "t", Vec::new(), options);
        assert_eq!(table.identity_index().field_name, "slug");
    }

    #[test]
    fn test_first_save_plan_puts_every_index() {
        let table = table();
        let plan = table.prepare_save(&item("1", "a", 5)).expect("plan");
        assert_eq!(
            keys(&plan),
            vec![
                "items:byTag:a:1",
                "items:byOrderedRank:0000000000000000005:1",
                "items:byId:1",
            ]
        );
        assert!(plan.iter().all(|op| matches!(op, WriteOp::Put { .. })));
    }

    #[test]
    fn test_update_plan_deletes_changed_values_only() {
        let table = table();
        table.save(&item("1", "a", 5)).expect("save");

        let plan = table.prepare_save(&item("1", "b", 5)).expect("plan");
        assert_eq!(
            plan[0],
            WriteOp::Delete {
                key: b"items:byTag:a:1".to_vec()
            }
        );
        assert_eq!(
            keys(&plan[1..]),
            vec![
                "items:byTag:b:1",
                "items:byOrderedRank:0000000000000000005:1",
                "items:byId:1",
            ]
        );
    }

    #[test]
    fn test_prepare_save_does_not_write() {
        let table = table();
        table.prepare_save(&item("1", "a", 5)).expect("plan");
        assert!(table.store().is_empty().expect("store"));
    }

    #[test]
    fn test_missing_identity_fails() {
        #[derive(Serialize)]
        struct NoId {
            tag: String,
        }
        let result = table().save(&NoId {
            tag: "a".to_string(),
        });
        assert!(matches!(result, Err(ModelError::MissingField { ref field }) if field == "id"));
    }

    #[test]
    fn test_non_object_record_fails() {
        assert!(matches!(table().save(&42), Err(ModelError::NotADocument)));
    }

    #[test]
    fn test_unsupported_index_value_writes_nothing() {
        #[derive(Serialize)]
        struct Tagged {
            id: String,
            tag: Vec<String>,
            rank: i64,
        }
        let table = table();
        let result = table.save(&Tagged {
            id: "1".to_string(),
            tag: vec!["a".to_string()],
            rank: 1,
        });
        assert!(matches!(
            result,
            Err(ModelError::UnsupportedValueType { ref field, .. }) if field == "tag"
        ));
        assert!(table.store().is_empty().expect("store"));
    }

    #[test]
    fn test_value_query_does_not_match_longer_values() {
        let table = table();
        table.save(&item("1", "hi", 1)).expect("save");
        table.save(&item("2", "hi-there", 1)).expect("save");

        let query = Query::equals("tag", "hi").with_order(Order::Unordered);
        let found: Item = table.read(&query).expect("read");
        assert_eq!(found.id, "1");
    }

    #[test]
    fn test_long_ordered_string_query_is_exact() {
        let table: Table<MemoryStore> = Table::new(
            MemoryStore::new(),
            "items",
            vec![Index::by_equality("tag").with_pad_length(2)],
            TableOptions::default(),
        );
        table.save(&item("1", "abc", 1)).expect("save");
        table.save(&item("2", "abc:x", 1)).expect("save");

        let found: Vec<Item> = table.list(&Query::equals("tag", "abc")).expect("list");
        assert_eq!(found, vec![item("1", "abc", 1)]);
    }

    #[test]
    fn test_identity_query_is_exact() {
        let table = table();
        table.save(&item("1", "a", 1)).expect("save");
        table.save(&item("10", "a", 1)).expect("save");

        let query = Index::identity().to_query("1");
        let found: Item = table.read(&query).expect("read");
        assert_eq!(found, item("1", "a", 1));
    }

    #[test]
    fn test_single() {
        let record = |k: &str| StoreRecord {
            key: k.as_bytes().to_vec(),
            value: Vec::new(),
        };
        assert!(matches!(single(Vec::new()), Err(ModelError::NotFound)));
        assert!(single(vec![record("a")]).is_ok());
        assert!(matches!(
            single(vec![record("a"), record("b")]),
            Err(ModelError::AmbiguousResult { count: 2 })
        ));
    }
}
