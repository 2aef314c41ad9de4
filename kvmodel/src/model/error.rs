//! Errors returned by table operations.

use crate::storage::StoreError;
use crate::types::{ComparisonKind, Order, ValueKind};

/// Errors that can occur while saving, reading, listing or deleting records.
///
/// None of these are retried. A failed `save` or `delete` may have left
/// some keys written; see [`crate::model::Table::save`].
#[derive(Debug)]
pub enum ModelError {
    /// A read matched no record.
    NotFound,
    /// A read, or a unique-index check, matched more than one record.
    AmbiguousResult { count: usize },
    /// A unique index already holds this value for a different identity.
    UniqueConstraintViolated { field: String, value: String },
    /// No declared index has the query's field, comparison kind and order.
    NoMatchingIndex {
        field: String,
        kind: ComparisonKind,
        order: Order,
    },
    /// An indexed field holds a value the key encoder can't represent.
    ///
    /// This means the table was declared against incompatible record types.
    UnsupportedValueType { field: String, kind: ValueKind },
    /// Deletes only accept an equality query with a value on the identity index.
    DeleteRequiresIdentityQuery,
    /// The record has no value for its identity field.
    MissingField { field: String },
    /// The record doesn't serialize to a JSON object.
    NotADocument,
    /// JSON encoding or decoding failed.
    Serialization(serde_json::Error),
    /// The underlying store failed.
    Store(StoreError),
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::AmbiguousResult { count } => {
                write!(f, "multiple records found: expected 1, got {count}")
            }
            Self::UniqueConstraintViolated { field, value } => {
                write!(f, "unique index on '{field}' violated by value '{value}'")
            }
            Self::NoMatchingIndex { field, kind, order } => write!(
                f,
                "for query type '{kind}', field '{field}' with order '{order}' does not match any index"
            ),
            Self::UnsupportedValueType { field, kind } => {
                write!(f, "unsupported value type {kind} for indexed field '{field}'")
            }
            Self::DeleteRequiresIdentityQuery => {
                write!(f, "delete query does not match the identity index")
            }
            Self::MissingField { field } => write!(f, "record is missing field '{field}'"),
            Self::NotADocument => write!(f, "record does not serialize to a JSON object"),
            Self::Serialization(e) => write!(f, "serialization error: {e}"),
            Self::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialization(e) => Some(e),
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for ModelError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}
