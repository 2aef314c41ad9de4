//! Read, list and delete requests.

use crate::types::{ComparisonKind, FieldValue, Order};

/// A request to read, list or delete records.
///
/// A query must have the same field, comparison kind and order as one of the
/// table's indexes. `value: None` targets the whole index, which is how
/// ordered listings are requested.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub field_name: String,
    pub kind: ComparisonKind,
    pub order: Order,
    pub value: Option<FieldValue>,
    /// Matches to skip before returning results. Only applies to `list`.
    pub offset: usize,
    /// Maximum number of results. Only applies to `list`.
    pub limit: Option<usize>,
}

impl Query {
    /// Equality query on `field_name`, ascending, like `Index::by_equality`.
    ///
    /// A null value is treated as "no value" and targets the whole index.
    #[must_use]
    pub fn equals(field_name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let value = value.into();
        Self {
            field_name: field_name.into(),
            kind: ComparisonKind::Equality,
            order: Order::Ascending,
            value: if value.is_null() { None } else { Some(value) },
            offset: 0,
            limit: None,
        }
    }

    /// Query over every entry of the index on `field_name`.
    #[must_use]
    pub fn all(field_name: impl Into<String>) -> Self {
        Self::equals(field_name, FieldValue::Null)
    }

    #[must_use]
    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
