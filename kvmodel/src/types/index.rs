//! Index declarations.
//!
//! An index is a queryable projection of one document field. It is declared
//! once when a table is built and never changes afterwards.

use crate::types::{FieldValue, Query};

/// How a query compares against an indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ComparisonKind {
    #[default]
    Equality,
}

impl std::fmt::Display for ComparisonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equality => f.write_str("eq"),
        }
    }
}

/// Key ordering of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
    /// Values are stored as-is; listing order is whatever the raw bytes give.
    Unordered,
    #[default]
    Ascending,
    Descending,
}

impl Order {
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        !matches!(self, Self::Unordered)
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unordered => "unordered",
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        };
        f.write_str(name)
    }
}

/// An index declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub field_name: String,
    pub kind: ComparisonKind,
    pub order: Order,
    /// Reject saves that would give two records the same value.
    pub unique: bool,
    /// Ordered string values are right-padded to this many code points.
    ///
    /// Descending order complements every code point, so a single character
    /// may take up to four bytes in the key. Choose a length that covers the
    /// longest expected value; longer values are not truncated but lose
    /// their ordering guarantee.
    pub string_pad_length: usize,
    /// Base32-encode padded string values so keys stay printable.
    pub base32_encode: bool,
}

impl Index {
    pub const DEFAULT_STRING_PAD_LENGTH: usize = 16;
    pub const DEFAULT_IDENTITY_FIELD: &'static str = "id";

    /// Equality index on `field_name`, ascending, not unique.
    #[must_use]
    pub fn by_equality(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            kind: ComparisonKind::Equality,
            order: Order::Ascending,
            unique: false,
            string_pad_length: Self::DEFAULT_STRING_PAD_LENGTH,
            base32_encode: false,
        }
    }

    /// The default identity index: unordered equality on `id`.
    #[must_use]
    pub fn identity() -> Self {
        Self::by_equality(Self::DEFAULT_IDENTITY_FIELD).with_order(Order::Unordered)
    }

    #[must_use]
    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn unordered(self) -> Self {
        self.with_order(Order::Unordered)
    }

    #[must_use]
    pub fn descending(self) -> Self {
        self.with_order(Order::Descending)
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub fn with_pad_length(mut self, string_pad_length: usize) -> Self {
        self.string_pad_length = string_pad_length;
        self
    }

    #[must_use]
    pub fn base32(mut self) -> Self {
        self.base32_encode = true;
        self
    }

    /// Equality query that targets exactly this index.
    #[must_use]
    pub fn to_query(&self, value: impl Into<FieldValue>) -> Query {
        Query::equals(self.field_name.as_str(), value).with_order(self.order)
    }

    /// Query covering every entry of this index.
    #[must_use]
    pub fn to_range_query(&self) -> Query {
        Query::all(self.field_name.as_str()).with_order(self.order)
    }

    /// Whether `query` targets this index: same field, comparison kind and order.
    #[must_use]
    pub fn matches(&self, query: &Query) -> bool {
        self.field_name == query.field_name && self.kind == query.kind && self.order == query.order
    }

    /// Whether two declarations occupy the same key space.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        self.field_name == other.field_name && self.kind == other.kind && self.order == other.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_equality_defaults() {
        let index = Index::by_equality("tag");
        assert_eq!(index.field_name, "tag");
        assert_eq!(index.kind, ComparisonKind::Equality);
        assert_eq!(index.order, Order::Ascending);
        assert!(!index.unique);
        assert_eq!(index.string_pad_length, 16);
        assert!(!index.base32_encode);
    }

    #[test]
    fn test_identity_is_unordered_id() {
        let index = Index::identity();
        assert_eq!(index.field_name, "id");
        assert_eq!(index.order, Order::Unordered);
    }

    #[test]
    fn test_matches_requires_same_order() {
        let index = Index::by_equality("age");
        assert!(index.matches(&Query::equals("age", 3)));
        assert!(!index.matches(&Query::equals("age", 3).with_order(Order::Descending)));
        assert!(!index.matches(&Query::equals("name", 3)));
    }

    #[test]
    fn test_to_query_carries_order() {
        let index = Index::by_equality("created").descending();
        let query = index.to_query(10);
        assert!(index.matches(&query));
        assert_eq!(query.value, Some(FieldValue::Integer(10)));

        let range = index.to_range_query();
        assert!(index.matches(&range));
        assert!(range.value.is_none());
    }
}
