mod field_value;
mod index;
mod query;

pub use field_value::{FieldValue, ValueKind};
pub use index::{ComparisonKind, Index, Order};
pub use query::Query;
