//! Secondary indexes over a flat key-value store.
//!
//! [`Table`] keeps one copy of each record per index and answers equality
//! queries and ordered listings through them. [`encoding`] builds the keys.

pub mod encoding;

mod document;
mod error;
mod table;

pub use document::Document;
pub use error::ModelError;
pub use table::{Table, TableOptions, WriteOp};
