//! Stored record form.
//!
//! A record is stored as the JSON it serializes to, byte for byte. The
//! table reads indexed fields out of the parsed object, so any type whose
//! `Serialize` impl produces a JSON object can be stored.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::model::ModelError;
use crate::types::FieldValue;

/// A serialized record together with its parsed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    raw: Vec<u8>,
    fields: Map<String, Value>,
}

impl Document {
    /// Serialize `record` and parse its fields.
    pub fn from_record<R: Serialize + ?Sized>(record: &R) -> Result<Self, ModelError> {
        Self::from_bytes(serde_json::to_vec(record)?)
    }

    /// Parse a stored document.
    pub fn from_bytes(raw: Vec<u8>) -> Result<Self, ModelError> {
        match serde_json::from_slice(&raw)? {
            Value::Object(fields) => Ok(Self { raw, fields }),
            _ => Err(ModelError::NotADocument),
        }
    }

    /// The bytes written to the store.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Give back the stored bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.raw
    }

    /// Value of `name`, or `Null` when the field is absent.
    #[must_use]
    pub fn field(&self, name: &str) -> FieldValue {
        self.fields.get(name).map_or(FieldValue::Null, FieldValue::from_json)
    }

    /// Decode into a caller type.
    pub fn decode<R: DeserializeOwned>(&self) -> Result<R, ModelError> {
        Ok(serde_json::from_slice(&self.raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Post {
        id: String,
        slug: String,
        views: i64,
        rating: f64,
        draft: bool,
        tags: Vec<String>,
    }

    fn post() -> Post {
        Post {
            id: "1".to_string(),
            slug: "hi-there".to_string(),
            views: 12,
            rating: 4.5,
            draft: false,
            tags: vec!["a".to_string()],
        }
    }

    #[test]
    fn test_fields_are_typed() {
        let document = Document::from_record(&post()).expect("document");
        assert_eq!(document.field("id"), FieldValue::String("1".to_string()));
        assert_eq!(document.field("views"), FieldValue::Integer(12));
        assert_eq!(document.field("rating"), FieldValue::Float(4.5));
        assert_eq!(document.field("draft"), FieldValue::Boolean(false));
        assert_eq!(document.field("tags"), FieldValue::Array);
        assert_eq!(document.field("missing"), FieldValue::Null);
    }

    #[test]
    fn test_raw_bytes_decode_back() {
        let document = Document::from_record(&post()).expect("document");
        let reparsed = Document::from_bytes(document.as_bytes().to_vec()).expect("reparse");
        assert_eq!(reparsed.decode::<Post>().expect("decode"), post());
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(matches!(
            Document::from_record(&vec![1, 2, 3]),
            Err(ModelError::NotADocument)
        ));
        assert!(matches!(
            Document::from_record("just a string"),
            Err(ModelError::NotADocument)
        ));
    }
}
