//! Order-preserving key encoding.
//!
//! Every index entry lives under a key of the form
//!
//! ```text
//! namespace ':' index_prefix ':' encoded_value [':' identity]
//! ```
//!
//! `encoded_value` is built so that ascending byte order of keys matches the
//! declared order of the index: natural order for ascending indexes and the
//! reverse for descending ones. Unordered strings, and so string identities,
//! have `%` and `:` percent-escaped so a value never spills into the next
//! part of the key. Nothing in here touches a store.
//!
//! # Limitations
//!
//! - Negative integers are not handled by ascending indexes. The sign is
//!   rendered in front of the zero padding and sorts before the digits.
//! - Descending floats are encoded as `f64::MAX - value` without padding.
//!   Values far below `f64::MAX` collapse to the same rendering, so only the
//!   identity suffix tells them apart.
//! - Ordered strings longer than the pad length keep all their characters but
//!   lose their ordering guarantee against shorter values.

use crate::model::ModelError;
use crate::types::{FieldValue, Index, Order};

/// Separates the parts of a key.
pub const SEPARATOR: u8 = b':';

/// Largest Unicode scalar value. Descending strings complement against it.
const MAX_CODE_POINT: u32 = 0x10_FFFF;

/// Pad for ascending strings: the smallest printable code point.
const ASCENDING_PAD: u32 = 0x20;

/// RFC 4648 base32hex. Symbols are in ascending byte order.
const BASE32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHIJKLMNOPQRSTUV";

/// Stands in for `=`. Sorts below every symbol of the alphabet.
const BASE32_PAD: u8 = b'-';

/// Starts an escape sequence in unordered strings.
const ESCAPE: u8 = b'%';

/// Tag naming the field and order of `index` inside a key.
///
/// `by<Field>` for unordered indexes, `byOrdered<Field>` for ascending and
/// `byDescOrdered<Field>` for descending ones, so the three variants of an
/// index on one field never share keys.
#[must_use]
pub fn index_prefix(index: &Index) -> String {
    let field = capitalize(&index.field_name);
    match index.order {
        Order::Unordered => format!("by{field}"),
        Order::Ascending => format!("byOrdered{field}"),
        Order::Descending => format!("byDescOrdered{field}"),
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Encode one field value for `index`.
pub fn encode_value(index: &Index, value: &FieldValue) -> Result<Vec<u8>, ModelError> {
    match value {
        FieldValue::Integer(v) => Ok(encode_integer(*v, index.order).into_bytes()),
        FieldValue::Float(v) => Ok(encode_float(*v, index.order).into_bytes()),
        FieldValue::String(s) if index.order.is_ordered() => Ok(encode_ordered_string(s, index)),
        FieldValue::String(s) => Ok(escape_separator(s)),
        FieldValue::Boolean(b) => Ok(b.to_string().into_bytes()),
        FieldValue::Null | FieldValue::Array | FieldValue::Object => {
            Err(ModelError::UnsupportedValueType {
                field: index.field_name.clone(),
                kind: value.kind(),
            })
        }
    }
}

/// Encode an identity value the way an unordered index would.
pub fn encode_identity(field_name: &str, value: &FieldValue) -> Result<Vec<u8>, ModelError> {
    encode_value(&Index::by_equality(field_name).unordered(), value)
}

/// `value` with `%` written as `%25` and `:` as `%3A`.
fn escape_separator(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for &b in value.as_bytes() {
        match b {
            ESCAPE => out.extend_from_slice(b"%25"),
            SEPARATOR => out.extend_from_slice(b"%3A"),
            _ => out.push(b),
        }
    }
    out
}

fn encode_integer(value: i64, order: Order) -> String {
    match order {
        Order::Descending => format!("{:019}", i128::from(i64::MAX) - i128::from(value)),
        Order::Ascending | Order::Unordered => format!("{value:019}"),
    }
}

fn encode_float(value: f64, order: Order) -> String {
    match order {
        Order::Descending => format!("{:e}", f64::MAX - value),
        Order::Ascending | Order::Unordered => format!("{value}"),
    }
}

fn encode_ordered_string(value: &str, index: &Index) -> Vec<u8> {
    let descending = index.order == Order::Descending;
    let pad = if descending { MAX_CODE_POINT } else { ASCENDING_PAD };
    let complement = |cp: u32| if descending { MAX_CODE_POINT - cp } else { cp };

    let code_points: Vec<u32> = value.chars().map(|c| complement(u32::from(c))).collect();
    let missing = index.string_pad_length.saturating_sub(code_points.len());

    let mut bytes = Vec::with_capacity((code_points.len() + missing) * 4);
    for cp in code_points.into_iter().chain(std::iter::repeat_n(pad, missing)) {
        push_code_point(&mut bytes, cp);
    }

    if index.base32_encode {
        base32_encode(&bytes)
    } else {
        bytes
    }
}

/// Append `cp` as UTF-8 without rejecting surrogates.
///
/// Complemented code points can land in the surrogate range, which `char`
/// can't hold. The byte layout is the usual UTF-8 one, so byte order still
/// equals code point order.
#[allow(clippy::cast_possible_truncation)]
pub fn push_code_point(out: &mut Vec<u8>, cp: u32) {
    match cp {
        0..=0x7F => out.push(cp as u8),
        0x80..=0x7FF => out.extend_from_slice(&[
            0xC0 | (cp >> 6) as u8,
            0x80 | (cp & 0x3F) as u8,
        ]),
        0x800..=0xFFFF => out.extend_from_slice(&[
            0xE0 | (cp >> 12) as u8,
            0x80 | ((cp >> 6) & 0x3F) as u8,
            0x80 | (cp & 0x3F) as u8,
        ]),
        _ => out.extend_from_slice(&[
            0xF0 | (cp >> 18) as u8,
            0x80 | ((cp >> 12) & 0x3F) as u8,
            0x80 | ((cp >> 6) & 0x3F) as u8,
            0x80 | (cp & 0x3F) as u8,
        ]),
    }
}

/// Base32hex-encode `input`, padding with `-` instead of `=`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn base32_encode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len().div_ceil(5) * 8);
    for chunk in input.chunks(5) {
        let mut block = [0u8; 5];
        block[..chunk.len()].copy_from_slice(chunk);
        let bits = block.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));

        let symbols = match chunk.len() {
            1 => 2,
            2 => 4,
            3 => 5,
            4 => 7,
            _ => 8,
        };
        for i in 0..8 {
            if i < symbols {
                let shift = 35 - i * 5;
                out.push(BASE32_ALPHABET[((bits >> shift) & 0x1F) as usize]);
            } else {
                out.push(BASE32_PAD);
            }
        }
    }
    out
}

/// `namespace:index_prefix:`, the prefix shared by every entry of `index`.
#[must_use]
pub fn index_range_prefix(namespace: &str, index: &Index) -> Vec<u8> {
    let prefix = index_prefix(index);
    let mut key = Vec::with_capacity(namespace.len() + prefix.len() + 2);
    key.extend_from_slice(namespace.as_bytes());
    key.push(SEPARATOR);
    key.extend_from_slice(prefix.as_bytes());
    key.push(SEPARATOR);
    key
}

/// Full key of one index entry.
///
/// `identity` is the encoded identity suffix; pass `None` for the identity
/// index itself.
pub fn index_key(
    namespace: &str,
    index: &Index,
    value: &FieldValue,
    identity: Option<&[u8]>,
) -> Result<Vec<u8>, ModelError> {
    let mut key = index_range_prefix(namespace, index);
    key.extend_from_slice(&encode_value(index, value)?);
    if let Some(identity) = identity {
        key.push(SEPARATOR);
        key.extend_from_slice(identity);
    }
    Ok(key)
}

/// Prefix shared by every entry of a secondary index holding `value`.
///
/// Ends with the separator so that one value never matches entries of a
/// longer value it happens to prefix.
pub fn value_prefix(
    namespace: &str,
    index: &Index,
    value: &FieldValue,
) -> Result<Vec<u8>, ModelError> {
    let mut key = index_key(namespace, index, value, None)?;
    key.push(SEPARATOR);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cmp::Ordering;

    fn encoded(index: &Index, value: impl Into<FieldValue>) -> Vec<u8> {
        encode_value(index, &value.into()).expect("value should encode")
    }

    fn assert_encoded_order(index: &Index, left: FieldValue, right: FieldValue, expected: Ordering) {
        let left_bytes = encode_value(index, &left).expect("left should encode");
        let right_bytes = encode_value(index, &right).expect("right should encode");
        assert_eq!(left_bytes.cmp(&right_bytes), expected, "{left:?} vs {right:?}");
    }

    #[test]
    fn test_index_prefix_per_order() {
        let index = Index::by_equality("createdAt");
        assert_eq!(index_prefix(&index), "byOrderedCreatedAt");
        assert_eq!(index_prefix(&index.clone().descending()), "byDescOrderedCreatedAt");
        assert_eq!(index_prefix(&index.unordered()), "byCreatedAt");
        assert_eq!(index_prefix(&Index::identity()), "byId");
    }

    #[test]
    fn test_integer_encoding() {
        let index = Index::by_equality("age");
        assert_eq!(encoded(&index, 20), b"0000000000000000020");
        assert_eq!(encoded(&index.clone().unordered(), 20), b"0000000000000000020");
        assert_eq!(encoded(&index.descending(), 20), b"9223372036854775787");
    }

    #[test]
    fn test_descending_integer_extremes_do_not_overflow() {
        let index = Index::by_equality("age").descending();
        assert_eq!(encoded(&index, i64::MAX), b"0000000000000000000");
        assert_eq!(encoded(&index, 0), b"9223372036854775807");
        assert_eq!(encoded(&index, -1), b"9223372036854775808");
    }

    #[test]
    fn test_float_encoding() {
        let index = Index::by_equality("score");
        assert_eq!(encoded(&index, 2.5), b"2.5");
        assert_eq!(encoded(&index.descending(), 0.0), b"1.7976931348623157e308");
    }

    #[test]
    fn test_boolean_and_unordered_string_are_literal() {
        let index = Index::by_equality("flag").unordered();
        assert_eq!(encoded(&index, true), b"true");
        assert_eq!(encoded(&index, false), b"false");
        assert_eq!(encoded(&index, "hi-there"), b"hi-there");
    }

    #[test]
    fn test_unordered_string_escapes_separator() {
        let index = Index::by_equality("tag").unordered();
        assert_eq!(encoded(&index, "a:b"), b"a%3Ab");
        assert_eq!(encoded(&index, "50%"), b"50%25");
        assert_eq!(encoded(&index, "%3A"), b"%253A");
        assert_ne!(encoded(&index, "a:b"), encoded(&index, "a%3Ab"));

        let identity = encode_identity("id", &FieldValue::from("b:1")).expect("identity");
        assert!(!identity.contains(&SEPARATOR));
    }

    #[test]
    fn test_unsupported_types_fail() {
        let index = Index::by_equality("tags");
        for value in [FieldValue::Null, FieldValue::Array, FieldValue::Object] {
            let result = encode_value(&index, &value);
            assert!(matches!(
                result,
                Err(ModelError::UnsupportedValueType { ref field, kind })
                    if field == "tags" && kind == value.kind()
            ));
        }
    }

    #[test]
    fn test_ascending_string_is_space_padded() {
        let index = Index::by_equality("tag").with_pad_length(6);
        assert_eq!(encoded(&index, "ab"), b"ab    ");
        assert_eq!(encoded(&index, "abcdefgh"), b"abcdefgh");
    }

    #[test]
    fn test_descending_string_is_complemented() {
        let index = Index::by_equality("tag").descending().with_pad_length(2);
        let mut expected = Vec::new();
        push_code_point(&mut expected, MAX_CODE_POINT - u32::from('a'));
        push_code_point(&mut expected, MAX_CODE_POINT);
        assert_eq!(encoded(&index, "a"), expected);
    }

    #[test]
    fn test_push_code_point_matches_utf8() {
        for c in ['a', 'é', '€', '😀'] {
            let mut out = Vec::new();
            push_code_point(&mut out, u32::from(c));
            assert_eq!(out, c.to_string().into_bytes());
        }
    }

    #[test]
    fn test_push_code_point_accepts_surrogates() {
        let mut out = Vec::new();
        push_code_point(&mut out, 0xD800);
        assert_eq!(out, [0xED, 0xA0, 0x80]);
    }

    #[test]
    fn test_base32_vectors() {
        let cases: [(&[u8], &[u8]); 7] = [
            (b"", b""),
            (b"f", b"CO------"),
            (b"fo", b"CPNG----"),
            (b"foo", b"CPNMU---"),
            (b"foob", b"CPNMUOG-"),
            (b"fooba", b"CPNMUOJ1"),
            (b"foobar", b"CPNMUOJ1E8------"),
        ];
        for (input, expected) in cases {
            assert_eq!(base32_encode(input), expected);
        }
    }

    #[test]
    fn test_base32_strings_are_printable() {
        let index = Index::by_equality("tag").descending().base32();
        let key = encoded(&index, "hello");
        assert!(key.iter().all(|b| BASE32_ALPHABET.contains(b) || *b == BASE32_PAD));
    }

    #[test]
    fn test_prefix_strings_order() {
        let index = Index::by_equality("tag").with_pad_length(12);
        let abcd = FieldValue::from("abcd");
        let abcde = FieldValue::from("abcde");
        let abcdf = FieldValue::from("abcdf");
        assert_encoded_order(&index, abcd.clone(), abcde.clone(), Ordering::Less);
        assert_encoded_order(&index, abcde.clone(), abcdf.clone(), Ordering::Less);

        let descending = index.descending();
        assert_encoded_order(&descending, abcd.clone(), abcde.clone(), Ordering::Greater);
        assert_encoded_order(&descending, abcde, abcdf, Ordering::Greater);
        assert_encoded_order(&descending, abcd.clone(), abcd, Ordering::Equal);
    }

    #[test]
    fn test_keys() {
        let index = Index::by_equality("tag").unordered();
        let identity = encode_identity("id", &FieldValue::from("7")).expect("identity");
        let key = index_key("users", &index, &"x".into(), Some(identity.as_slice())).expect("key");
        assert_eq!(key, b"users:byTag:x:7");

        let key = index_key("users", &Index::identity(), &"7".into(), None).expect("key");
        assert_eq!(key, b"users:byId:7");

        assert_eq!(index_range_prefix("users", &index), b"users:byTag:");
        assert_eq!(
            value_prefix("users", &index, &"x".into()).expect("prefix"),
            b"users:byTag:x:"
        );
    }

    #[test]
    fn test_integer_identity_suffix_is_padded() {
        let identity = encode_identity("id", &FieldValue::Integer(7)).expect("identity");
        assert_eq!(identity, b"0000000000000000007");
    }

    fn printable_string() -> impl Strategy<Value = String> {
        "[!-~À-ÿ]{0,12}"
    }

    fn string_index(order: Order, base32: bool) -> Index {
        let index = Index::by_equality("tag").with_order(order).with_pad_length(12);
        if base32 {
            index.base32()
        } else {
            index
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(512))]

        #[test]
        fn ascending_integers_keep_order(a in 0..=i64::MAX, b in 0..=i64::MAX) {
            let index = Index::by_equality("n");
            let left = encode_value(&index, &FieldValue::Integer(a)).expect("encode");
            let right = encode_value(&index, &FieldValue::Integer(b)).expect("encode");
            prop_assert_eq!(left.cmp(&right), a.cmp(&b));
        }

        #[test]
        fn descending_integers_reverse_order(a in 0..=i64::MAX, b in 0..=i64::MAX) {
            let index = Index::by_equality("n").descending();
            let left = encode_value(&index, &FieldValue::Integer(a)).expect("encode");
            let right = encode_value(&index, &FieldValue::Integer(b)).expect("encode");
            prop_assert_eq!(left.cmp(&right), b.cmp(&a));
        }

        #[test]
        fn ascending_strings_keep_order(
            a in printable_string(),
            b in printable_string(),
            base32 in any::<bool>(),
        ) {
            let index = string_index(Order::Ascending, base32);
            let left = encode_value(&index, &FieldValue::from(a.as_str())).expect("encode");
            let right = encode_value(&index, &FieldValue::from(b.as_str())).expect("encode");
            prop_assert_eq!(left.cmp(&right), a.cmp(&b));
        }

        #[test]
        fn descending_strings_reverse_order(
            a in printable_string(),
            b in printable_string(),
            base32 in any::<bool>(),
        ) {
            let index = string_index(Order::Descending, base32);
            let left = encode_value(&index, &FieldValue::from(a.as_str())).expect("encode");
            let right = encode_value(&index, &FieldValue::from(b.as_str())).expect("encode");
            prop_assert_eq!(left.cmp(&right), b.cmp(&a));
        }
    }
}
