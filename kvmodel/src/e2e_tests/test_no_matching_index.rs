//! Test that queries must match a declared index exactly.

use crate::e2e_tests::helpers::{User, memory_table};
use crate::model::ModelError;
use crate::types::{Index, Order, Query};

#[test]
fn test_unknown_field() {
    let table = memory_table(vec![Index::by_equality("age")]);
    let result = table.list::<User>(&Query::equals("tag", "a"));
    assert!(matches!(
        result,
        Err(ModelError::NoMatchingIndex { ref field, order: Order::Ascending, .. })
            if field == "tag"
    ));
}

#[test]
fn test_wrong_order() {
    let table = memory_table(vec![Index::by_equality("age")]);
    table
        .save(&User {
            age: 3,
            ..User::with_id("1")
        })
        .unwrap();

    let descending = Query::equals("age", 3).with_order(Order::Descending);
    assert!(matches!(
        table.read::<User>(&descending),
        Err(ModelError::NoMatchingIndex { .. })
    ));
}

#[test]
fn test_first_matching_index_wins() {
    let table = memory_table(vec![
        Index::by_equality("tag"),
        Index::by_equality("tag").with_pad_length(4),
    ]);
    table
        .save(&User {
            tag: "abc".to_string(),
            ..User::with_id("1")
        })
        .unwrap();

    let user: User = table.read(&Query::equals("tag", "abc")).unwrap();
    assert_eq!(user.id, "1");
}

#[test]
fn test_unsupported_query_value() {
    let table = memory_table(vec![Index::by_equality("age")]);
    let mut query = Query::all("age");
    query.value = Some(crate::types::FieldValue::Array);
    assert!(matches!(
        table.list::<User>(&query),
        Err(ModelError::UnsupportedValueType { .. })
    ));
}
