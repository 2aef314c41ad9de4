//! Test unique index enforcement.

use crate::e2e_tests::helpers::{User, memory_table};
use crate::model::ModelError;
use crate::types::Index;

fn tagged(id: &str, tag: &str) -> User {
    User {
        tag: tag.to_string(),
        ..User::with_id(id)
    }
}

#[test]
fn test_duplicate_value_is_rejected() {
    let table = memory_table(vec![Index::by_equality("tag").unique()]);

    table.save(&tagged("1", "hi-there")).unwrap();
    table.save(&tagged("2", "hello-there")).unwrap();

    let result = table.save(&tagged("3", "hi-there"));
    assert!(matches!(
        result,
        Err(ModelError::UniqueConstraintViolated { ref field, ref value })
            if field == "tag" && value == "hi-there"
    ));
}

#[test]
fn test_rejected_save_writes_nothing() {
    let table = memory_table(vec![Index::by_equality("tag").unique()]);
    table.save(&tagged("1", "hi-there")).unwrap();
    let before = table.store().keys().unwrap();

    assert!(table.save(&tagged("3", "hi-there")).is_err());
    assert_eq!(table.store().keys().unwrap(), before);
}

#[test]
fn test_same_identity_may_resave() {
    let table = memory_table(vec![Index::by_equality("tag").unique()]);
    table.save(&tagged("1", "hi-there")).unwrap();
    table.save(&tagged("1", "hi-there")).unwrap();
}

#[test]
fn test_value_frees_up_after_change() {
    let table = memory_table(vec![Index::by_equality("tag").unique()]);
    table.save(&tagged("1", "hi-there")).unwrap();
    table.save(&tagged("1", "moved-on")).unwrap();
    table.save(&tagged("2", "hi-there")).unwrap();
}

#[test]
fn test_prefix_of_taken_value_is_free() {
    let table = memory_table(vec![Index::by_equality("tag").unordered().unique()]);
    table.save(&tagged("1", "hi-there")).unwrap();
    table.save(&tagged("2", "hi")).unwrap();
}
