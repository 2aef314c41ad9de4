//! Test deletes through the identity index.

use crate::e2e_tests::helpers::{User, memory_table};
use crate::model::ModelError;
use crate::types::{Index, Query};

fn tagged(id: &str, tag: &str) -> User {
    User {
        tag: tag.to_string(),
        ..User::with_id(id)
    }
}

#[test]
fn test_delete_removes_identity_entry() {
    let table = memory_table(vec![Index::by_equality("tag")]);
    table.save(&tagged("1", "a")).unwrap();
    table.save(&tagged("2", "a")).unwrap();

    table.delete(&Index::identity().to_query("1")).unwrap();

    let result = table.read::<User>(&Index::identity().to_query("1"));
    assert!(matches!(result, Err(ModelError::NotFound)));
    let other: User = table.read(&Index::identity().to_query("2")).unwrap();
    assert_eq!(other.id, "2");
}

#[test]
fn test_delete_leaves_secondary_entries() {
    let table = memory_table(vec![Index::by_equality("tag")]);
    table.save(&tagged("1", "a")).unwrap();
    table.delete(&Index::identity().to_query("1")).unwrap();

    let users: Vec<User> = table.list(&Query::equals("tag", "a")).unwrap();
    assert_eq!(users, vec![tagged("1", "a")]);
}

#[test]
fn test_delete_missing_is_not_found() {
    let table = memory_table(Vec::new());
    let result = table.delete(&Index::identity().to_query("1"));
    assert!(matches!(result, Err(ModelError::NotFound)));
}

#[test]
fn test_delete_requires_identity_query() {
    let table = memory_table(vec![Index::by_equality("tag")]);
    table.save(&tagged("1", "a")).unwrap();

    let by_tag = table.delete(&Query::equals("tag", "a"));
    assert!(matches!(by_tag, Err(ModelError::DeleteRequiresIdentityQuery)));

    let whole_index = table.delete(&Index::identity().to_range_query());
    assert!(matches!(
        whole_index,
        Err(ModelError::DeleteRequiresIdentityQuery)
    ));

    let user: User = table.read(&Index::identity().to_query("1")).unwrap();
    assert_eq!(user.id, "1");
}

#[test]
fn test_resave_after_delete() {
    let table = memory_table(vec![Index::by_equality("tag")]);
    table.save(&tagged("1", "a")).unwrap();
    table.delete(&Index::identity().to_query("1")).unwrap();
    table.save(&tagged("1", "b")).unwrap();

    let user: User = table.read(&Index::identity().to_query("1")).unwrap();
    assert_eq!(user.tag, "b");
}
