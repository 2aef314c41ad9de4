//! Test that `read` demands exactly one match.

use crate::e2e_tests::helpers::{User, memory_table};
use crate::model::ModelError;
use crate::types::{Index, Query};

#[test]
fn test_read_zero_one_many() {
    let table = memory_table(vec![Index::by_equality("age")]);

    let result = table.read::<User>(&Query::equals("age", 25));
    assert!(matches!(result, Err(ModelError::NotFound)));

    table.save(&User { age: 25, ..User::with_id("1") }).unwrap();
    let user: User = table.read(&Query::equals("age", 25)).unwrap();
    assert_eq!(user.id, "1");

    table.save(&User { age: 25, ..User::with_id("2") }).unwrap();
    let result = table.read::<User>(&Query::equals("age", 25));
    assert!(matches!(result, Err(ModelError::AmbiguousResult { count: 2 })));
}

#[test]
fn test_read_by_identity_round_trips() {
    let table = memory_table(vec![Index::by_equality("age")]);
    let user = User {
        age: 40,
        has_pet: true,
        created: 1_600_000_000,
        tag: "admin".to_string(),
        updated: 1_600_000_100,
        ..User::with_id("42")
    };
    table.save(&user).unwrap();

    let found: User = table.read(&Index::identity().to_query("42")).unwrap();
    assert_eq!(found, user);
}

#[test]
fn test_read_missing_identity_is_not_found() {
    let table = memory_table(Vec::new());
    let result = table.read::<User>(&Index::identity().to_query("nobody"));
    assert!(matches!(result, Err(ModelError::NotFound)));
}
