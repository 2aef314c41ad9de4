//! Test equality listings on a secondary index.

use crate::e2e_tests::helpers::{User, memory_table};
use crate::types::{Index, Query};

#[test]
fn test_list_by_age() {
    let table = memory_table(vec![Index::by_equality("age")]);

    table.save(&User { age: 12, ..User::with_id("1") }).unwrap();
    table.save(&User { age: 25, ..User::with_id("2") }).unwrap();
    table.save(&User { age: 12, ..User::with_id("3") }).unwrap();

    let users: Vec<User> = table.list(&Query::equals("age", 12)).unwrap();
    let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[test]
fn test_list_by_boolean() {
    let table = memory_table(vec![Index::by_equality("hasPet").unordered()]);

    table.save(&User { has_pet: true, ..User::with_id("1") }).unwrap();
    table.save(&User { has_pet: false, ..User::with_id("2") }).unwrap();

    let query = Index::by_equality("hasPet").unordered().to_query(true);
    let users: Vec<User> = table.list(&query).unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, "1");
}

#[test]
fn test_list_no_matches_is_empty() {
    let table = memory_table(vec![Index::by_equality("age")]);
    table.save(&User { age: 12, ..User::with_id("1") }).unwrap();

    let users: Vec<User> = table.list(&Query::equals("age", 99)).unwrap();
    assert!(users.is_empty());
}
