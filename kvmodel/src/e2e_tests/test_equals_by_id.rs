//! Test that the identity index answers equality queries on its own.

use crate::e2e_tests::helpers::{User, memory_table};
use crate::types::{Index, Order, Query};

#[test]
fn test_list_by_id() {
    let table = memory_table(Vec::new());

    table.save(&User { age: 12, ..User::with_id("1") }).unwrap();
    table.save(&User { age: 25, ..User::with_id("2") }).unwrap();

    let query = Query::equals("id", "1").with_order(Order::Unordered);
    let users: Vec<User> = table.list(&query).unwrap();
    assert_eq!(users, vec![User { age: 12, ..User::with_id("1") }]);
}

#[test]
fn test_id_is_not_a_prefix_match() {
    let table = memory_table(Vec::new());

    table.save(&User::with_id("1")).unwrap();
    table.save(&User::with_id("10")).unwrap();
    table.save(&User::with_id("100")).unwrap();

    let users: Vec<User> = table.list(&Index::identity().to_query("1")).unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, "1");
}

#[test]
fn test_list_all_ids() {
    let table = memory_table(Vec::new());
    for id in ["b", "a", "c"] {
        table.save(&User::with_id(id)).unwrap();
    }

    let users: Vec<User> = table.list(&Index::identity().to_range_query()).unwrap();
    let ids: Vec<&str> = users.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn test_default_order_misses_identity_index() {
    let table = memory_table(Vec::new());
    table.save(&User::with_id("1")).unwrap();

    let result = table.list::<User>(&Query::equals("id", "1"));
    assert!(result.is_err());
}
