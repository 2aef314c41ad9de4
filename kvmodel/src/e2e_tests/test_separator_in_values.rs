//! Test values and identities that contain the key separator.

use crate::e2e_tests::helpers::{User, memory_table};
use crate::types::{Index, Order, Query};

fn tagged(id: &str, tag: &str) -> User {
    User {
        tag: tag.to_string(),
        ..User::with_id(id)
    }
}

#[test]
fn test_colon_values_keep_separate_entries() {
    let table = memory_table(vec![Index::by_equality("tag").unordered()]);
    table.save(&tagged("b:1", "a")).unwrap();
    table.save(&tagged("1", "a:b")).unwrap();

    assert_eq!(table.store().len().unwrap(), 4);

    let by_tag = Index::by_equality("tag").unordered();
    let found: Vec<User> = table.list(&by_tag.to_query("a")).unwrap();
    assert_eq!(found, vec![tagged("b:1", "a")]);

    let found: Vec<User> = table.list(&by_tag.to_query("a:b")).unwrap();
    assert_eq!(found, vec![tagged("1", "a:b")]);

    let found: User = table.read(&Index::identity().to_query("b:1")).unwrap();
    assert_eq!(found.tag, "a");
}

#[test]
fn test_value_query_ignores_values_extending_past_a_colon() {
    let table = memory_table(vec![Index::by_equality("tag").unordered()]);
    table.save(&tagged("1", "a:b")).unwrap();

    let query = Query::equals("tag", "a").with_order(Order::Unordered);
    let found: Vec<User> = table.list(&query).unwrap();
    assert!(found.is_empty());
}

#[test]
fn test_percent_values_do_not_alias_escapes() {
    let table = memory_table(vec![Index::by_equality("tag").unordered()]);
    table.save(&tagged("1", "a%3Ab")).unwrap();
    table.save(&tagged("2", "a:b")).unwrap();

    let by_tag = Index::by_equality("tag").unordered();
    let found: Vec<User> = table.list(&by_tag.to_query("a%3Ab")).unwrap();
    assert_eq!(found, vec![tagged("1", "a%3Ab")]);
}

#[test]
fn test_delete_colon_identity() {
    let table = memory_table(Vec::new());
    table.save(&User::with_id("a:1")).unwrap();
    table.save(&User::with_id("a")).unwrap();

    table.delete(&Index::identity().to_query("a:1")).unwrap();

    let remaining: Vec<User> = table
        .list(&Query::all("id").with_order(Order::Unordered))
        .unwrap();
    assert_eq!(remaining, vec![User::with_id("a")]);
}
