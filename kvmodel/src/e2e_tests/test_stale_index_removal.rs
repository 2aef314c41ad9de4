//! Test that changing an indexed field removes the old index entry.

use crate::e2e_tests::helpers::{User, memory_table};
use crate::types::{Index, Query};

#[test]
fn test_changed_tag_leaves_one_entry() {
    let index = Index::by_equality("tag");
    let table = memory_table(vec![index.clone()]);

    table
        .save(&User {
            tag: "hi-there".to_string(),
            ..User::with_id("1")
        })
        .unwrap();
    table
        .save(&User {
            tag: "hello-there".to_string(),
            ..User::with_id("1")
        })
        .unwrap();

    let users: Vec<User> = table.list(&index.to_range_query()).unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].tag, "hello-there");

    let stale: Vec<User> = table.list(&Query::equals("tag", "hi-there")).unwrap();
    assert!(stale.is_empty());
}

#[test]
fn test_unchanged_save_keeps_entry_count() {
    let table = memory_table(vec![Index::by_equality("tag"), Index::by_equality("age")]);
    let user = User {
        tag: "same".to_string(),
        age: 3,
        ..User::with_id("1")
    };

    table.save(&user).unwrap();
    let before = table.store().len().unwrap();
    table.save(&user).unwrap();
    assert_eq!(table.store().len().unwrap(), before);
    assert_eq!(before, 3);
}

#[test]
fn test_update_rewrites_every_copy() {
    let table = memory_table(vec![Index::by_equality("tag")]);
    table
        .save(&User {
            tag: "t".to_string(),
            age: 1,
            ..User::with_id("1")
        })
        .unwrap();
    table
        .save(&User {
            tag: "t".to_string(),
            age: 2,
            ..User::with_id("1")
        })
        .unwrap();

    let by_tag: User = table.read(&Query::equals("tag", "t")).unwrap();
    let by_id: User = table.read(&Index::identity().to_query("1")).unwrap();
    assert_eq!(by_tag.age, 2);
    assert_eq!(by_id.age, 2);
}
