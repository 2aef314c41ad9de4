//! Test that base32-encoded string indexes keep their order.

use crate::e2e_tests::helpers::{User, memory_table, random_id};
use crate::types::{Index, Order};

#[test]
fn test_base32_keys_list_in_order() {
    for order in [Order::Ascending, Order::Descending] {
        let index = Index::by_equality("tag")
            .with_order(order)
            .with_pad_length(8)
            .base32();
        let table = memory_table(vec![index.clone()]);

        for tag in ["b", "a", "ab", "ba"] {
            table
                .save(&User {
                    tag: tag.to_string(),
                    ..User::with_id(&random_id())
                })
                .unwrap();
        }

        let users: Vec<User> = table.list(&index.to_range_query()).unwrap();
        let tags: Vec<&str> = users.iter().map(|u| u.tag.as_str()).collect();
        let expected = match order {
            Order::Descending => vec!["ba", "b", "ab", "a"],
            _ => vec!["a", "ab", "b", "ba"],
        };
        assert_eq!(tags, expected, "order {order}");
    }
}

#[test]
fn test_base32_equality_lookup() {
    let index = Index::by_equality("tag").base32();
    let table = memory_table(vec![index.clone()]);
    table
        .save(&User {
            tag: "hello".to_string(),
            ..User::with_id("1")
        })
        .unwrap();

    let user: User = table.read(&index.to_query("hello")).unwrap();
    assert_eq!(user.id, "1");

    let keys = table.store().keys().unwrap();
    let tag_key = keys
        .iter()
        .map(|k| String::from_utf8_lossy(k).into_owned())
        .find(|k| k.contains("byOrderedTag"))
        .unwrap();
    assert!(tag_key.is_ascii());
    assert!(!tag_key.contains("hello"));
}
