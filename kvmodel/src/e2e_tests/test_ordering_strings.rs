//! Test that ordered string indexes list in value order.

use crate::e2e_tests::helpers::{User, memory_table, random_id, shuffled};
use crate::types::{Index, Order};

fn listed_tags(tags: &[&str], order: Order) -> Vec<String> {
    let index = Index::by_equality("tag").with_order(order).with_pad_length(12);
    let table = memory_table(vec![index.clone()]);

    for tag in shuffled(tags) {
        table
            .save(&User {
                tag: tag.to_string(),
                ..User::with_id(&random_id())
            })
            .unwrap();
    }

    let users: Vec<User> = table.list(&index.to_range_query()).unwrap();
    users.into_iter().map(|u| u.tag).collect()
}

fn sorted(tags: &[&str], order: Order) -> Vec<String> {
    let mut tags: Vec<String> = tags.iter().map(ToString::to_string).collect();
    tags.sort();
    if order == Order::Descending {
        tags.reverse();
    }
    tags
}

#[test]
fn test_string_ordering_cases() {
    let cases: [&[&str]; 3] = [
        &["2", "1"],
        &["abcd", "abcde", "abcdf"],
        &["2", "abcd", "abcde", "abcdf", "1"],
    ];

    for tags in cases {
        for order in [Order::Ascending, Order::Descending] {
            assert_eq!(
                listed_tags(tags, order),
                sorted(tags, order),
                "tags {tags:?}, order {order}"
            );
        }
    }
}

#[test]
fn test_non_ascii_ordering() {
    let tags = ["zebra", "émile", "Zoe", "ärger", "apple"];
    for order in [Order::Ascending, Order::Descending] {
        assert_eq!(listed_tags(&tags, order), sorted(&tags, order));
    }
}
