//! Test paging through listings.

use crate::e2e_tests::helpers::{User, memory_table};
use crate::types::Index;

fn ages_listed(offset: usize, limit: Option<usize>) -> Vec<i64> {
    let index = Index::by_equality("age");
    let table = memory_table(vec![index.clone()]);
    for age in [5, 1, 4, 2, 3] {
        table
            .save(&User {
                age,
                ..User::with_id(&format!("u{age}"))
            })
            .unwrap();
    }

    let mut query = index.to_range_query().with_offset(offset);
    if let Some(limit) = limit {
        query = query.with_limit(limit);
    }
    let users: Vec<User> = table.list(&query).unwrap();
    users.into_iter().map(|u| u.age).collect()
}

#[test]
fn test_no_paging() {
    assert_eq!(ages_listed(0, None), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_offset_and_limit() {
    assert_eq!(ages_listed(1, Some(2)), vec![2, 3]);
    assert_eq!(ages_listed(3, None), vec![4, 5]);
    assert_eq!(ages_listed(0, Some(0)), Vec::<i64>::new());
}

#[test]
fn test_offset_past_end() {
    assert!(ages_listed(10, Some(3)).is_empty());
}

#[test]
fn test_read_ignores_paging() {
    let index = Index::by_equality("age");
    let table = memory_table(vec![index.clone()]);
    table
        .save(&User {
            age: 9,
            ..User::with_id("1")
        })
        .unwrap();

    let user: User = table.read(&index.to_query(9).with_offset(5)).unwrap();
    assert_eq!(user.id, "1");
}
