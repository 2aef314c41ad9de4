//! Test that ordered integer indexes list in numeric order.

use crate::e2e_tests::helpers::{User, memory_table, random_id, shuffled};
use crate::types::{Index, Order};

fn listed_dates(dates: &[i64], order: Order) -> Vec<i64> {
    let index = Index::by_equality("created").with_order(order);
    let table = memory_table(vec![index.clone()]);

    for created in shuffled(dates) {
        table
            .save(&User {
                created,
                ..User::with_id(&random_id())
            })
            .unwrap();
    }

    let users: Vec<User> = table.list(&index.to_range_query()).unwrap();
    users.into_iter().map(|u| u.created).collect()
}

#[test]
fn test_ascending() {
    assert_eq!(listed_dates(&[20, 30], Order::Ascending), vec![20, 30]);
}

#[test]
fn test_descending() {
    assert_eq!(listed_dates(&[20, 30], Order::Descending), vec![30, 20]);
}

#[test]
fn test_across_magnitudes() {
    let dates = [7, 1_600_000_000, 0, 95, 1_000, i64::MAX];
    let mut expected = dates.to_vec();
    expected.sort_unstable();
    assert_eq!(listed_dates(&dates, Order::Ascending), expected);

    expected.reverse();
    assert_eq!(listed_dates(&dates, Order::Descending), expected);
}
