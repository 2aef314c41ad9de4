//! Test that a store failure mid-save leaves earlier writes in place.

use crate::e2e_tests::helpers::{User, table_over};
use crate::model::{ModelError, TableOptions, WriteOp};
use crate::storage::StoreError;
use crate::testing::FailingStore;
use crate::types::{Index, Query};

fn tagged(id: &str, tag: &str, age: i64) -> User {
    User {
        tag: tag.to_string(),
        age,
        ..User::with_id(id)
    }
}

#[test]
fn test_failure_after_first_write() {
    let table = table_over(
        FailingStore::failing_after(1),
        vec![Index::by_equality("tag"), Index::by_equality("age")],
        TableOptions::default(),
    );

    let result = table.save(&tagged("1", "a", 7));
    assert!(matches!(result, Err(ModelError::Store(StoreError::Io(_)))));

    // The tag entry made it, the age and identity entries did not.
    let by_tag: Vec<User> = table.list(&Query::equals("tag", "a")).unwrap();
    assert_eq!(by_tag.len(), 1);
    let by_age: Vec<User> = table.list(&Query::equals("age", 7)).unwrap();
    assert!(by_age.is_empty());
    let by_id = table.read::<User>(&Index::identity().to_query("1"));
    assert!(matches!(by_id, Err(ModelError::NotFound)));
}

#[test]
fn test_plan_order_matches_applied_writes() {
    let table = table_over(
        FailingStore::failing_after(10),
        vec![Index::by_equality("tag")],
        TableOptions::default(),
    );
    table.save(&tagged("1", "a", 1)).unwrap();

    let plan = table.prepare_save(&tagged("1", "b", 1)).unwrap();
    assert!(matches!(plan[0], WriteOp::Delete { .. }));
    assert!(matches!(plan[1], WriteOp::Put { .. }));
    assert!(matches!(plan[2], WriteOp::Put { .. }));
    assert_eq!(plan.len(), 3);

    // Nothing is applied once the budget is gone.
    let table = table_over(
        FailingStore::failing_after(0),
        vec![Index::by_equality("tag")],
        TableOptions::default(),
    );
    assert!(table.apply_writes(&plan).is_err());
    assert!(table.store().inner().is_empty().unwrap());
}

#[test]
fn test_failed_update_keeps_identity_copy() {
    // Two writes for the first save, then the stale delete of the update.
    let table = table_over(
        FailingStore::failing_after(3),
        vec![Index::by_equality("tag")],
        TableOptions::default(),
    );
    table.save(&tagged("1", "a", 1)).unwrap();
    assert!(table.save(&tagged("1", "b", 1)).is_err());

    let by_id: User = table.read(&Index::identity().to_query("1")).unwrap();
    assert_eq!(by_id.tag, "a");
    let old: Vec<User> = table.list(&Query::equals("tag", "a")).unwrap();
    assert!(old.is_empty());
}
