//! Test tables backed by the append-only file store.

use tempfile::tempdir;

use crate::e2e_tests::helpers::User;
use crate::model::{Table, TableOptions};
use crate::storage::{FileStore, FileStoreOptions};
use crate::types::{Index, Query};

fn open(path: &std::path::Path) -> Table<FileStore> {
    let store = FileStore::open(path, FileStoreOptions::default()).unwrap();
    Table::new(
        store,
        "users",
        vec![Index::by_equality("tag")],
        TableOptions::default(),
    )
}

#[test]
fn test_records_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("users.log");

    {
        let table = open(&path);
        for (id, tag) in [("1", "a"), ("2", "b"), ("3", "a")] {
            table
                .save(&User {
                    tag: tag.to_string(),
                    ..User::with_id(id)
                })
                .unwrap();
        }
        table
            .save(&User {
                tag: "b".to_string(),
                ..User::with_id("3")
            })
            .unwrap();
        table.delete(&Index::identity().to_query("2")).unwrap();
    }

    let table = open(&path);
    let tagged_a: Vec<User> = table.list(&Query::equals("tag", "a")).unwrap();
    assert_eq!(tagged_a, vec![User { tag: "a".to_string(), ..User::with_id("1") }]);

    let tagged_b: Vec<User> = table.list(&Query::equals("tag", "b")).unwrap();
    let ids: Vec<&str> = tagged_b.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "3"]);

    assert!(table.read::<User>(&Index::identity().to_query("2")).is_err());
    let user: User = table.read(&Index::identity().to_query("3")).unwrap();
    assert_eq!(user.tag, "b");
}
