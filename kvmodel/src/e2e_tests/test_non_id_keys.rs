//! Test tables whose identity is a field other than `id`.

use crate::e2e_tests::helpers::{Tag, memory_table_with};
use crate::model::{ModelError, TableOptions};
use crate::types::{Index, Order, Query};

fn slug_options() -> TableOptions {
    TableOptions {
        id_index: Some(Index::by_equality("slug").unordered()),
        ..TableOptions::default()
    }
}

#[test]
fn test_slug_identity() {
    let table = memory_table_with(Vec::new(), slug_options());

    table
        .save(&Tag {
            slug: "1".to_string(),
            age: 12,
            ..Tag::default()
        })
        .unwrap();
    table
        .save(&Tag {
            slug: "2".to_string(),
            age: 25,
            ..Tag::default()
        })
        .unwrap();

    let query = Query::equals("slug", "1").with_order(Order::Unordered);
    let tags: Vec<Tag> = table.list(&query).unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].age, 12);
}

#[test]
fn test_delete_uses_configured_identity() {
    let table = memory_table_with(Vec::new(), slug_options());
    table
        .save(&Tag {
            slug: "a".to_string(),
            ..Tag::default()
        })
        .unwrap();

    let by_id = Index::identity().to_query("a");
    assert!(matches!(
        table.delete(&by_id),
        Err(ModelError::DeleteRequiresIdentityQuery)
    ));

    let by_slug = table.identity_index().to_query("a");
    table.delete(&by_slug).unwrap();
    assert!(matches!(
        table.read::<Tag>(&by_slug),
        Err(ModelError::NotFound)
    ));
}

#[test]
fn test_missing_slug_is_rejected() {
    #[derive(serde::Serialize)]
    struct Untagged {
        id: String,
    }

    let table = memory_table_with(Vec::new(), slug_options());
    let result = table.save(&Untagged {
        id: "1".to_string(),
    });
    assert!(matches!(
        result,
        Err(ModelError::MissingField { ref field }) if field == "slug"
    ));
}
