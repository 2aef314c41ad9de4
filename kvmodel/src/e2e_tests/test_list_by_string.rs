//! Test listing by a string index alongside a custom identity.

use crate::e2e_tests::helpers::{Tag, memory_table_with};
use crate::model::TableOptions;
use crate::types::{Index, Query};

#[test]
fn test_list_by_type() {
    let table = memory_table_with(
        vec![Index::by_equality("type")],
        TableOptions {
            id_index: Some(Index::by_equality("slug").unordered()),
            debug: true,
        },
    );

    for (slug, kind) in [("1", "post-tag"), ("2", "post-tag"), ("3", "user-tag")] {
        table
            .save(&Tag {
                slug: slug.to_string(),
                kind: kind.to_string(),
                ..Tag::default()
            })
            .unwrap();
    }

    let tags: Vec<Tag> = table.list(&Query::equals("type", "post-tag")).unwrap();
    let slugs: Vec<&str> = tags.iter().map(|t| t.slug.as_str()).collect();
    assert_eq!(slugs, vec!["1", "2"]);
}

#[test]
fn test_value_is_not_a_prefix_match() {
    let table = memory_table_with(
        vec![Index::by_equality("type").unordered()],
        TableOptions {
            id_index: Some(Index::by_equality("slug").unordered()),
            debug: false,
        },
    );

    for (slug, kind) in [("1", "post"), ("2", "post-tag")] {
        table
            .save(&Tag {
                slug: slug.to_string(),
                kind: kind.to_string(),
                ..Tag::default()
            })
            .unwrap();
    }

    let query = Index::by_equality("type").unordered().to_query("post");
    let tags: Vec<Tag> = table.list(&query).unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].slug, "1");
}
