//! Integration tests for the child-query registry

use acl_core::{
    ChildQuery, ChildQueryContributor, HookRegistry, PolicyError, QueryLanguage, PARENT_PLACEHOLDER,
};
use serde::Deserialize;
use std::sync::Arc;

struct BookPages;

impl ChildQueryContributor for BookPages {
    fn name(&self) -> &str {
        "book"
    }

    fn child_queries(&self) -> Vec<ChildQuery> {
        vec![ChildQuery::new(
            "book_pages",
            QueryLanguage::Sparql,
            "SELECT ?object WHERE { ?object <info:fedora/fedora-system:def/relations-external#isMemberOf> <info:fedora/%PARENT%> }",
            "All pages of this book",
        )
        .unwrap()]
    }
}

struct Collections;

impl ChildQueryContributor for Collections {
    fn name(&self) -> &str {
        "collection"
    }

    fn child_queries(&self) -> Vec<ChildQuery> {
        vec![
            ChildQuery::new(
                "collection_members",
                QueryLanguage::Itql,
                "select $object from <#ri> where $object <fedora-rels-ext:isMemberOfCollection> <info:fedora/%PARENT%>",
                "Direct members of this collection",
            )
            .unwrap(),
            ChildQuery::new(
                "collection_children",
                QueryLanguage::Itql,
                "select $object from <#ri> where $object <fedora-rels-ext:isMemberOf> <info:fedora/%PARENT%>",
                "Children of this collection",
            )
            .unwrap(),
        ]
    }
}

#[test]
fn test_register_and_list() {
    let mut registry = HookRegistry::new();
    assert_eq!(registry.register(&Collections).unwrap(), 2);
    assert_eq!(registry.register(&BookPages).unwrap(), 1);

    let listed: Vec<_> = registry
        .list_contributions()
        .iter()
        .map(|c| (c.contributor.as_str(), c.query.key()))
        .collect();
    assert_eq!(
        listed,
        [
            ("collection", "collection_members"),
            ("collection", "collection_children"),
            ("book", "book_pages"),
        ]
    );
    assert_eq!(
        registry.get("book_pages").unwrap().language(),
        QueryLanguage::Sparql
    );
}

#[test]
fn test_registering_twice_fails() {
    let mut registry = HookRegistry::new();
    registry.register(&BookPages).unwrap();
    let result = registry.register(&BookPages);
    assert!(matches!(result, Err(PolicyError::DuplicateQuery(key)) if key == "book_pages"));
    assert_eq!(registry.count(), 1);
}

#[test]
fn test_shared_after_startup() {
    let mut registry = HookRegistry::new();
    registry.register(&Collections).unwrap();
    let shared = Arc::new(registry);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&shared);
            std::thread::spawn(move || registry.list_contributions().len())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }
}

#[derive(Deserialize)]
struct QueryFile {
    queries: Vec<ChildQuery>,
}

#[test]
fn test_queries_validated_on_deserialize() {
    let ok = r#"
[[queries]]
key = "members"
language = "itql"
query = "select $object from <#ri> where $object <fedora-rels-ext:isMemberOf> <info:fedora/%PARENT%>"
description = "Members"
"#;
    let file: QueryFile = toml::from_str(ok).unwrap();
    assert_eq!(file.queries[0].key(), "members");

    let missing_variable = r#"
[[queries]]
key = "members"
language = "sparql"
query = "SELECT ?s WHERE { ?s ?p ?o }"
description = "Members"
"#;
    assert!(toml::from_str::<QueryFile>(missing_variable).is_err());

    let unknown_language = r#"
[[queries]]
key = "members"
language = "cypher"
query = "MATCH (object) RETURN object"
description = "Members"
"#;
    assert!(toml::from_str::<QueryFile>(unknown_language).is_err());
}

#[test]
fn test_query_language_parse() {
    assert_eq!("itql".parse::<QueryLanguage>().unwrap(), QueryLanguage::Itql);
    assert!(matches!(
        "sql".parse::<QueryLanguage>(),
        Err(PolicyError::InvalidQuery(_))
    ));
    assert_eq!(QueryLanguage::Sparql.object_variable(), "?object");
}

#[test]
fn test_bind_fills_parent_per_object() {
    let mut registry = HookRegistry::new();
    registry.register(&BookPages).unwrap();
    let pages = registry.get("book_pages").unwrap();
    assert!(pages.query().contains(PARENT_PLACEHOLDER));

    let first = pages.bind("book:1").unwrap();
    let second = pages.bind("book:2").unwrap();
    assert!(first.contains("<info:fedora/book:1>"));
    assert!(second.contains("<info:fedora/book:2>"));
    assert!(!first.contains(PARENT_PLACEHOLDER));

    let injected = pages.bind("book:1> } UNION { ?object ?p ?o");
    assert!(matches!(injected, Err(PolicyError::InvalidQuery(_))));
}

#[test]
fn test_object_variable_must_be_selected() {
    let where_only = "SELECT ?s WHERE { ?s <info:fedora/fedora-system:def/relations-external#isMemberOf> ?object }";
    assert!(matches!(
        ChildQuery::new("k", QueryLanguage::Sparql, where_only, "d"),
        Err(PolicyError::InvalidQuery(_))
    ));

    let longer_name = "SELECT ?objects WHERE { ?objects ?p ?o }";
    assert!(ChildQuery::new("k", QueryLanguage::Sparql, longer_name, "d").is_err());

    let lowercase = "select distinct ?object where { ?object ?p ?o }";
    assert!(ChildQuery::new("k", QueryLanguage::Sparql, lowercase, "d").is_ok());
}
