use acl_core::{ChildQuery, ChildQueryContributor, HookRegistry};
use anyhow::Context;
use colored::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Query file layout:
///
/// ```toml
/// [[contributors]]
/// name = "collection"
///
/// [[contributors.queries]]
/// key = "collection_members"
/// language = "itql"
/// query = "select $object from <#ri> where $object <fedora-rels-ext:isMemberOfCollection> <info:fedora/%PARENT%>"
/// description = "Members of this collection"
/// ```
#[derive(Deserialize)]
struct QueryFile {
    #[serde(default)]
    contributors: Vec<FileContributor>,
}

#[derive(Deserialize)]
struct FileContributor {
    name: String,
    #[serde(default)]
    queries: Vec<ChildQuery>,
}

impl ChildQueryContributor for FileContributor {
    fn name(&self) -> &str {
        &self.name
    }

    fn child_queries(&self) -> Vec<ChildQuery> {
        self.queries.clone()
    }
}

fn load_registry(file_path: &Path) -> anyhow::Result<HookRegistry> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;
    let file: QueryFile = toml::from_str(&content).context("Invalid query file")?;

    let mut registry = HookRegistry::new();
    for contributor in &file.contributors {
        registry
            .register(contributor)
            .with_context(|| format!("Contributor '{}' rejected", contributor.name))?;
    }
    Ok(registry)
}

pub fn check(file_path: &Path) -> anyhow::Result<()> {
    println!("{} {}", "Checking child queries:".bold(), file_path.display());

    let registry = load_registry(file_path)?;
    for contribution in registry.list_contributions() {
        let query = &contribution.query;
        println!(
            "  {} {} [{}] {}: {}",
            "✓".green(),
            query.key().cyan(),
            query.language(),
            contribution.contributor,
            query.description()
        );
    }

    println!();
    println!(
        "{} {} quer{} registered",
        "✓".green().bold(),
        registry.count(),
        if registry.count() == 1 { "y" } else { "ies" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const QUERIES: &str = r#"
[[contributors]]
name = "collection"

[[contributors.queries]]
key = "collection_members"
language = "itql"
query = "select $object from <#ri> where $object <fedora-rels-ext:isMemberOfCollection> <info:fedora/%PARENT%>"
description = "Members of this collection"

[[contributors]]
name = "book"

[[contributors.queries]]
key = "book_pages"
language = "sparql"
query = "SELECT ?object WHERE { ?object <fedora-rels-ext:isMemberOf> <info:fedora/%PARENT%> }"
description = "Pages of this book"
"#;

    fn write(contents: &str) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("queries.toml");
        fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_registry() {
        let (_dir, path) = write(QUERIES);
        let registry = load_registry(&path).unwrap();
        assert_eq!(registry.count(), 2);
        assert_eq!(registry.list_contributions()[1].contributor, "book");
    }

    #[test]
    fn test_duplicate_key_across_contributors() {
        let duplicated = QUERIES.replace("book_pages", "collection_members");
        let (_dir, path) = write(&duplicated);
        let err = load_registry(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("collection_members"), "{:#}", err);
    }

    #[test]
    fn test_query_without_object_variable() {
        let broken = QUERIES.replace("SELECT ?object", "SELECT ?page");
        let broken = broken.replace("{ ?object", "{ ?page");
        let (_dir, path) = write(&broken);
        assert!(load_registry(&path).is_err());
    }
}
