//! # Child-query hooks
//!
//! Host modules can contribute named queries that enumerate the "children"
//! of an object (collection members, pages of a book, ...) so a policy can
//! be batch-applied to them. The engine never runs these queries; it
//! validates and stores them, and the host runs them against its own
//! resource index.
//!
//! Queries are written once and bound per object: the host replaces
//! `%PARENT%` (see `PARENT_PLACEHOLDER`) with the object id through
//! `ChildQuery::bind` before running the query.
//!
//! ## Usage Example
//!
//! ```rust
//! use acl_core::hooks::{ChildQuery, ChildQueryContributor, HookRegistry, QueryLanguage};
//!
//! struct CollectionMembers;
//!
//! impl ChildQueryContributor for CollectionMembers {
//!     fn name(&self) -> &str {
//!         "collection"
//!     }
//!
//!     fn child_queries(&self) -> Vec<ChildQuery> {
//!         vec![ChildQuery::new(
//!             "collection_members",
//!             QueryLanguage::Itql,
//!             "select $object from <#ri> where $object <fedora-rels-ext:isMemberOfCollection> <info:fedora/%PARENT%>",
//!             "Members of this collection",
//!         )
//!         .unwrap()]
//!     }
//! }
//!
//! let mut registry = HookRegistry::new();
//! registry.register(&CollectionMembers).unwrap();
//! assert_eq!(registry.count(), 1);
//!
//! let bound = registry.get("collection_members").unwrap().bind("islandora:root").unwrap();
//! assert!(bound.ends_with("<info:fedora/islandora:root>"));
//! ```

use crate::error::{PolicyError, Result};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Marker a query uses where the id of the object being edited goes
pub const PARENT_PLACEHOLDER: &str = "%PARENT%";

/// Query language a child query is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryLanguage {
    /// iTQL (Mulgara/Fedora resource index)
    Itql,
    /// SPARQL
    Sparql,
}

impl QueryLanguage {
    /// Variable the query must project, in this language's syntax
    #[must_use]
    pub const fn object_variable(self) -> &'static str {
        match self {
            Self::Itql => "$object",
            Self::Sparql => "?object",
        }
    }
}

impl fmt::Display for QueryLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Itql => "itql",
            Self::Sparql => "sparql",
        })
    }
}

impl FromStr for QueryLanguage {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "itql" => Ok(Self::Itql),
            "sparql" => Ok(Self::Sparql),
            other => Err(PolicyError::InvalidQuery(format!(
                "unknown query language '{}'",
                other
            ))),
        }
    }
}

/// A validated child-object query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChildQueryRaw")]
pub struct ChildQuery {
    key: String,
    language: QueryLanguage,
    query: String,
    description: String,
}

#[derive(Deserialize)]
struct ChildQueryRaw {
    key: String,
    language: QueryLanguage,
    query: String,
    description: String,
}

impl TryFrom<ChildQueryRaw> for ChildQuery {
    type Error = PolicyError;

    fn try_from(raw: ChildQueryRaw) -> Result<Self> {
        ChildQuery::new(raw.key, raw.language, raw.query, raw.description)
    }
}

impl ChildQuery {
    /// Create a child query
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidQuery` if the key, query or description
    /// is blank, or the query does not project the `object` variable
    pub fn new(
        key: impl Into<String>,
        language: QueryLanguage,
        query: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self> {
        let key = key.into();
        let query = query.into();
        let description = description.into();

        if key.trim().is_empty() {
            return Err(PolicyError::InvalidQuery("query key cannot be empty".to_string()));
        }
        if query.trim().is_empty() {
            return Err(PolicyError::InvalidQuery(format!("{}: query text is empty", key)));
        }
        if description.trim().is_empty() {
            return Err(PolicyError::InvalidQuery(format!("{}: description is empty", key)));
        }
        if !projects(&query, language.object_variable()) {
            return Err(PolicyError::InvalidQuery(format!(
                "{}: {} query must select {}",
                key,
                language,
                language.object_variable()
            )));
        }

        Ok(Self {
            key,
            language,
            query,
            description,
        })
    }

    /// Unique key of this query
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Query language
    #[must_use]
    pub const fn language(&self) -> QueryLanguage {
        self.language
    }

    /// Query text
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Human-readable description for option lists
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Query text with `PARENT_PLACEHOLDER` replaced by `parent`
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidQuery` if `parent` is empty or holds
    /// characters that would escape an IRI (`<`, `>`, `"`, `{`, `}`, `\`,
    /// whitespace)
    pub fn bind(&self, parent: &str) -> Result<String> {
        let unsafe_char = |c: char| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '\\');
        if parent.is_empty() || parent.chars().any(unsafe_char) {
            return Err(PolicyError::InvalidQuery(format!(
                "{}: cannot bind object id '{}'",
                self.key, parent
            )));
        }
        Ok(self.query.replace(PARENT_PLACEHOLDER, parent))
    }
}

// The variable must be a whole token of the select clause, i.e. between
// `select` and the first `from`, `where` or `{`.
fn projects(query: &str, variable: &str) -> bool {
    let lower = query.to_ascii_lowercase();
    let Some(start) = lower.find("select") else {
        return false;
    };
    let clause_start = start + "select".len();
    let rest = &lower[clause_start..];
    let clause_end = ["from", "where", "{"]
        .iter()
        .filter_map(|keyword| rest.find(keyword))
        .min()
        .unwrap_or(rest.len());

    query[clause_start..clause_start + clause_end]
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '(' | ')'))
        .any(|token| token == variable)
}

/// Source of child queries, typically one per host module
pub trait ChildQueryContributor {
    /// Name of the contributing module
    fn name(&self) -> &str;

    /// Queries this module contributes
    ///
    /// Queries are object-independent; use `PARENT_PLACEHOLDER` where the
    /// edited object's id belongs.
    fn child_queries(&self) -> Vec<ChildQuery>;
}

/// A registered query together with the module that contributed it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contribution {
    /// Contributing module
    pub contributor: String,
    /// The query
    pub query: ChildQuery,
}

/// Registry of child-query contributions
///
/// Built once at startup and read thereafter; share it behind an `Arc`
/// once registration is finished. Registration order is kept.
#[derive(Debug, Default)]
pub struct HookRegistry {
    contributions: Vec<Contribution>,
}

impl HookRegistry {
    /// Creates a new empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every query a contributor offers
    ///
    /// Either all queries are stored or none are.
    ///
    /// # Returns
    ///
    /// Number of queries registered
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::DuplicateQuery` if a key is already registered or
    /// appears twice in the contribution
    pub fn register(&mut self, contributor: &dyn ChildQueryContributor) -> Result<usize> {
        let queries = contributor.child_queries();

        for (index, query) in queries.iter().enumerate() {
            if self.get(query.key()).is_some()
                || queries[..index].iter().any(|q| q.key() == query.key())
            {
                return Err(PolicyError::DuplicateQuery(query.key().to_string()));
            }
        }

        let count = queries.len();
        let name = contributor.name();
        self.contributions
            .extend(queries.into_iter().map(|query| Contribution {
                contributor: name.to_string(),
                query,
            }));

        tracing::debug!(contributor = name, queries = count, "child queries registered");
        Ok(count)
    }

    /// Register a single query on behalf of a contributor
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::DuplicateQuery` if the key is already registered
    pub fn register_query(&mut self, contributor: impl Into<String>, query: ChildQuery) -> Result<()> {
        if self.get(query.key()).is_some() {
            return Err(PolicyError::DuplicateQuery(query.key().to_string()));
        }
        self.contributions.push(Contribution {
            contributor: contributor.into(),
            query,
        });
        Ok(())
    }

    /// All contributions in registration order
    #[must_use]
    pub fn list_contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    /// Look a query up by key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ChildQuery> {
        self.contributions
            .iter()
            .map(|contribution| &contribution.query)
            .find(|query| query.key() == key)
    }

    /// Counts the number of registered queries
    #[must_use]
    pub fn count(&self) -> usize {
        self.contributions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    const ITQL: &str = "select $object from <#ri> where $object <fedora-rels-ext:isMemberOf> <info:fedora/%PARENT%>";

    struct Fixed(&'static str, Vec<ChildQuery>);

    impl ChildQueryContributor for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn child_queries(&self) -> Vec<ChildQuery> {
            self.1.clone()
        }
    }

    fn query(key: &str) -> ChildQuery {
        ChildQuery::new(key, QueryLanguage::Itql, ITQL, "members").unwrap()
    }

    #[test]
    fn test_registry_new() {
        let registry = HookRegistry::new();
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_query_must_project_object() {
        let result = ChildQuery::new("k", QueryLanguage::Sparql, ITQL, "d");
        assert!(matches!(result, Err(PolicyError::InvalidQuery(_))));
    }

    #[test]
    fn test_projection_is_checked_in_select_clause() {
        let plural = "select $objects from <#ri> where $objects <fedora-rels-ext:isMemberOf> <info:fedora/a:b>";
        assert!(ChildQuery::new("k", QueryLanguage::Itql, plural, "d").is_err());

        let only_in_where = "select $s from <#ri> where $object <fedora-rels-ext:isMemberOf> $s";
        assert!(ChildQuery::new("k", QueryLanguage::Itql, only_in_where, "d").is_err());

        let sparql = "SELECT DISTINCT ?object ?title WHERE { ?object <dc:title> ?title }";
        assert!(ChildQuery::new("k", QueryLanguage::Sparql, sparql, "d").is_ok());
    }

    #[test]
    fn test_bind_parent() {
        let bound = query("k").bind("islandora:root").unwrap();
        assert!(bound.ends_with("<info:fedora/islandora:root>"));
        assert!(!bound.contains(PARENT_PLACEHOLDER));

        assert!(query("k").bind("").is_err());
        assert!(query("k").bind("a> <b").is_err());
    }

    #[test]
    fn test_blank_fields_rejected() {
        assert!(ChildQuery::new(" ", QueryLanguage::Itql, ITQL, "d").is_err());
        assert!(ChildQuery::new("k", QueryLanguage::Itql, "", "d").is_err());
        assert!(ChildQuery::new("k", QueryLanguage::Itql, ITQL, "").is_err());
    }

    #[test]
    fn test_register_is_all_or_nothing() {
        let mut registry = HookRegistry::new();
        registry.register(&Fixed("a", vec![query("one")])).unwrap();

        let result = registry.register(&Fixed("b", vec![query("two"), query("one")]));
        assert!(matches!(result, Err(PolicyError::DuplicateQuery(_))));
        assert_eq!(registry.count(), 1);
        assert!(registry.get("two").is_none());
    }

    #[test]
    fn test_duplicate_within_contribution() {
        let mut registry = HookRegistry::new();
        let result = registry.register(&Fixed("a", vec![query("x"), query("x")]));
        assert!(result.is_err());
        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_registration_order_kept() {
        let mut registry = HookRegistry::new();
        registry.register(&Fixed("a", vec![query("z"), query("m")])).unwrap();
        registry.register_query("b", query("a")).unwrap();

        let keys: Vec<_> = registry
            .list_contributions()
            .iter()
            .map(|c| c.query.key())
            .collect();
        assert_eq!(keys, ["z", "m", "a"]);
        assert_eq!(registry.list_contributions()[2].contributor, "b");
    }
}
