//! Rules and their per-attribute match predicates

use crate::attribute::{AttributeCategory, Literal, TargetSection};
use crate::error::{PolicyError, Result};
use crate::request::Request;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Outcome a rule asserts when it matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Access is granted
    Permit,
    /// Access is refused
    Deny,
}

impl Effect {
    /// Canonical name as written in policy documents
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Permit => "Permit",
            Self::Deny => "Deny",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Effect {
    type Err = PolicyError;

    /// Accepts exactly `Permit` or `Deny`
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Permit" => Ok(Self::Permit),
            "Deny" => Ok(Self::Deny),
            other => Err(PolicyError::InvalidRule(format!(
                "effect must be Permit or Deny, got '{}'",
                other
            ))),
        }
    }
}

/// Constraint a rule places on one attribute category
///
/// `Unconstrained` and `AnyOf` of an empty set are different states: the
/// first matches every value, the second matches none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MatchPredicateRaw")]
pub enum MatchPredicate {
    /// Matches any value, including a missing one
    Unconstrained,
    /// Matches when the request value is one of these literals
    AnyOf(BTreeSet<Literal>),
}

static UNCONSTRAINED: MatchPredicate = MatchPredicate::Unconstrained;

/// Raw predicate for deserialization (internal use only)
#[derive(Deserialize)]
enum MatchPredicateRaw {
    Unconstrained,
    AnyOf(Vec<Literal>),
}

impl TryFrom<MatchPredicateRaw> for MatchPredicate {
    type Error = PolicyError;

    fn try_from(raw: MatchPredicateRaw) -> Result<Self> {
        match raw {
            MatchPredicateRaw::Unconstrained => Ok(Self::Unconstrained),
            MatchPredicateRaw::AnyOf(values) => Self::any_of(values.into_iter().map(String::from)),
        }
    }
}

impl MatchPredicate {
    /// Build a finite predicate from literal values
    ///
    /// # Errors
    ///
    /// - `PolicyError::InvalidAttribute` if a value is empty
    /// - `PolicyError::InvalidRule` if a value is listed twice
    pub fn any_of<I, S>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for value in values {
            let literal = Literal::new(value)?;
            if set.contains(&literal) {
                return Err(PolicyError::InvalidRule(format!(
                    "duplicate predicate value '{}'",
                    literal
                )));
            }
            set.insert(literal);
        }
        Ok(Self::AnyOf(set))
    }

    /// A predicate that matches nothing
    #[must_use]
    pub const fn nothing() -> Self {
        Self::AnyOf(BTreeSet::new())
    }

    /// Whether this predicate restricts the category at all
    #[must_use]
    pub const fn is_constrained(&self) -> bool {
        matches!(self, Self::AnyOf(_))
    }

    /// Whether this predicate can never accept a value
    #[must_use]
    pub fn is_empty_set(&self) -> bool {
        matches!(self, Self::AnyOf(set) if set.is_empty())
    }

    /// Literal values of a finite predicate
    #[must_use]
    pub fn values(&self) -> Option<&BTreeSet<Literal>> {
        match self {
            Self::Unconstrained => None,
            Self::AnyOf(set) => Some(set),
        }
    }

    /// Check a single request value
    #[must_use]
    pub fn accepts(&self, value: &Literal) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::AnyOf(set) => set.contains(value),
        }
    }

    /// Check a multi-valued request attribute: passes on non-empty intersection
    #[must_use]
    pub fn accepts_any(&self, values: &BTreeSet<Literal>) -> bool {
        match self {
            Self::Unconstrained => true,
            Self::AnyOf(set) => !set.is_disjoint(values),
        }
    }
}

/// A single access-control rule
///
/// Fields are private: a rule is immutable once built and is replaced
/// wholesale when a policy is edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RuleRaw")]
pub struct Rule {
    id: String,
    effect: Effect,
    // only constrained predicates are stored
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    predicates: BTreeMap<AttributeCategory, MatchPredicate>,
}

#[derive(Debug, Clone, Deserialize)]
struct RuleRaw {
    id: String,
    effect: Effect,
    #[serde(default)]
    predicates: BTreeMap<AttributeCategory, MatchPredicate>,
}

impl TryFrom<RuleRaw> for Rule {
    type Error = PolicyError;

    fn try_from(raw: RuleRaw) -> Result<Self> {
        let mut rule = Rule::new(raw.id, raw.effect)?;
        rule.predicates = raw
            .predicates
            .into_iter()
            .filter(|(_, predicate)| predicate.is_constrained())
            .collect();
        Ok(rule)
    }
}

impl Rule {
    /// Create a rule with no predicates (matches every request)
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidRule` if `id` is empty
    pub fn new(id: impl Into<String>, effect: Effect) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(PolicyError::InvalidRule(
                "rule id cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            id,
            effect,
            predicates: BTreeMap::new(),
        })
    }

    /// Set the predicate for a category, replacing any previous one
    #[must_use]
    pub fn with_predicate(mut self, category: AttributeCategory, predicate: MatchPredicate) -> Self {
        if predicate.is_constrained() {
            self.predicates.insert(category, predicate);
        } else {
            self.predicates.remove(&category);
        }
        self
    }

    /// Restrict a category to the given values
    ///
    /// # Errors
    ///
    /// See [`MatchPredicate::any_of`]
    pub fn constrain<I, S>(self, category: AttributeCategory, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(self.with_predicate(category, MatchPredicate::any_of(values)?))
    }

    /// Rule id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Rule effect
    #[must_use]
    pub const fn effect(&self) -> Effect {
        self.effect
    }

    /// Predicate for a category (`Unconstrained` when none was set)
    #[must_use]
    pub fn predicate(&self, category: AttributeCategory) -> &MatchPredicate {
        self.predicates.get(&category).unwrap_or(&UNCONSTRAINED)
    }

    /// Constrained predicates in category order
    pub fn predicates(&self) -> impl Iterator<Item = (AttributeCategory, &MatchPredicate)> {
        self.predicates
            .iter()
            .map(|(category, predicate)| (*category, predicate))
    }

    /// Check whether this rule applies to a request
    ///
    /// Within a target section the constrained predicates are OR-ed (a user
    /// listed in `users` *or* holding a role from `roles`); a section with no
    /// constrained predicate passes. All sections must pass.
    #[must_use]
    pub fn matches(&self, request: &Request) -> bool {
        TargetSection::ALL
            .into_iter()
            .all(|section| self.section_matches(section, request))
    }

    /// Whether some section is constrained only by empty sets
    ///
    /// Such a rule can never apply, whatever the request.
    #[must_use]
    pub fn is_unsatisfiable(&self) -> bool {
        TargetSection::ALL.into_iter().any(|section| {
            let mut constrained = self.constrained_in(section).peekable();
            constrained.peek().is_some() && constrained.all(|(_, predicate)| predicate.is_empty_set())
        })
    }

    fn constrained_in(
        &self,
        section: TargetSection,
    ) -> impl Iterator<Item = (AttributeCategory, &MatchPredicate)> {
        self.predicates()
            .filter(move |(category, _)| category.section() == section)
    }

    fn section_matches(&self, section: TargetSection, request: &Request) -> bool {
        let mut constrained = self.constrained_in(section).peekable();
        if constrained.peek().is_none() {
            return true;
        }
        constrained.any(|(category, predicate)| {
            if category.is_multi_valued() {
                predicate.accepts_any(request.roles())
            } else {
                request
                    .get(category)
                    .is_some_and(|value| predicate.accepts(value))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn request() -> Request {
        Request::new()
    }

    #[test]
    fn test_effect_parse() {
        assert_eq!("Permit".parse::<Effect>().unwrap(), Effect::Permit);
        assert_eq!("Deny".parse::<Effect>().unwrap(), Effect::Deny);
        assert!(matches!("deny".parse::<Effect>(), Err(PolicyError::InvalidRule(_))));
        assert!("Allow".parse::<Effect>().is_err());
    }

    #[test]
    fn test_duplicate_values_rejected() {
        let result = MatchPredicate::any_of(["a", "b", "a"]);
        assert!(matches!(result, Err(PolicyError::InvalidRule(_))));
    }

    #[test]
    fn test_empty_rule_id_rejected() {
        assert!(Rule::new("", Effect::Deny).is_err());
    }

    #[test]
    fn test_rule_without_predicates_matches_everything() {
        let rule = Rule::new("r", Effect::Permit).unwrap();
        assert!(rule.matches(&request()));
        assert!(rule.matches(&request().method("ingest").unwrap()));
    }

    #[test]
    fn test_missing_request_value_fails_constrained_category() {
        let rule = Rule::new("r", Effect::Deny)
            .unwrap()
            .constrain(AttributeCategory::Method, ["ingest"])
            .unwrap();
        assert!(!rule.matches(&request()));
        assert!(rule.matches(&request().method("ingest").unwrap()));
    }

    #[test]
    fn test_unconstrained_predicate_is_not_stored() {
        let rule = Rule::new("r", Effect::Deny)
            .unwrap()
            .constrain(AttributeCategory::Method, ["ingest"])
            .unwrap()
            .with_predicate(AttributeCategory::Method, MatchPredicate::Unconstrained);
        assert_eq!(rule.predicates().count(), 0);
        assert_eq!(
            rule.predicate(AttributeCategory::Method),
            &MatchPredicate::Unconstrained
        );
    }

    #[test]
    fn test_unsatisfiable_detection() {
        let rule = Rule::new("r", Effect::Deny)
            .unwrap()
            .with_predicate(AttributeCategory::DatastreamId, MatchPredicate::nothing());
        assert!(rule.is_unsatisfiable());

        let rule = rule.constrain(AttributeCategory::Mime, ["image/tiff"]).unwrap();
        assert!(!rule.is_unsatisfiable());
    }

    #[test]
    fn test_predicates_iterate_in_category_order() {
        let rule = Rule::new("r", Effect::Deny)
            .unwrap()
            .constrain(AttributeCategory::Role, ["rolea"])
            .unwrap()
            .constrain(AttributeCategory::Method, ["ingest"])
            .unwrap();
        let categories: Vec<_> = rule.predicates().map(|(c, _)| c).collect();
        assert_eq!(categories, [AttributeCategory::Method, AttributeCategory::Role]);
    }
}
