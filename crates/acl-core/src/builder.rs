//! Builder pattern for ergonomic policy construction

use crate::attribute::AttributeCategory;
use crate::error::{PolicyError, Result};
use crate::policy::{CombiningAlgorithm, Policy};
use crate::rule::{Effect, MatchPredicate, Rule};
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Builder for creating `Rule` instances with a fluent API
///
/// Value lists are validated when `build` is called; the first problem is
/// reported.
///
/// # Examples
///
/// ```
/// use acl_core::builder::RuleBuilder;
///
/// # fn example() -> Result<(), acl_core::PolicyError> {
/// let rule = RuleBuilder::new("denyapi-access-to-datastream-except-to-user-or-role")
///     .deny()
///     .methods(["getDatastreamDissemination"])
///     .dsids(["AboutStacks.pdf"])
///     .users(["usera", "userb"])
///     .roles(["rolea", "roleb"])
///     .mimes(["image/tiff", "audio/x-wave"])
///     .build()?;
/// assert_eq!(rule.predicates().count(), 5);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct RuleBuilder {
    id: String,
    effect: Option<Effect>,
    predicates: Vec<(AttributeCategory, PredicateSpec)>,
}

#[derive(Debug)]
enum PredicateSpec {
    Values(Vec<String>),
    Nothing,
}

impl RuleBuilder {
    /// Create a builder for a rule with this id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the effect
    #[must_use]
    pub const fn effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Shorthand for `effect(Effect::Permit)`
    #[must_use]
    pub const fn permit(self) -> Self {
        self.effect(Effect::Permit)
    }

    /// Shorthand for `effect(Effect::Deny)`
    #[must_use]
    pub const fn deny(self) -> Self {
        self.effect(Effect::Deny)
    }

    /// Restrict a category to the given values
    #[must_use]
    pub fn constrain<I, S>(mut self, category: AttributeCategory, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.predicates.push((category, PredicateSpec::Values(values)));
        self
    }

    /// Make a category match nothing
    #[must_use]
    pub fn match_nothing(mut self, category: AttributeCategory) -> Self {
        self.predicates.push((category, PredicateSpec::Nothing));
        self
    }

    /// Restrict requested methods
    #[must_use]
    pub fn methods<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constrain(AttributeCategory::Method, values)
    }

    /// Restrict datastream ids
    #[must_use]
    pub fn dsids<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constrain(AttributeCategory::DatastreamId, values)
    }

    /// Restrict datastream MIME types
    #[must_use]
    pub fn mimes<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constrain(AttributeCategory::Mime, values)
    }

    /// Restrict user ids
    #[must_use]
    pub fn users<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constrain(AttributeCategory::UserId, values)
    }

    /// Restrict roles (matches on any shared role)
    #[must_use]
    pub fn roles<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constrain(AttributeCategory::Role, values)
    }

    /// Restrict object ids
    #[must_use]
    pub fn objects<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constrain(AttributeCategory::ObjectId, values)
    }

    /// Build the `Rule`
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidRule` if the effect is missing, the id is
    /// empty or a value list holds duplicates, and
    /// `PolicyError::InvalidAttribute` for empty values
    pub fn build(self) -> Result<Rule> {
        let effect = self
            .effect
            .ok_or_else(|| PolicyError::InvalidRule("effect is required".to_string()))?;

        let mut rule = Rule::new(self.id, effect)?;
        for (category, spec) in self.predicates {
            let predicate = match spec {
                PredicateSpec::Values(values) => MatchPredicate::any_of(values)?,
                PredicateSpec::Nothing => MatchPredicate::nothing(),
            };
            rule = rule.with_predicate(category, predicate);
        }
        Ok(rule)
    }
}

/// Builder for creating Policy instances with a fluent API
///
/// # Examples
///
/// ```
/// use acl_core::{CombiningAlgorithm, PolicyBuilder};
///
/// let policy = PolicyBuilder::new("Islandora-Editor-Policy-v1.0")
///     .algorithm(CombiningAlgorithm::FirstApplicable)
///     .rule_with("denyapi-except-to-user-or-role", |rule| {
///         rule.deny()
///             .methods(["ingest", "purgeObject"])
///             .users(["userb", "userc"])
///             .roles(["roleb", "rolec"])
///     })
///     .build()
///     .unwrap();
/// assert_eq!(policy.rules().len(), 1);
/// ```
#[derive(Debug)]
pub struct PolicyBuilder {
    id: String,
    algorithm: CombiningAlgorithm,
    rules: Vec<Result<Rule>>,
}

impl PolicyBuilder {
    /// Create a new policy builder (first-applicable by default)
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            algorithm: CombiningAlgorithm::default(),
            rules: Vec::new(),
        }
    }

    /// Set the combining algorithm
    #[must_use]
    pub const fn algorithm(mut self, algorithm: CombiningAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Add a rule using a builder function
    ///
    /// A rule that fails to build makes `build` fail; nothing is dropped
    /// silently.
    #[must_use]
    pub fn rule_with<F>(mut self, id: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(RuleBuilder) -> RuleBuilder,
    {
        self.rules.push(f(RuleBuilder::new(id)).build());
        self
    }

    /// Add a pre-constructed rule
    #[must_use]
    pub fn add_rule(mut self, rule: Rule) -> Self {
        self.rules.push(Ok(rule));
        self
    }

    /// Build the Policy
    ///
    /// # Errors
    ///
    /// Returns the first rule construction error, or any error from
    /// `Policy::new` / `Policy::add_rule`
    pub fn build(self) -> Result<Policy> {
        let mut policy = Policy::new(self.id, self.algorithm)?;
        for rule in self.rules {
            policy.add_rule(rule?)?;
        }
        Ok(policy)
    }
}
