//! Rule-set descriptions: the flat authoring form of a policy
//!
//! Policy editors describe a rule set as a plain record:
//!
//! ```toml
//! PolicyId = "Islandora-Editor-Policy-v1.0"
//! RuleCombiningAlgId = "urn:oasis:names:tc:xacml:1.0:rule-combining-algorithm:first-applicable"
//!
//! [[rules]]
//! id = "denyapi-except-to-user-or-role"
//! effect = "Deny"
//! methods = ["ingest", "purgeObject"]
//! users = ["userb", "userc"]
//! roles = ["roleb", "rolec"]
//! dsids = []
//! ```
//!
//! An absent list always means "unconstrained". What an explicitly empty
//! list (`dsids = []`) means is a configuration choice, see `EmptyListMode`.

use crate::attribute::AttributeCategory;
use crate::error::{PolicyError, Result};
use crate::policy::{CombiningAlgorithm, Policy};
use crate::rule::{MatchPredicate, Rule};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// How an explicitly empty list in a description is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyListMode {
    /// `[]` is a finite empty set and matches nothing
    #[default]
    MatchNothing,
    /// `[]` means "applies to every value", as legacy editor output does
    Unconstrained,
}

/// Authoring form of a whole policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetDescription {
    /// Policy id
    #[serde(rename = "PolicyId")]
    pub policy_id: String,
    /// Combining algorithm, as URN or short name
    #[serde(rename = "RuleCombiningAlgId")]
    pub combining_algorithm: String,
    /// Rules in order
    #[serde(default)]
    pub rules: Vec<RuleDescription>,
}

/// Authoring form of one rule
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDescription {
    pub id: String,
    pub effect: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dsids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<Vec<String>>,
}

impl RuleDescription {
    /// The list given for a category, if any
    #[must_use]
    pub fn values(&self, category: AttributeCategory) -> Option<&Vec<String>> {
        match category {
            AttributeCategory::Method => self.methods.as_ref(),
            AttributeCategory::DatastreamId => self.dsids.as_ref(),
            AttributeCategory::Mime => self.mimes.as_ref(),
            AttributeCategory::UserId => self.users.as_ref(),
            AttributeCategory::Role => self.roles.as_ref(),
            AttributeCategory::ObjectId => self.objects.as_ref(),
        }
    }

    fn slot(&mut self, category: AttributeCategory) -> &mut Option<Vec<String>> {
        match category {
            AttributeCategory::Method => &mut self.methods,
            AttributeCategory::DatastreamId => &mut self.dsids,
            AttributeCategory::Mime => &mut self.mimes,
            AttributeCategory::UserId => &mut self.users,
            AttributeCategory::Role => &mut self.roles,
            AttributeCategory::ObjectId => &mut self.objects,
        }
    }

    fn to_rule(&self, mode: EmptyListMode, location: &str) -> Result<Rule> {
        let effect = self.effect.parse().map_err(|e| at(e, location))?;
        let mut rule = Rule::new(self.id.clone(), effect).map_err(|e| at(e, location))?;

        for category in AttributeCategory::ALL {
            let Some(values) = self.values(category) else {
                continue;
            };
            let predicate = if values.is_empty() && mode == EmptyListMode::Unconstrained {
                MatchPredicate::Unconstrained
            } else {
                MatchPredicate::any_of(values.iter().cloned())
                    .map_err(|e| at(e, &format!("{}.{}", location, category.key())))?
            };
            rule = rule.with_predicate(category, predicate);
        }

        Ok(rule)
    }

    fn from_rule(rule: &Rule) -> Self {
        let mut description = Self {
            id: rule.id().to_string(),
            effect: rule.effect().as_str().to_string(),
            ..Self::default()
        };
        for (category, predicate) in rule.predicates() {
            *description.slot(category) = predicate
                .values()
                .map(|set| set.iter().map(|value| value.as_str().to_string()).collect());
        }
        description
    }
}

impl RuleSetDescription {
    /// Build a validated policy
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::Parse` naming the offending field for an unknown
    /// algorithm or effect, empty or duplicate values and duplicate rule ids
    pub fn into_policy(self, mode: EmptyListMode) -> Result<Policy> {
        let algorithm: CombiningAlgorithm = self
            .combining_algorithm
            .parse()
            .map_err(|e| at(e, "RuleCombiningAlgId"))?;
        let mut policy = Policy::new(self.policy_id, algorithm).map_err(|e| at(e, "PolicyId"))?;

        for (index, description) in self.rules.iter().enumerate() {
            let location = format!("rules[{}]", index);
            let rule = description.to_rule(mode, &location)?;
            policy.add_rule(rule).map_err(|e| at(e, &location))?;
        }

        tracing::debug!(
            policy = policy.id(),
            rules = policy.rules().len(),
            ?mode,
            "rule-set description loaded"
        );
        Ok(policy)
    }

    /// Describe an existing policy
    ///
    /// Unconstrained categories are omitted and explicit empty sets are
    /// written as `[]`, so reading the result back with
    /// `EmptyListMode::MatchNothing` gives an equal policy.
    #[must_use]
    pub fn from_policy(policy: &Policy) -> Self {
        Self {
            policy_id: policy.id().to_string(),
            combining_algorithm: policy.algorithm().urn().to_string(),
            rules: policy.rules().iter().map(RuleDescription::from_rule).collect(),
        }
    }

    /// Parse a description from TOML
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::TomlError` on malformed TOML or missing fields
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize a description to TOML
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::SerializationError` if TOML serialization fails
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| PolicyError::SerializationError(e.to_string()))
    }
}

fn at(err: PolicyError, location: &str) -> PolicyError {
    match err {
        PolicyError::Parse { .. } => err,
        other => PolicyError::parse(location, other.to_string()),
    }
}
