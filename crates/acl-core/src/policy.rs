//! Policy definitions and validation logic
//!
//! A `Policy` is an ordered list of rules plus the algorithm used to combine
//! their effects. Rule order is part of the authoring contract: under
//! first-applicable the earliest matching rule wins.
//!
//! ## Invariants
//!
//! Enforced on construction, on every mutation and on deserialization:
//! - rule ids are unique within the policy
//! - the policy id is non-empty and at most `MAX_POLICY_ID_LENGTH` bytes
//! - at most `MAX_RULES_PER_POLICY` rules

use crate::error::{PolicyError, Result};
use crate::rule::Rule;
use crate::{MAX_POLICY_ID_LENGTH, MAX_RULES_PER_POLICY};
use alloc::collections::BTreeSet;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

const URN_PREFIX: &str = "urn:oasis:names:tc:xacml:1.0:rule-combining-algorithm:";

/// How the effects of several matching rules are resolved into one decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CombiningAlgorithm {
    /// The first matching rule in order decides
    #[default]
    FirstApplicable,
    /// Any matching Deny wins over any matching Permit
    DenyOverrides,
    /// Any matching Permit wins over any matching Deny
    PermitOverrides,
}

impl CombiningAlgorithm {
    /// Short identifier (`first-applicable`, ...)
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::FirstApplicable => "first-applicable",
            Self::DenyOverrides => "deny-overrides",
            Self::PermitOverrides => "permit-overrides",
        }
    }

    /// Full OASIS rule-combining-algorithm URN
    #[must_use]
    pub const fn urn(self) -> &'static str {
        match self {
            Self::FirstApplicable => {
                "urn:oasis:names:tc:xacml:1.0:rule-combining-algorithm:first-applicable"
            }
            Self::DenyOverrides => {
                "urn:oasis:names:tc:xacml:1.0:rule-combining-algorithm:deny-overrides"
            }
            Self::PermitOverrides => {
                "urn:oasis:names:tc:xacml:1.0:rule-combining-algorithm:permit-overrides"
            }
        }
    }
}

impl fmt::Display for CombiningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for CombiningAlgorithm {
    type Err = PolicyError;

    /// Accepts either the URN or the short identifier. Anything else is
    /// rejected rather than defaulted.
    fn from_str(s: &str) -> Result<Self> {
        let short = s.strip_prefix(URN_PREFIX).unwrap_or(s);
        match short {
            "first-applicable" => Ok(Self::FirstApplicable),
            "deny-overrides" => Ok(Self::DenyOverrides),
            "permit-overrides" => Ok(Self::PermitOverrides),
            _ => Err(PolicyError::InvalidRule(format!(
                "unknown rule-combining algorithm '{}'",
                s
            ))),
        }
    }
}

/// An ordered rule set with a combining algorithm
///
/// # Security
///
/// Fields are private so the invariants above cannot be bypassed. The
/// `#[serde(try_from)]` attribute routes every deserialized policy through
/// the same validation as `Policy::new` + `add_rule`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicyRaw")]
pub struct Policy {
    /// Policy identifier
    id: String,

    /// Rule-combining algorithm
    algorithm: CombiningAlgorithm,

    /// Rules in authoring order
    rules: Vec<Rule>,
}

/// Raw policy structure for deserialization (internal use only)
#[derive(Debug, Clone, Deserialize)]
struct PolicyRaw {
    id: String,
    #[serde(default)]
    algorithm: CombiningAlgorithm,
    #[serde(default)]
    rules: Vec<Rule>,
}

impl TryFrom<PolicyRaw> for Policy {
    type Error = PolicyError;

    fn try_from(raw: PolicyRaw) -> Result<Self> {
        if raw.rules.len() > MAX_RULES_PER_POLICY {
            return Err(PolicyError::TooManyRules {
                max: MAX_RULES_PER_POLICY,
                attempted: raw.rules.len(),
            });
        }

        let mut policy = Policy::new(raw.id, raw.algorithm)?;
        for rule in raw.rules {
            policy.add_rule(rule)?;
        }
        Ok(policy)
    }
}

impl Policy {
    // ===== Constructors =====

    /// Create an empty policy
    ///
    /// An empty policy is legal and answers NotApplicable to every request.
    ///
    /// # Errors
    ///
    /// - `PolicyError::InvalidRule` if `id` is empty
    /// - `PolicyError::IdTooLong` if `id` exceeds `MAX_POLICY_ID_LENGTH`
    pub fn new(id: impl Into<String>, algorithm: CombiningAlgorithm) -> Result<Self> {
        let id = id.into();
        check_policy_id(&id)?;
        Ok(Self {
            id,
            algorithm,
            rules: Vec::new(),
        })
    }

    // ===== Accessors =====

    /// Policy id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Rule-combining algorithm
    #[must_use]
    pub const fn algorithm(&self) -> CombiningAlgorithm {
        self.algorithm
    }

    /// Rules in order
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Look a rule up by id
    #[must_use]
    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id() == id)
    }

    /// Whether the policy has no rules
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    // ===== Mutation =====

    /// Switch the rule-combining algorithm
    pub fn set_algorithm(&mut self, algorithm: CombiningAlgorithm) {
        self.algorithm = algorithm;
    }

    /// Append a rule after all existing rules
    ///
    /// # Errors
    ///
    /// - `PolicyError::DuplicateRuleId` if a rule with the same id exists
    /// - `PolicyError::TooManyRules` if the policy is full
    pub fn add_rule(&mut self, rule: Rule) -> Result<()> {
        if self.rule(rule.id()).is_some() {
            return Err(PolicyError::DuplicateRuleId(rule.id().to_string()));
        }

        if self.rules.len() >= MAX_RULES_PER_POLICY {
            return Err(PolicyError::TooManyRules {
                max: MAX_RULES_PER_POLICY,
                attempted: self.rules.len() + 1,
            });
        }

        tracing::trace!(policy = %self.id, rule = rule.id(), "rule added");
        self.rules.push(rule);
        Ok(())
    }

    /// Remove a rule by id, returning it
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::RuleNotFound` if no rule has this id
    pub fn remove_rule(&mut self, id: &str) -> Result<Rule> {
        let index = self.position(id)?;
        tracing::trace!(policy = %self.id, rule = id, "rule removed");
        Ok(self.rules.remove(index))
    }

    /// Replace the rule with the same id, keeping its position
    ///
    /// Returns the previous rule.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::RuleNotFound` if no rule has this id
    pub fn replace_rule(&mut self, rule: Rule) -> Result<Rule> {
        let index = self.position(rule.id())?;
        tracing::trace!(policy = %self.id, rule = rule.id(), "rule replaced");
        Ok(core::mem::replace(&mut self.rules[index], rule))
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.rules
            .iter()
            .position(|rule| rule.id() == id)
            .ok_or_else(|| PolicyError::RuleNotFound(id.to_string()))
    }

    // ===== Validation =====

    /// Re-check every invariant
    ///
    /// Mutation already enforces these; this is for callers that received a
    /// policy from elsewhere and want an explicit check.
    ///
    /// # Errors
    ///
    /// - `PolicyError::InvalidRule` / `IdTooLong` for a bad policy id
    /// - `PolicyError::DuplicateRuleId` if two rules share an id
    /// - `PolicyError::TooManyRules` if the rule limit is exceeded
    pub fn validate(&self) -> Result<()> {
        check_policy_id(&self.id)?;

        if self.rules.len() > MAX_RULES_PER_POLICY {
            return Err(PolicyError::TooManyRules {
                max: MAX_RULES_PER_POLICY,
                attempted: self.rules.len(),
            });
        }

        let mut seen = BTreeSet::new();
        for rule in &self.rules {
            if !seen.insert(rule.id()) {
                return Err(PolicyError::DuplicateRuleId(rule.id().to_string()));
            }
        }

        Ok(())
    }

    /// Load a policy from its native TOML form
    ///
    /// # Errors
    ///
    /// Returns an error if TOML parsing or validation fails
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let policy: Self = toml::from_str(toml_str)?;
        Ok(policy)
    }

    /// Serialize the policy to its native TOML form
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::SerializationError` if TOML serialization fails
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| PolicyError::SerializationError(e.to_string()))
    }
}

fn check_policy_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(PolicyError::InvalidRule(
            "Policy id cannot be empty".to_string(),
        ));
    }

    if id.len() > MAX_POLICY_ID_LENGTH {
        return Err(PolicyError::IdTooLong {
            max: MAX_POLICY_ID_LENGTH,
            length: id.len(),
        });
    }

    Ok(())
}
