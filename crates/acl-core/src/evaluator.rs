//! Decision evaluation
//!
//! Turns a `Policy` and a `Request` into a `Decision` by applying the
//! policy's combining algorithm over the rules that match, in rule order.
//!
//! Evaluation is a pure function of its inputs. It holds no state between
//! calls, reads no clock and cannot fail: any malformed input was already
//! rejected when the policy or request was built, so there is no error path
//! that could fall through to an accidental Permit.

use crate::policy::{CombiningAlgorithm, Policy};
use crate::request::Request;
use crate::rule::{Effect, Rule};
use alloc::string::{String, ToString};
use core::fmt;
use serde::{Deserialize, Serialize};

/// Final outcome of an evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecisionEffect {
    /// A rule granted access
    Permit,
    /// A rule refused access
    Deny,
    /// No rule applied to the request
    NotApplicable,
}

impl From<Effect> for DecisionEffect {
    fn from(effect: Effect) -> Self {
        match effect {
            Effect::Permit => Self::Permit,
            Effect::Deny => Self::Deny,
        }
    }
}

impl fmt::Display for DecisionEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Permit => "Permit",
            Self::Deny => "Deny",
            Self::NotApplicable => "NotApplicable",
        })
    }
}

/// Result of evaluating a request, returned by value to the caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decision {
    /// Outcome
    pub effect: DecisionEffect,
    /// Id of the rule that decided, if any
    pub matched_rule_id: Option<String>,
}

impl Decision {
    /// Decision for a request no rule applies to
    #[must_use]
    pub const fn not_applicable() -> Self {
        Self {
            effect: DecisionEffect::NotApplicable,
            matched_rule_id: None,
        }
    }

    fn from_rule(rule: &Rule) -> Self {
        Self {
            effect: rule.effect().into(),
            matched_rule_id: Some(rule.id().to_string()),
        }
    }

    /// Whether access was granted
    ///
    /// NotApplicable is not a grant; hosts must not fall back to a permissive
    /// default.
    #[must_use]
    pub const fn is_permit(&self) -> bool {
        matches!(self.effect, DecisionEffect::Permit)
    }
}

/// Evaluate a request against a policy
///
/// ## Example
///
/// ```
/// use acl_core::{evaluate, AttributeCategory, CombiningAlgorithm, DecisionEffect, Effect, Policy, Request, Rule};
///
/// # fn example() -> Result<(), acl_core::PolicyError> {
/// let mut policy = Policy::new("demo", CombiningAlgorithm::FirstApplicable)?;
/// policy.add_rule(
///     Rule::new("no-purge", Effect::Deny)?.constrain(AttributeCategory::Method, ["purgeObject"])?,
/// )?;
///
/// let decision = evaluate(&policy, &Request::new().method("purgeObject")?);
/// assert_eq!(decision.effect, DecisionEffect::Deny);
/// assert_eq!(decision.matched_rule_id.as_deref(), Some("no-purge"));
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn evaluate(policy: &Policy, request: &Request) -> Decision {
    PolicyEvaluator::new(policy).evaluate(request)
}

/// Evaluates requests against one borrowed policy
///
/// Borrowing keeps the policy immutable for as long as the evaluator lives,
/// so concurrent evaluations over a shared `&Policy` need no locking.
#[derive(Debug, Clone, Copy)]
pub struct PolicyEvaluator<'a> {
    policy: &'a Policy,
}

impl<'a> PolicyEvaluator<'a> {
    /// Create an evaluator over a policy
    #[must_use]
    pub const fn new(policy: &'a Policy) -> Self {
        Self { policy }
    }

    /// Decide a request using the policy's combining algorithm
    #[must_use]
    pub fn evaluate(&self, request: &Request) -> Decision {
        let decision = match self.policy.algorithm() {
            CombiningAlgorithm::FirstApplicable => self
                .matching_rules(request)
                .next()
                .map_or_else(Decision::not_applicable, Decision::from_rule),
            CombiningAlgorithm::DenyOverrides => self.overriding(request, Effect::Deny),
            CombiningAlgorithm::PermitOverrides => self.overriding(request, Effect::Permit),
        };

        tracing::trace!(
            policy = self.policy.id(),
            effect = %decision.effect,
            rule = decision.matched_rule_id.as_deref().unwrap_or("-"),
            "request evaluated"
        );
        decision
    }

    /// All rules that match a request, in rule order
    ///
    /// Useful for auditing why a decision came out the way it did.
    pub fn matching_rules<'r>(
        &'r self,
        request: &'r Request,
    ) -> impl Iterator<Item = &'a Rule> + 'r {
        let policy: &'a Policy = self.policy;
        policy
            .rules()
            .iter()
            .filter(move |rule| rule.matches(request))
    }

    /// Number of rules being evaluated
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.policy.rules().len()
    }

    // First matching rule with the winning effect, else first matching rule
    // with the other effect, else NotApplicable.
    fn overriding(&self, request: &Request, winner: Effect) -> Decision {
        let mut fallback: Option<&Rule> = None;
        for rule in self.policy.rules().iter().filter(|rule| rule.matches(request)) {
            if rule.effect() == winner {
                return Decision::from_rule(rule);
            }
            fallback.get_or_insert(rule);
        }
        fallback.map_or_else(Decision::not_applicable, Decision::from_rule)
    }
}

/// Trait for types that can decide access requests
///
/// Hosts depend on this abstraction, so a cached or remote decision point
/// can stand in for `PolicyEvaluator`.
pub trait Evaluator {
    /// Decide a request
    fn evaluate(&self, request: &Request) -> Decision;
}

impl<'a> Evaluator for PolicyEvaluator<'a> {
    fn evaluate(&self, request: &Request) -> Decision {
        PolicyEvaluator::evaluate(self, request)
    }
}

impl Evaluator for Policy {
    fn evaluate(&self, request: &Request) -> Decision {
        evaluate(self, request)
    }
}
