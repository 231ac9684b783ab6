//! Interchange boundary between policies and external document writers/readers
//!
//! A `Node` tree is the hand-off format: an external XML writer renders it
//! verbatim and an external XML reader produces it. This module does no
//! lexing or escaping. Tag and attribute names come from a `Dialect` and
//! are passed through as opaque strings.
//!
//! Tree shape with the default dialect:
//!
//! ```text
//! Policy  PolicyId=..  RuleCombiningAlgId=urn:..:first-applicable
//! └── Rule  RuleId=..  Effect=Deny
//!     ├── Match  AttributeId=methods
//!     │   └── AttributeValue  value=getDatastreamDissemination
//!     └── Match  AttributeId=dsids          (no values: matches nothing)
//! ```
//!
//! Unconstrained categories have no `Match` node. A `Match` node without
//! value children is an explicit empty set, which keeps the two states
//! distinct across a round trip.

use crate::attribute::{AttributeCategory, Literal};
use crate::error::{PolicyError, Result};
use crate::policy::{CombiningAlgorithm, Policy};
use crate::rule::{Effect, MatchPredicate, Rule};
use alloc::collections::BTreeSet;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// One element of an interchange tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Element name
    pub name: String,
    /// Attributes in document order
    #[serde(default)]
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    /// Create an element with no attributes or children
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append an attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Append a child element
    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Value of the first attribute with this name
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Element and attribute names used in interchange trees
///
/// Bit-exact compatibility with a particular XML dialect is the writer's
/// business; this table only decides which names the core emits and expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialect {
    /// Root element
    pub policy: String,
    /// Root attribute carrying the policy id
    pub policy_id: String,
    /// Root attribute carrying the combining-algorithm URN
    pub combining_algorithm: String,
    /// Rule element
    pub rule: String,
    /// Rule attribute carrying the rule id
    pub rule_id: String,
    /// Rule attribute carrying the effect
    pub effect: String,
    /// Predicate element
    pub predicate: String,
    /// Predicate attribute naming the category
    pub category: String,
    /// Value element
    pub value: String,
    /// Value attribute carrying the literal
    pub value_text: String,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            policy: "Policy".to_string(),
            policy_id: "PolicyId".to_string(),
            combining_algorithm: "RuleCombiningAlgId".to_string(),
            rule: "Rule".to_string(),
            rule_id: "RuleId".to_string(),
            effect: "Effect".to_string(),
            predicate: "Match".to_string(),
            category: "AttributeId".to_string(),
            value: "AttributeValue".to_string(),
            value_text: "value".to_string(),
        }
    }
}

impl Dialect {
    /// Check that every name is set and that attributes sharing an element
    /// are distinct
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidDialect` naming the offending field
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("policy", &self.policy),
            ("policy_id", &self.policy_id),
            ("combining_algorithm", &self.combining_algorithm),
            ("rule", &self.rule),
            ("rule_id", &self.rule_id),
            ("effect", &self.effect),
            ("predicate", &self.predicate),
            ("category", &self.category),
            ("value", &self.value),
            ("value_text", &self.value_text),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, name)| name.trim().is_empty()) {
            return Err(PolicyError::InvalidDialect(format!("'{}' is empty", field)));
        }
        if self.policy_id == self.combining_algorithm {
            return Err(PolicyError::InvalidDialect(format!(
                "policy_id and combining_algorithm are both '{}'",
                self.policy_id
            )));
        }
        if self.rule_id == self.effect {
            return Err(PolicyError::InvalidDialect(format!(
                "rule_id and effect are both '{}'",
                self.rule_id
            )));
        }
        Ok(())
    }
}

/// Convert a policy into an interchange tree
#[must_use]
pub fn to_interchange(policy: &Policy, dialect: &Dialect) -> Node {
    let mut root = Node::new(&dialect.policy)
        .with_attr(&dialect.policy_id, policy.id())
        .with_attr(&dialect.combining_algorithm, policy.algorithm().urn());

    for rule in policy.rules() {
        let mut rule_node = Node::new(&dialect.rule)
            .with_attr(&dialect.rule_id, rule.id())
            .with_attr(&dialect.effect, rule.effect().as_str());

        for (category, predicate) in rule.predicates() {
            let mut predicate_node =
                Node::new(&dialect.predicate).with_attr(&dialect.category, category.key());
            for value in predicate.values().into_iter().flatten() {
                predicate_node = predicate_node
                    .with_child(Node::new(&dialect.value).with_attr(&dialect.value_text, value.as_str()));
            }
            rule_node = rule_node.with_child(predicate_node);
        }

        root = root.with_child(rule_node);
    }

    root
}

/// Rebuild a policy from an interchange tree
///
/// Strict: unknown elements, unknown algorithms, effects or categories and
/// missing attributes are all rejected with a location hint, never defaulted.
/// Unrecognised attributes are ignored so readers may keep namespace
/// declarations and the like.
///
/// # Errors
///
/// Returns `PolicyError::Parse` describing the first problem found
pub fn from_interchange(root: &Node, dialect: &Dialect) -> Result<Policy> {
    let location = root.name.clone();
    expect_name(root, &dialect.policy, &location)?;

    let id = required_attr(root, &dialect.policy_id, &location)?;
    let algorithm: CombiningAlgorithm = required_attr(root, &dialect.combining_algorithm, &location)?
        .parse()
        .map_err(|e| reword(e, &location))?;

    let mut policy = Policy::new(id, algorithm).map_err(|e| reword(e, &location))?;

    for (index, child) in root.children.iter().enumerate() {
        let rule_location = format!("{}/{}[{}]", location, child.name, index);
        expect_name(child, &dialect.rule, &rule_location)?;
        let rule = parse_rule(child, dialect, &rule_location)?;
        policy
            .add_rule(rule)
            .map_err(|e| reword(e, &rule_location))?;
    }

    Ok(policy)
}

fn parse_rule(node: &Node, dialect: &Dialect, location: &str) -> Result<Rule> {
    let id = required_attr(node, &dialect.rule_id, location)?;
    let effect: Effect = required_attr(node, &dialect.effect, location)?
        .parse()
        .map_err(|e| reword(e, location))?;

    let mut rule = Rule::new(id, effect).map_err(|e| reword(e, location))?;
    let mut seen = BTreeSet::new();

    for (index, child) in node.children.iter().enumerate() {
        let predicate_location = format!("{}/{}[{}]", location, child.name, index);
        expect_name(child, &dialect.predicate, &predicate_location)?;

        let category = AttributeCategory::from_key(required_attr(
            child,
            &dialect.category,
            &predicate_location,
        )?)
        .map_err(|e| reword(e, &predicate_location))?;

        if !seen.insert(category) {
            return Err(PolicyError::parse(
                predicate_location,
                format!("category '{}' constrained twice", category),
            ));
        }

        let predicate = parse_values(child, dialect, &predicate_location)?;
        rule = rule.with_predicate(category, predicate);
    }

    Ok(rule)
}

fn parse_values(node: &Node, dialect: &Dialect, location: &str) -> Result<MatchPredicate> {
    let mut values = BTreeSet::new();
    for (index, child) in node.children.iter().enumerate() {
        let value_location = format!("{}/{}[{}]", location, child.name, index);
        expect_name(child, &dialect.value, &value_location)?;

        let literal = Literal::new(required_attr(child, &dialect.value_text, &value_location)?)
            .map_err(|e| reword(e, &value_location))?;
        if values.contains(&literal) {
            return Err(PolicyError::parse(
                value_location,
                format!("duplicate value '{}'", literal),
            ));
        }
        values.insert(literal);
    }
    Ok(MatchPredicate::AnyOf(values))
}

fn expect_name(node: &Node, expected: &str, location: &str) -> Result<()> {
    if node.name == expected {
        Ok(())
    } else {
        Err(PolicyError::parse(
            location,
            format!("expected element '{}', found '{}'", expected, node.name),
        ))
    }
}

fn required_attr<'n>(node: &'n Node, name: &str, location: &str) -> Result<&'n str> {
    node.attr(name)
        .ok_or_else(|| PolicyError::parse(location, format!("missing attribute '{}'", name)))
}

// Keep the location: any construction error inside a document becomes a parse error.
fn reword(err: PolicyError, location: &str) -> PolicyError {
    match err {
        PolicyError::Parse { .. } => err,
        other => PolicyError::parse(location, other.to_string()),
    }
}
