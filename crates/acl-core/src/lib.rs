// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 P47H Team <https://p47h.com>

//! # acl-core
//!
//! Rule-based access-control policy engine for repository objects and
//! datastreams, with no dependency on any document format or host.
//!
//! This crate provides:
//! - An attribute model (method, datastream id, MIME type, user, roles, object)
//! - Rules with per-attribute match predicates and Permit/Deny effects
//! - Policies combining rules under first-applicable, deny-overrides or
//!   permit-overrides
//! - A pure, total evaluator producing Permit / Deny / NotApplicable
//! - A lossless interchange tree for external XML writers and readers
//! - Rule-set descriptions, the flat authoring form used by policy editors
//! - A registry for child-object queries contributed by host modules
//!
//! ## Security
//!
//! - Evaluation never fails; malformed input is rejected at construction.
//! - Strict limits on policy size:
//!   - MAX_RULES_PER_POLICY = 1024
//!   - MAX_LITERAL_LENGTH = 256

#![no_std]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

pub mod attribute;
pub mod builder;
pub mod config;
pub mod description;
pub mod error;
pub mod evaluator;
pub mod hooks;
pub mod interchange;
pub mod policy;
pub mod request;
pub mod rule;

pub use attribute::{AttributeCategory, AttributeValue, Literal, TargetSection};
pub use builder::{PolicyBuilder, RuleBuilder};
pub use config::EngineConfig;
pub use description::{EmptyListMode, RuleDescription, RuleSetDescription};
/// Re-export commonly used types
pub use error::{PolicyError, Result};
pub use evaluator::{evaluate, Decision, DecisionEffect, Evaluator, PolicyEvaluator};
pub use hooks::{
    ChildQuery, ChildQueryContributor, Contribution, HookRegistry, QueryLanguage, PARENT_PLACEHOLDER,
};
pub use interchange::{from_interchange, to_interchange, Dialect, Node};
pub use policy::{CombiningAlgorithm, Policy};
pub use request::Request;
pub use rule::{Effect, MatchPredicate, Rule};

/// Maximum number of rules per policy
pub const MAX_RULES_PER_POLICY: usize = 1024;

/// Maximum length of an attribute literal
pub const MAX_LITERAL_LENGTH: usize = 256;

/// Maximum length of a policy id
pub const MAX_POLICY_ID_LENGTH: usize = 128;
