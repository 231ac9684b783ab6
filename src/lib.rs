// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 P47H Team <https://p47h.com>

//! # repo-acl
//!
//! Rule-based access control for repository objects and datastreams.
//!
//! This crate provides a unified API over the workspace crates:
//!
//! - **Policy Engine**: attributes, rules, combining algorithms, evaluation,
//!   the interchange tree and the child-query registry
//! - **Utilities**: description parsing from TOML/YAML/JSON and configuration
//!   loading
//!
//! ## Quick Start
//!
//! ```rust
//! use repo_acl::policy::{evaluate, DecisionEffect, PolicyBuilder, Request};
//!
//! let policy = PolicyBuilder::new("Islandora-Editor-Policy-v1.0")
//!     .rule_with("denyapi-except-to-user-or-role", |rule| {
//!         rule.deny()
//!             .methods(["ingest", "purgeObject"])
//!             .users(["userb", "userc"])
//!             .roles(["roleb", "rolec"])
//!     })
//!     .build()
//!     .unwrap();
//!
//! let request = Request::new().method("ingest").unwrap().user("userc").unwrap();
//! assert_eq!(evaluate(&policy, &request).effect, DecisionEffect::Deny);
//! ```
//!
//! ## Architecture
//!
//! - [`policy`] - policy engine (from `acl-core`, `no_std`)
//! - [`utils`] - file and configuration helpers (from `acl-utils`)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Policy engine module.
///
/// Re-exports `acl_core`.
pub mod policy {
    pub use acl_core::*;
}

/// Utilities module.
///
/// Re-exports `acl_utils` for description files and configuration.
pub mod utils {
    pub use acl_utils::*;
}

// Convenience re-exports at root level
pub use acl_core::{evaluate, Decision, DecisionEffect, Policy, Request};
