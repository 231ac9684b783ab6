//! Error types for acl-core

use alloc::string::String;
use core::fmt;

/// Result type alias for policy operations
pub type Result<T> = core::result::Result<T, PolicyError>;

/// Errors that can occur while building, editing or converting policies
///
/// Every variant is a local, recoverable condition. Evaluation itself never
/// produces one of these.
#[derive(Debug)]
pub enum PolicyError {
    /// Malformed attribute literal or unknown attribute category
    InvalidAttribute(String),

    /// Literal exceeds maximum length
    LiteralTooLong {
        /// Maximum allowed length
        max: usize,
        /// Actual literal length
        length: usize,
    },

    /// Invalid rule (bad effect, duplicate predicate values, empty id)
    InvalidRule(String),

    /// A rule with this id already exists in the policy
    DuplicateRuleId(String),

    /// No rule with this id exists in the policy
    RuleNotFound(String),

    /// Policy exceeds maximum allowed rules
    TooManyRules {
        /// Maximum allowed rules
        max: usize,
        /// Attempted number of rules
        attempted: usize,
    },

    /// Policy id exceeds maximum length
    IdTooLong {
        /// Maximum allowed length
        max: usize,
        /// Actual id length
        length: usize,
    },

    /// Malformed interchange document or rule-set description
    Parse {
        /// Path to the offending node, e.g. `Policy/Rule[1]/Match[0]`
        location: String,
        /// What went wrong
        message: String,
    },

    /// Child query rejected at registration
    InvalidQuery(String),

    /// Child query key already registered
    DuplicateQuery(String),

    /// Interchange dialect has empty or colliding names
    InvalidDialect(String),

    /// TOML parsing error
    TomlError(toml::de::Error),

    /// Serialization error
    SerializationError(String),
}

impl PolicyError {
    /// Build a `Parse` error from a location hint and a message
    pub fn parse(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAttribute(msg) => write!(f, "Invalid attribute: {}", msg),
            Self::LiteralTooLong { max, length } => write!(
                f,
                "Attribute literal exceeds maximum {} characters (length: {})",
                max, length
            ),
            Self::InvalidRule(msg) => write!(f, "Invalid policy rule: {}", msg),
            Self::DuplicateRuleId(id) => write!(f, "Duplicate rule id: {}", id),
            Self::RuleNotFound(id) => write!(f, "Rule not found: {}", id),
            Self::TooManyRules { max, attempted } => write!(
                f,
                "Policy exceeds maximum {} rules (attempted: {})",
                max, attempted
            ),
            Self::IdTooLong { max, length } => write!(
                f,
                "Policy id exceeds maximum {} characters (length: {})",
                max, length
            ),
            Self::Parse { location, message } => {
                write!(f, "Parse error at {}: {}", location, message)
            }
            Self::InvalidQuery(msg) => write!(f, "Invalid child query: {}", msg),
            Self::DuplicateQuery(key) => write!(f, "Child query already registered: {}", key),
            Self::InvalidDialect(msg) => write!(f, "Invalid interchange dialect: {}", msg),
            Self::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            Self::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl From<toml::de::Error> for PolicyError {
    fn from(err: toml::de::Error) -> Self {
        Self::TomlError(err)
    }
}

impl core::error::Error for PolicyError {}
