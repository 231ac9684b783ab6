//! Attribute model: the facts an access decision is made over
//!
//! - `AttributeCategory`: closed set of attribute kinds a rule can constrain
//! - `TargetSection`: how categories group together inside a rule
//! - `Literal`: validated, opaque attribute value
//! - `AttributeValue`: a category tagged literal
//!
//! Literals are compared byte-for-byte. Method names, MIME types and
//! principal identifiers are opaque tokens; no case folding or trimming
//! happens here.

use crate::error::{PolicyError, Result};
use crate::MAX_LITERAL_LENGTH;
use alloc::format;
use alloc::string::{String, ToString};
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Kind of attribute a rule predicate or request value refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttributeCategory {
    /// Requested API method (`getDatastreamDissemination`, `ingest`, ...)
    #[serde(rename = "methods")]
    Method,
    /// Datastream identifier
    #[serde(rename = "dsids")]
    DatastreamId,
    /// Datastream MIME type
    #[serde(rename = "mimes")]
    Mime,
    /// Authenticated user id
    #[serde(rename = "users")]
    UserId,
    /// Role held by the requesting user
    #[serde(rename = "roles")]
    Role,
    /// Repository object id
    #[serde(rename = "objects")]
    ObjectId,
}

impl AttributeCategory {
    /// Every category, in canonical order
    pub const ALL: [AttributeCategory; 6] = [
        Self::Method,
        Self::DatastreamId,
        Self::Mime,
        Self::UserId,
        Self::Role,
        Self::ObjectId,
    ];

    /// Stable key used in rule-set descriptions and interchange documents
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Method => "methods",
            Self::DatastreamId => "dsids",
            Self::Mime => "mimes",
            Self::UserId => "users",
            Self::Role => "roles",
            Self::ObjectId => "objects",
        }
    }

    /// Look a category up by its stable key
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidAttribute` for unknown keys
    pub fn from_key(key: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.key() == key)
            .ok_or_else(|| PolicyError::InvalidAttribute(format!("unknown category '{}'", key)))
    }

    /// Section this category is combined in when a rule is matched
    #[must_use]
    pub const fn section(self) -> TargetSection {
        match self {
            Self::Method => TargetSection::Action,
            Self::DatastreamId | Self::Mime => TargetSection::Datastream,
            Self::UserId | Self::Role => TargetSection::Subject,
            Self::ObjectId => TargetSection::Object,
        }
    }

    /// Whether a request may carry several values of this category
    #[must_use]
    pub const fn is_multi_valued(self) -> bool {
        matches!(self, Self::Role)
    }
}

impl fmt::Display for AttributeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for AttributeCategory {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_key(s)
    }
}

/// Group of categories that are OR-combined inside a single rule
///
/// A rule naming both users and roles applies to a request whose user is
/// listed *or* whose roles intersect the listed roles. Sections themselves
/// are AND-combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetSection {
    /// Requested method
    Action,
    /// Datastream id and MIME type
    Datastream,
    /// User id and roles
    Subject,
    /// Object id
    Object,
}

impl TargetSection {
    /// Every section, in evaluation order
    pub const ALL: [TargetSection; 4] = [
        Self::Action,
        Self::Datastream,
        Self::Subject,
        Self::Object,
    ];
}

/// A validated, non-empty attribute value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Literal(String);

impl Literal {
    /// Create a literal
    ///
    /// # Errors
    ///
    /// - `PolicyError::InvalidAttribute` if `value` is empty
    /// - `PolicyError::LiteralTooLong` if it exceeds `MAX_LITERAL_LENGTH`
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(PolicyError::InvalidAttribute(
                "attribute value cannot be empty".to_string(),
            ));
        }
        if value.len() > MAX_LITERAL_LENGTH {
            return Err(PolicyError::LiteralTooLong {
                max: MAX_LITERAL_LENGTH,
                length: value.len(),
            });
        }
        Ok(Self(value))
    }

    /// Borrow the underlying string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Literal {
    type Error = PolicyError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Literal {
    type Error = PolicyError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Literal> for String {
    fn from(literal: Literal) -> Self {
        literal.0
    }
}

impl AsRef<str> for Literal {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One fact about a request: a category plus its literal value
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttributeValue {
    /// Attribute category
    pub category: AttributeCategory,
    /// Literal value
    pub literal: Literal,
}

impl AttributeValue {
    /// Create an attribute value, rejecting empty strings
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidAttribute` if `value` is empty
    pub fn new(category: AttributeCategory, value: impl Into<String>) -> Result<Self> {
        Ok(Self {
            category,
            literal: Literal::new(value)?,
        })
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.category, self.literal)
    }
}
