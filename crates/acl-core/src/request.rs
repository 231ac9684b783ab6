//! Access request: the concrete attribute values a decision is made for

use crate::attribute::{AttributeCategory, Literal};
use crate::error::Result;
use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use serde::{Deserialize, Serialize};

/// A single access request
///
/// Holds at most one value per single-valued category (one method per
/// decision) plus the full role set of the requesting user. Values are
/// validated on the way in, so evaluation never sees an empty literal.
///
/// # Example
///
/// ```
/// use acl_core::Request;
///
/// # fn example() -> Result<(), acl_core::PolicyError> {
/// let request = Request::new()
///     .method("getDatastreamDissemination")?
///     .dsid("AboutStacks.pdf")?
///     .user("usera")?
///     .role("rolea")?;
/// assert_eq!(request.roles().len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RequestRaw")]
pub struct Request {
    attributes: BTreeMap<AttributeCategory, Literal>,
    roles: BTreeSet<Literal>,
}

/// Raw request structure for deserialization (internal use only)
#[derive(Deserialize)]
struct RequestRaw {
    #[serde(default)]
    attributes: BTreeMap<AttributeCategory, Literal>,
    #[serde(default)]
    roles: BTreeSet<Literal>,
}

// A role under `attributes` still has to reach the role set.
impl From<RequestRaw> for Request {
    fn from(raw: RequestRaw) -> Self {
        let mut request = Request {
            attributes: BTreeMap::new(),
            roles: raw.roles,
        };
        for (category, literal) in raw.attributes {
            request.insert(category, literal);
        }
        request
    }
}

impl Request {
    /// Create an empty request
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value for a category
    ///
    /// `Role` values are added to the role set; every other category holds a
    /// single value and a second call replaces the first.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidAttribute` if `value` is empty
    pub fn with(mut self, category: AttributeCategory, value: impl Into<String>) -> Result<Self> {
        let literal = Literal::new(value)?;
        self.insert(category, literal);
        Ok(self)
    }

    /// Set an already validated literal
    pub fn insert(&mut self, category: AttributeCategory, literal: Literal) {
        if category.is_multi_valued() {
            self.roles.insert(literal);
        } else {
            self.attributes.insert(category, literal);
        }
    }

    /// Set the requested method
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidAttribute` if `method` is empty
    pub fn method(self, method: impl Into<String>) -> Result<Self> {
        self.with(AttributeCategory::Method, method)
    }

    /// Set the datastream id
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidAttribute` if `dsid` is empty
    pub fn dsid(self, dsid: impl Into<String>) -> Result<Self> {
        self.with(AttributeCategory::DatastreamId, dsid)
    }

    /// Set the datastream MIME type
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidAttribute` if `mime` is empty
    pub fn mime(self, mime: impl Into<String>) -> Result<Self> {
        self.with(AttributeCategory::Mime, mime)
    }

    /// Set the requesting user id
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidAttribute` if `user` is empty
    pub fn user(self, user: impl Into<String>) -> Result<Self> {
        self.with(AttributeCategory::UserId, user)
    }

    /// Add a role held by the requesting user
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidAttribute` if `role` is empty
    pub fn role(self, role: impl Into<String>) -> Result<Self> {
        self.with(AttributeCategory::Role, role)
    }

    /// Add several roles at once
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidAttribute` if any role is empty
    pub fn roles_from<I, S>(mut self, roles: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for role in roles {
            self.roles.insert(Literal::new(role)?);
        }
        Ok(self)
    }

    /// Set the object id
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidAttribute` if `object` is empty
    pub fn object(self, object: impl Into<String>) -> Result<Self> {
        self.with(AttributeCategory::ObjectId, object)
    }

    /// Value supplied for a single-valued category
    #[must_use]
    pub fn get(&self, category: AttributeCategory) -> Option<&Literal> {
        self.attributes.get(&category)
    }

    /// Role set of the requesting user
    #[must_use]
    pub fn roles(&self) -> &BTreeSet<Literal> {
        &self.roles
    }

    /// Iterate the single-valued attributes in category order
    pub fn attributes(&self) -> impl Iterator<Item = (AttributeCategory, &Literal)> {
        self.attributes.iter().map(|(category, literal)| (*category, literal))
    }
}
