//! Engine configuration
//!
//! Plain data; loading it from disk or the environment is left to the host
//! (see `acl-utils`).

use crate::description::EmptyListMode;
use crate::error::Result;
use crate::interchange::Dialect;
use serde::{Deserialize, Serialize};

/// Knobs that change how documents are read and written
///
/// ```toml
/// empty_lists = "unconstrained"
///
/// [dialect]
/// predicate = "Target"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Meaning of explicitly empty lists in rule-set descriptions
    pub empty_lists: EmptyListMode,
    /// Names used in interchange trees
    pub dialect: Dialect,
}

impl EngineConfig {
    /// Parse a configuration from TOML; missing keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::TomlError` on malformed input and
    /// `PolicyError::InvalidDialect` if the dialect names collide
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration after loading it by other means
    ///
    /// # Errors
    ///
    /// Returns `PolicyError::InvalidDialect` if the dialect is unusable
    pub fn validate(&self) -> Result<()> {
        self.dialect.validate()
    }
}
