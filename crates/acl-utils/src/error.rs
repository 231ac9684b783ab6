use acl_core::PolicyError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading policies and configuration from disk
#[derive(Error, Debug)]
pub enum Error {
    /// Policy rejected by the core (bad rule, parse error with location, ...)
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// File could not be read
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Malformed YAML
    #[error("YAML parsing failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed JSON
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML
    #[error("TOML parsing failed: {0}")]
    Toml(#[from] toml::de::Error),

    /// Output could not be rendered
    #[error("serialization failed: {0}")]
    Serialize(String),

    /// File extension maps to no known format
    #[error("unsupported policy format '{0}' (expected toml, yaml, yml or json)")]
    UnsupportedFormat(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
