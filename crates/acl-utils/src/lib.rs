//! # acl-utils
//!
//! Std-side helpers for acl-core.
//!
//! This crate provides non-core features:
//! - Rule-set description parsing from TOML, YAML and JSON
//! - Engine configuration loading from a file or the environment

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod parser;

/// Re-export commonly used types
pub use config::{from_env_or_default, load_config, CONFIG_ENV};
pub use error::{Error, Result};
pub use parser::{
    load_description, parse_file, Format, JsonParser, PolicyParser, TomlParser, YamlParser,
};
