//! Engine configuration loading

use crate::error::{Error, Result};
use acl_core::EngineConfig;
use std::path::Path;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "ACL_CONFIG";

/// Load an `EngineConfig` from a TOML file
///
/// Empty or colliding dialect names are rejected.
pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: EngineConfig = toml::from_str(&text)?;
    config.validate()?;
    tracing::debug!(path = %path.display(), empty_lists = ?config.empty_lists, "configuration loaded");
    Ok(config)
}

/// Load the file named by `ACL_CONFIG`, or the defaults when it is unset
pub fn from_env_or_default() -> Result<EngineConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => load_config(path),
        _ => Ok(EngineConfig::default()),
    }
}
