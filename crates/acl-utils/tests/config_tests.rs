//! Integration tests for configuration loading

use acl_core::{EmptyListMode, EngineConfig, PolicyError};
use acl_utils::{from_env_or_default, load_config, Error, CONFIG_ENV};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("acl.toml");
    fs::write(
        &path,
        "empty_lists = \"unconstrained\"\n\n[dialect]\npolicy = \"xacml:Policy\"\n",
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.empty_lists, EmptyListMode::Unconstrained);
    assert_eq!(config.dialect.policy, "xacml:Policy");
    assert_eq!(config.dialect.rule, "Rule");
}

#[test]
fn test_bad_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("acl.toml");
    fs::write(&path, "empty_lists = \"sometimes\"\n").unwrap();
    assert!(matches!(load_config(&path), Err(Error::Toml(_))));
    assert!(matches!(
        load_config(dir.path().join("missing.toml")),
        Err(Error::Io { .. })
    ));
}

#[test]
fn test_colliding_dialect_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("acl.toml");
    fs::write(
        &path,
        "[dialect]\npolicy_id = \"Id\"\ncombining_algorithm = \"Id\"\n",
    )
    .unwrap();
    assert!(matches!(
        load_config(&path),
        Err(Error::Policy(PolicyError::InvalidDialect(_)))
    ));
}

// Only test touching the process environment.
#[test]
fn test_env_lookup() {
    std::env::remove_var(CONFIG_ENV);
    assert_eq!(from_env_or_default().unwrap(), EngineConfig::default());

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("acl.toml");
    fs::write(&path, "empty_lists = \"unconstrained\"\n").unwrap();
    std::env::set_var(CONFIG_ENV, &path);
    let config = from_env_or_default();
    std::env::remove_var(CONFIG_ENV);

    assert_eq!(config.unwrap().empty_lists, EmptyListMode::Unconstrained);
}
