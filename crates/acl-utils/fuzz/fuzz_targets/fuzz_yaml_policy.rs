//! Fuzz target for YamlParser::parse
//!
//! Arbitrary YAML must never panic the parser, and any accepted policy must
//! respect the policy limits.

#![no_main]

use acl_core::{EmptyListMode, PolicyError, MAX_POLICY_ID_LENGTH, MAX_RULES_PER_POLICY};
use acl_utils::{Error, PolicyParser, YamlParser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    for mode in [EmptyListMode::MatchNothing, EmptyListMode::Unconstrained] {
        match YamlParser::new(mode).parse(data) {
            Ok(policy) => {
                assert!(policy.id().len() <= MAX_POLICY_ID_LENGTH);
                assert!(policy.rules().len() <= MAX_RULES_PER_POLICY);
                assert!(policy.validate().is_ok(), "Parsed policy failed validation");
            }
            Err(Error::Yaml(_)) => {}
            Err(Error::Policy(PolicyError::Parse { location, .. })) => {
                assert!(!location.is_empty(), "parse errors must carry a location");
            }
            Err(other) => panic!("unexpected error kind: {:?}", other),
        }
    }
});
