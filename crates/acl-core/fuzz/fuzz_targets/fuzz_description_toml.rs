//! Fuzz target for RuleSetDescription::from_toml
//!
//! Arbitrary TOML must never panic the loader, and anything it accepts must
//! respect the policy limits and survive a round trip.

#![no_main]

use acl_core::{EmptyListMode, RuleSetDescription};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Ok(description) = RuleSetDescription::from_toml(data) else {
        return;
    };

    for mode in [EmptyListMode::MatchNothing, EmptyListMode::Unconstrained] {
        if let Ok(policy) = description.clone().into_policy(mode) {
            assert!(policy.id().len() <= 128, "Policy id exceeds limit");
            assert!(policy.rules().len() <= 1024, "Rules count exceeds limit");
            assert!(policy.validate().is_ok(), "Loaded policy failed validation");

            let back = RuleSetDescription::from_policy(&policy)
                .into_policy(EmptyListMode::MatchNothing)
                .expect("described policy must load");
            assert_eq!(back, policy);
        }
    }
});
