//! End-to-end tests against the editor's sample rule set

use acl_core::{
    evaluate, AttributeCategory, CombiningAlgorithm, DecisionEffect, EmptyListMode, Policy,
    PolicyBuilder, Request, RuleSetDescription,
};

const SAMPLE: &str = include_str!("fixtures/editor_policy.toml");
const RULE_1: &str = "denyapi-access-to-datastream-except-to-user-or-role";
const RULE_2: &str = "denyapi-except-to-user-or-role";

fn sample(mode: EmptyListMode) -> Policy {
    RuleSetDescription::from_toml(SAMPLE)
        .unwrap()
        .into_policy(mode)
        .unwrap()
}

#[test]
fn test_sample_loads() {
    let policy = sample(EmptyListMode::default());
    assert_eq!(policy.id(), "Islandora-Editor-Policy-v1.0");
    assert_eq!(policy.algorithm(), CombiningAlgorithm::FirstApplicable);
    assert_eq!(policy.rules().len(), 2);
    assert_eq!(policy.rules()[0].id(), RULE_1);
    assert_eq!(
        policy.rules()[1]
            .predicate(AttributeCategory::Method)
            .values()
            .unwrap()
            .len(),
        12
    );
}

#[test]
fn test_datastream_read_by_listed_user_is_denied() {
    let request = Request::new()
        .method("getDatastreamDissemination")
        .unwrap()
        .dsid("AboutStacks.pdf")
        .unwrap()
        .user("usera")
        .unwrap();

    for mode in [EmptyListMode::MatchNothing, EmptyListMode::Unconstrained] {
        let decision = evaluate(&sample(mode), &request);
        assert_eq!(decision.effect, DecisionEffect::Deny);
        assert_eq!(decision.matched_rule_id.as_deref(), Some(RULE_1));
    }
}

#[test]
fn test_datastream_read_by_role_is_denied() {
    let request = Request::new()
        .method("getDatastreamDissemination")
        .unwrap()
        .mime("image/tiff")
        .unwrap()
        .user("nobody")
        .unwrap()
        .roles_from(["roleb", "guest"])
        .unwrap();

    let decision = evaluate(&sample(EmptyListMode::default()), &request);
    assert_eq!(decision.matched_rule_id.as_deref(), Some(RULE_1));
}

#[test]
fn test_unlisted_user_without_roles_is_not_applicable() {
    let request = Request::new().method("ingest").unwrap().user("userz").unwrap();

    for mode in [EmptyListMode::MatchNothing, EmptyListMode::Unconstrained] {
        let decision = evaluate(&sample(mode), &request);
        assert_eq!(decision.effect, DecisionEffect::NotApplicable);
        assert_eq!(decision.matched_rule_id, None);
    }
}

#[test]
fn test_empty_lists_in_legacy_mode_leave_rule_open() {
    let request = Request::new().method("ingest").unwrap().user("userb").unwrap();

    let decision = evaluate(&sample(EmptyListMode::Unconstrained), &request);
    assert_eq!(decision.effect, DecisionEffect::Deny);
    assert_eq!(decision.matched_rule_id.as_deref(), Some(RULE_2));
}

#[test]
fn test_empty_lists_in_strict_mode_close_rule() {
    let policy = sample(EmptyListMode::MatchNothing);
    assert!(policy.rules()[1].is_unsatisfiable());
    assert!(!policy.rules()[0].is_unsatisfiable());

    let request = Request::new().method("ingest").unwrap().user("userb").unwrap();
    assert_eq!(evaluate(&policy, &request).effect, DecisionEffect::NotApplicable);
}

#[test]
fn test_builder_and_description_agree() {
    let built = PolicyBuilder::new("Islandora-Editor-Policy-v1.0")
        .rule_with(RULE_1, |rule| {
            rule.deny()
                .methods(["getDatastreamDissemination"])
                .dsids(["AboutStacks.pdf"])
                .users(["usera", "userb"])
                .roles(["rolea", "roleb"])
                .mimes(["image/tiff", "audio/x-wave"])
        })
        .rule_with(RULE_2, |rule| {
            rule.deny()
                .methods([
                    "ingest",
                    "modifyDatastreamByReference",
                    "modifyDatastreamByValue",
                    "modifyDisseminator",
                    "purgeObject",
                    "purgeDatastream",
                    "purgeDisseminator",
                    "setDatastreamState",
                    "setDisseminatorState",
                    "setDatastreamVersionable",
                    "addDatastream",
                    "addDisseminator",
                ])
                .users(["userb", "userc"])
                .roles(["roleb", "rolec"])
        })
        .build()
        .unwrap();

    assert_eq!(built, sample(EmptyListMode::Unconstrained));
}
