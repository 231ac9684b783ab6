//! Editor Policy Example
//!
//! Walks through the life of a policy written by a repository's policy
//! editor:
//!
//! 1. Load the rule-set description the editor produced
//! 2. Evaluate a few access requests
//! 3. Edit the policy and hand it to an XML writer as an interchange tree
//! 4. Collect child queries for batch-applying the policy
//!
//! Run with: cargo run --example editor_policy

use repo_acl::policy::{
    evaluate, to_interchange, ChildQuery, ChildQueryContributor, Dialect, EmptyListMode,
    HookRegistry, QueryLanguage, Request, RuleBuilder, RuleSetDescription,
};

const DESCRIPTION: &str = r#"
PolicyId = "Islandora-Editor-Policy-v1.0"
RuleCombiningAlgId = "urn:oasis:names:tc:xacml:1.0:rule-combining-algorithm:first-applicable"

[[rules]]
id = "denyapi-access-to-datastream-except-to-user-or-role"
effect = "Deny"
methods = ["getDatastreamDissemination"]
dsids = ["AboutStacks.pdf"]
users = ["usera", "userb"]
roles = ["rolea", "roleb"]
mimes = ["image/tiff", "audio/x-wave"]

[[rules]]
id = "denyapi-except-to-user-or-role"
effect = "Deny"
methods = ["ingest", "modifyDatastreamByValue", "purgeObject", "purgeDatastream", "addDatastream"]
dsids = []
mimes = []
users = ["userb", "userc"]
roles = ["roleb", "rolec"]
"#;

struct CollectionModule;

impl ChildQueryContributor for CollectionModule {
    fn name(&self) -> &str {
        "collection"
    }

    fn child_queries(&self) -> Vec<ChildQuery> {
        vec![ChildQuery::new(
            "collection_members",
            QueryLanguage::Itql,
            "select $object from <#ri> where $object <fedora-rels-ext:isMemberOfCollection> <info:fedora/%PARENT%>",
            "All members of this collection",
        )
        .expect("collection query is valid")]
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("debug").init();

    println!("repo-acl - Editor Policy");
    println!("------------------------");
    println!();

    // -------------------------------------------------------------------------
    // Step 1: Load the description
    // -------------------------------------------------------------------------
    // The editor writes empty lists meaning "any value", so read them in
    // the legacy mode.

    let mut policy = RuleSetDescription::from_toml(DESCRIPTION)?
        .into_policy(EmptyListMode::Unconstrained)?;
    println!(
        "Loaded '{}' ({} rules, {})",
        policy.id(),
        policy.rules().len(),
        policy.algorithm()
    );
    println!();

    // -------------------------------------------------------------------------
    // Step 2: Evaluate requests
    // -------------------------------------------------------------------------

    let requests = [
        (
            "usera reads AboutStacks.pdf",
            Request::new()
                .method("getDatastreamDissemination")?
                .dsid("AboutStacks.pdf")?
                .user("usera")?,
        ),
        (
            "userz (no roles) ingests",
            Request::new().method("ingest")?.user("userz")?,
        ),
        (
            "guest with rolec purges",
            Request::new().method("purgeObject")?.user("guest")?.role("rolec")?,
        ),
    ];

    for (label, request) in &requests {
        let decision = evaluate(&policy, request);
        println!(
            "  {:<30} -> {} ({})",
            label,
            decision.effect,
            decision.matched_rule_id.as_deref().unwrap_or("no rule")
        );
    }
    println!();

    // -------------------------------------------------------------------------
    // Step 3: Edit and export
    // -------------------------------------------------------------------------

    policy.add_rule(
        RuleBuilder::new("permit-admin")
            .permit()
            .roles(["administrator"])
            .build()?,
    )?;
    policy.remove_rule("denyapi-access-to-datastream-except-to-user-or-role")?;

    let tree = to_interchange(&policy, &Dialect::default());
    println!("Interchange tree for the XML writer:");
    println!("{}", serde_json::to_string_pretty(&tree)?);
    println!();

    // -------------------------------------------------------------------------
    // Step 4: Child queries
    // -------------------------------------------------------------------------

    let mut registry = HookRegistry::new();
    registry.register(&CollectionModule)?;
    for contribution in registry.list_contributions() {
        println!(
            "  [{}] {}: {}",
            contribution.contributor,
            contribution.query.key(),
            contribution.query.description()
        );
        println!("    bound: {}", contribution.query.bind("islandora:root")?);
    }

    Ok(())
}
