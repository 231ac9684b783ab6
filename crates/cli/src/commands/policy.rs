use acl_core::{evaluate, to_interchange, DecisionEffect, EngineConfig, Policy, Request};
use anyhow::Context;
use clap::Args;
use colored::*;
use std::path::Path;

/// Attribute values of the request to evaluate
#[derive(Args, Debug, Default)]
pub struct RequestArgs {
    /// Requested API method
    #[arg(long)]
    pub method: Option<String>,
    /// Datastream id
    #[arg(long)]
    pub dsid: Option<String>,
    /// Datastream MIME type
    #[arg(long)]
    pub mime: Option<String>,
    /// Requesting user
    #[arg(long)]
    pub user: Option<String>,
    /// Role held by the user (repeatable)
    #[arg(long = "role", value_name = "ROLE")]
    pub roles: Vec<String>,
    /// Object id
    #[arg(long)]
    pub object: Option<String>,
}

impl RequestArgs {
    fn to_request(&self) -> anyhow::Result<Request> {
        let mut request = Request::new().roles_from(&self.roles)?;
        if let Some(method) = &self.method {
            request = request.method(method)?;
        }
        if let Some(dsid) = &self.dsid {
            request = request.dsid(dsid)?;
        }
        if let Some(mime) = &self.mime {
            request = request.mime(mime)?;
        }
        if let Some(user) = &self.user {
            request = request.user(user)?;
        }
        if let Some(object) = &self.object {
            request = request.object(object)?;
        }
        Ok(request)
    }
}

fn load(file_path: &Path, config: &EngineConfig) -> anyhow::Result<Policy> {
    acl_utils::parse_file(file_path, config.empty_lists)
        .with_context(|| format!("Failed to load policy from {}", file_path.display()))
}

/// Problems that leave the policy valid but are probably mistakes
fn warnings(policy: &Policy) -> Vec<String> {
    let mut warnings = Vec::new();

    if policy.is_empty() {
        warnings.push("Policy has no rules; every request is NotApplicable".to_string());
    }

    for (i, rule) in policy.rules().iter().enumerate() {
        if rule.is_unsatisfiable() {
            warnings.push(format!(
                "Rule '{}' can never match (an attribute group only has empty lists)",
                rule.id()
            ));
        }
        if let Some(earlier) = policy.rules()[..i]
            .iter()
            .find(|earlier| earlier.predicates().eq(rule.predicates()))
        {
            warnings.push(format!(
                "Rule '{}' has the same target as rule '{}'",
                rule.id(),
                earlier.id()
            ));
        }
    }

    warnings
}

pub fn check(file_path: &Path, config: &EngineConfig) -> anyhow::Result<()> {
    println!("{} {}", "Checking policy:".bold(), file_path.display());

    let policy = load(file_path, config)?;

    println!("  {} Policy id: {}", "✓".green(), policy.id());
    println!("  {} Combining algorithm: {}", "✓".green(), policy.algorithm());
    println!("  {} Rules: {}", "✓".green(), policy.rules().len());

    let warnings = warnings(&policy);
    for warning in &warnings {
        println!("  {} {}", "⚠".yellow(), warning);
    }

    println!();
    if warnings.is_empty() {
        println!("{} Policy is valid!", "✓".green().bold());
    } else {
        println!(
            "{} Policy is valid with {} warning(s)",
            "⚠".yellow().bold(),
            warnings.len()
        );
    }

    Ok(())
}

pub fn eval(file_path: &Path, args: &RequestArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let policy = load(file_path, config)?;
    let request = args.to_request().context("Invalid request attribute")?;
    let decision = evaluate(&policy, &request);

    let effect = decision.effect.to_string();
    let effect = match decision.effect {
        DecisionEffect::Permit => effect.green().bold(),
        DecisionEffect::Deny => effect.red().bold(),
        DecisionEffect::NotApplicable => effect.yellow().bold(),
    };
    println!("{} {}", "Decision:".bold(), effect);
    if let Some(rule_id) = &decision.matched_rule_id {
        println!("  {} Matched rule: {}", "→".cyan(), rule_id);
    }

    Ok(())
}

pub fn export(file_path: &Path, config: &EngineConfig) -> anyhow::Result<()> {
    let policy = load(file_path, config)?;
    let tree = to_interchange(&policy, &config.dialect);
    println!("{}", serde_json::to_string_pretty(&tree)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use acl_core::{AttributeCategory, CombiningAlgorithm, PolicyBuilder};

    #[test]
    fn test_request_from_args() {
        let args = RequestArgs {
            method: Some("ingest".to_string()),
            user: Some("userb".to_string()),
            roles: vec!["roleb".to_string(), "rolec".to_string()],
            ..RequestArgs::default()
        };
        let request = args.to_request().unwrap();
        assert_eq!(request.get(AttributeCategory::Method).unwrap().as_str(), "ingest");
        assert_eq!(request.roles().len(), 2);
        assert!(request.get(AttributeCategory::DatastreamId).is_none());
    }

    #[test]
    fn test_empty_role_rejected() {
        let args = RequestArgs {
            roles: vec![String::new()],
            ..RequestArgs::default()
        };
        assert!(args.to_request().is_err());
    }

    #[test]
    fn test_warnings() {
        let policy = PolicyBuilder::new("p")
            .algorithm(CombiningAlgorithm::FirstApplicable)
            .rule_with("a", |r| r.deny().users(["alice"]))
            .rule_with("b", |r| r.permit().users(["alice"]))
            .rule_with("c", |r| r.deny().match_nothing(AttributeCategory::Mime))
            .build()
            .unwrap();

        let warnings = warnings(&policy);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("'b'") && warnings[0].contains("'a'"));
        assert!(warnings[1].contains("'c'"));
    }

    #[test]
    fn test_clean_policy_has_no_warnings() {
        let policy = PolicyBuilder::new("p")
            .rule_with("a", |r| r.deny().users(["alice"]))
            .rule_with("b", |r| r.permit())
            .build()
            .unwrap();
        assert!(warnings(&policy).is_empty());
    }
}
