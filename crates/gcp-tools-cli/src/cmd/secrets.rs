use std::io::Read;

use anyhow::Context;
use gcp_tools_core::{preflight, setup_github_secrets, ProvisioningResult, SystemRunner};

use crate::output::print_json;

pub fn run(repo: &str, from: &str, json: bool) -> anyhow::Result<()> {
    let raw = if from == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read provisioning result from stdin")?;
        buf
    } else {
        std::fs::read_to_string(from)
            .with_context(|| format!("failed to read provisioning result from {from}"))?
    };

    let result: ProvisioningResult =
        serde_json::from_str(&raw).context("failed to parse provisioning result")?;

    preflight::require("gh")?;

    let summary = setup_github_secrets(&SystemRunner, repo, &result)
        .context("github secret configuration failed")?;

    if json {
        return print_json(&summary);
    }

    println!("Repository:            {}", summary.repository);
    println!("Environments:          {}", summary.environments.join(", "));
    println!("Environment secrets:   {}", summary.environment_secrets);
    println!("Repository variables:  {}", summary.repository_variables);
    Ok(())
}
