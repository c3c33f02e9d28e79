//! GitHub repository wiring for the provisioning result.
//!
//! Same idempotent-loop shape as the provisioning steps, but against the `gh`
//! CLI: environments are created with an idempotent PUT, and secret/variable
//! writes overwrite in place, so no probes are needed.

use serde::Serialize;

use crate::constants::{ENVIRONMENTS, ENV_SECRET_WIF_PROVIDER, REPO_VARIABLES};
use crate::error::{GcpToolsError, Result};
use crate::exec::{CommandRunner, Executor};
use crate::types::ProvisioningResult;

/// What was written, for operator-facing output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretsSummary {
    pub repository: String,
    pub environments: Vec<String>,
    pub environment_secrets: usize,
    pub repository_variables: usize,
}

/// Configure per-environment secrets and repository-level variables from a
/// provisioning result. The result's GitHub identity must be repo-scoped
/// (`owner/repo`) — secrets have nowhere to live otherwise.
pub fn setup_github_secrets(
    runner: &dyn CommandRunner,
    repo: &str,
    result: &ProvisioningResult,
) -> Result<SecretsSummary> {
    if !repo.contains('/') {
        return Err(GcpToolsError::Validation(vec![format!(
            "repository must be owner/repo form, got `{repo}`"
        )]));
    }

    let exec = Executor::new(runner);
    let mut environment_secrets = 0;

    for env in ENVIRONMENTS {
        ensure_environment(&exec, repo, env)?;

        let provider = result
            .workload_identity_providers
            .get(env)
            .ok_or_else(|| {
                GcpToolsError::Validation(vec![format!(
                    "provisioning result is missing the {env} workload identity provider"
                )])
            })?;
        set_environment_secret(&exec, repo, env, ENV_SECRET_WIF_PROVIDER, provider)?;
        environment_secrets += 1;
    }

    let values = repository_values(result);
    for (name, value) in &values {
        set_repository_variable(&exec, repo, name, value)?;
    }

    tracing::info!(repo, "github repository wiring complete");

    Ok(SecretsSummary {
        repository: repo.to_string(),
        environments: ENVIRONMENTS.iter().map(|e| e.to_string()).collect(),
        environment_secrets,
        repository_variables: values.len(),
    })
}

/// Repository-level variable values, in the order of `REPO_VARIABLES`.
pub fn repository_values(result: &ProvisioningResult) -> Vec<(&'static str, String)> {
    let values = [
        result.project_id.clone(),
        result.project_number.clone(),
        result.service_account.clone(),
        result.region.clone(),
        result.regions.join(","),
        result.org_id.clone(),
        result.billing_account.clone(),
        result.terraform_state_bucket.clone(),
        result.owner_emails.join(","),
    ];
    REPO_VARIABLES.into_iter().zip(values).collect()
}

fn ensure_environment(exec: &Executor<'_>, repo: &str, env: &str) -> Result<()> {
    // PUT creates or updates — idempotent on the GitHub side.
    exec.execute(
        "gh",
        &[
            "api".to_string(),
            "--method".to_string(),
            "PUT".to_string(),
            format!("repos/{repo}/environments/{env}"),
        ],
        &format!("environment creation ({env})"),
    )?;
    Ok(())
}

fn set_environment_secret(
    exec: &Executor<'_>,
    repo: &str,
    env: &str,
    name: &str,
    value: &str,
) -> Result<()> {
    exec.execute(
        "gh",
        &[
            "secret".to_string(),
            "set".to_string(),
            name.to_string(),
            format!("--repo={repo}"),
            format!("--env={env}"),
            format!("--body={value}"),
        ],
        &format!("environment secret ({env}/{name})"),
    )?;
    Ok(())
}

fn set_repository_variable(
    exec: &Executor<'_>,
    repo: &str,
    name: &str,
    value: &str,
) -> Result<()> {
    exec.execute(
        "gh",
        &[
            "variable".to_string(),
            "set".to_string(),
            name.to_string(),
            format!("--repo={repo}"),
            format!("--body={value}"),
        ],
        &format!("repository variable ({name})"),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::mock::MockRunner;
    use std::collections::BTreeMap;

    fn result() -> ProvisioningResult {
        let mut providers = BTreeMap::new();
        for env in ENVIRONMENTS {
            providers.insert(
                env.to_string(),
                format!(
                    "projects/42/locations/global/workloadIdentityPools/my-app-{env}-pool/providers/github-actions-provider"
                ),
            );
        }
        ProvisioningResult {
            project_id: "my-app-fdn-1".into(),
            project_number: "42".into(),
            service_account: "my-app-sa@my-app-fdn-1.iam.gserviceaccount.com".into(),
            workload_identity_providers: providers,
            terraform_state_bucket: "my-app-fdn-1-terraform-state".into(),
            region: "europe-west1".into(),
            regions: vec!["europe-west1".into(), "us-west1".into()],
            org_id: "123".into(),
            billing_account: "XXX-XXX-XXX".into(),
            github_identity: "my-org/my-repo".into(),
            developer_identity: "dev@co.com".into(),
            owner_emails: vec!["a@co.com".into(), "b@co.com".into()],
        }
    }

    #[test]
    fn wires_four_environments_and_nine_variables() {
        let runner = MockRunner::new();
        let summary = setup_github_secrets(&runner, "my-org/my-repo", &result()).unwrap();

        assert_eq!(summary.environments, vec!["dev", "test", "sbx", "prod"]);
        assert_eq!(summary.environment_secrets, 4);
        assert_eq!(summary.repository_variables, 9);

        assert_eq!(runner.count_containing("api --method PUT"), 4);
        assert_eq!(runner.count_containing("secret set GCP_WIF_PROVIDER"), 4);
        assert_eq!(runner.count_containing("variable set"), 9);
    }

    #[test]
    fn environment_secret_carries_that_envs_provider() {
        let runner = MockRunner::new();
        setup_github_secrets(&runner, "my-org/my-repo", &result()).unwrap();
        let calls = runner.recorded();
        let sbx = calls
            .iter()
            .find(|c| c.contains("--env=sbx"))
            .unwrap();
        assert!(sbx.contains("my-app-sbx-pool"));
    }

    #[test]
    fn repository_values_join_lists_with_commas() {
        let values = repository_values(&result());
        let regions = values.iter().find(|(n, _)| *n == "GCP_REGIONS").unwrap();
        assert_eq!(regions.1, "europe-west1,us-west1");
        let owners = values.iter().find(|(n, _)| *n == "GCP_OWNER_EMAILS").unwrap();
        assert_eq!(owners.1, "a@co.com,b@co.com");
    }

    #[test]
    fn owner_only_repo_is_rejected_before_any_call() {
        let runner = MockRunner::new();
        let err = setup_github_secrets(&runner, "my-org", &result()).unwrap_err();
        assert!(matches!(err, GcpToolsError::Validation(_)));
        assert!(runner.recorded().is_empty());
    }

    #[test]
    fn gh_failure_aborts_with_step_label() {
        let runner = MockRunner::new().stub_fail("environments/test", "HTTP 403");
        let err = setup_github_secrets(&runner, "o/r", &result()).unwrap_err();
        assert!(err.to_string().contains("environment creation (test)"));
        // dev completed, test failed, sbx/prod never attempted
        assert_eq!(runner.count_containing("environments/sbx"), 0);
    }
}
