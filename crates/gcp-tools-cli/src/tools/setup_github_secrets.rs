use super::{failure, GcpTool};
use gcp_tools_core::{
    preflight, setup_github_secrets, GithubIdentity, ProvisioningResult, SystemRunner,
};

pub struct SetupGithubSecretsTool;

impl GcpTool for SetupGithubSecretsTool {
    fn name(&self) -> &str {
        "setup_github_secrets"
    }

    fn description(&self) -> &str {
        "Configure GitHub environments, per-environment secrets, and \
         repository variables from a provisioning result. Pass the result \
         object returned by setup_foundation_project; add `repo` when the \
         GitHub identity is owner-scoped."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "repo": {
                    "type": "string",
                    "description": "Target repository (owner/repo); defaults to a repo-scoped githubIdentity"
                },
                "projectId": { "type": "string" },
                "projectNumber": { "type": "string" },
                "serviceAccount": { "type": "string" },
                "workloadIdentityProviders": {
                    "type": "object",
                    "description": "Environment name to provider resource path"
                },
                "terraformStateBucket": { "type": "string" },
                "region": { "type": "string" },
                "regions": { "type": "array", "items": { "type": "string" } },
                "orgId": { "type": "string" },
                "billingAccount": { "type": "string" },
                "githubIdentity": { "type": "string" },
                "developerIdentity": { "type": "string" },
                "ownerEmails": { "type": "array", "items": { "type": "string" } }
            },
            "required": [
                "projectId", "projectNumber", "serviceAccount",
                "workloadIdentityProviders", "terraformStateBucket",
                "region", "regions", "orgId", "billingAccount",
                "githubIdentity", "developerIdentity", "ownerEmails"
            ]
        })
    }

    fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, String> {
        let repo_arg = args
            .get("repo")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let result: ProvisioningResult = serde_json::from_value(args)
            .map_err(|e| failure(format!("invalid provisioning result: {e}")))?;

        let repo = repo_arg
            .or_else(|| GithubIdentity::parse(&result.github_identity).repo_slug())
            .ok_or_else(|| {
                failure("githubIdentity is owner-scoped; pass `repo` as owner/repo")
            })?;

        preflight::require("gh").map_err(failure)?;

        let summary = setup_github_secrets(&SystemRunner, &repo, &result).map_err(failure)?;
        serde_json::to_value(&summary).map_err(failure)
    }
}
