//! Request and result types for foundation-project provisioning.
//!
//! The request is built once from raw string input (CLI args, env vars, or
//! MCP tool arguments) and passed by value — no process-global configuration.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GcpToolsError, Result};

/// The GitHub identity trusted by each pool's CI provider.
///
/// A specifier containing `/` is an exact repository; one without is a
/// repository owner (organization or user login). The same branch governs
/// both the provider's attribute condition and the principal set used in
/// impersonation grants — they must never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GithubIdentity {
    Repo { owner: String, repo: String },
    Owner(String),
}

impl GithubIdentity {
    pub fn parse(specifier: &str) -> Self {
        match specifier.split_once('/') {
            Some((owner, repo)) => GithubIdentity::Repo {
                owner: owner.to_string(),
                repo: repo.to_string(),
            },
            None => GithubIdentity::Owner(specifier.to_string()),
        }
    }

    /// CEL condition restricting which GitHub workflows the provider accepts.
    pub fn attribute_condition(&self) -> String {
        match self {
            GithubIdentity::Repo { owner, repo } => {
                format!("assertion.repository == '{owner}/{repo}'")
            }
            GithubIdentity::Owner(owner) => {
                format!("assertion.repository_owner == '{owner}'")
            }
        }
    }

    /// Claim mapping applied to the CI provider. Exposes both the repository
    /// and owner attributes so either scoping works.
    pub fn attribute_mapping(&self) -> &'static str {
        "google.subject=assertion.sub,\
         attribute.repository=assertion.repository,\
         attribute.repository_owner=assertion.repository_owner"
    }

    /// Principal set granted impersonation on the service account. Uses the
    /// attribute matching the condition above.
    pub fn principal_set(&self, project_number: &str, pool_id: &str) -> String {
        let base = format!(
            "principalSet://iam.googleapis.com/projects/{project_number}/locations/global/workloadIdentityPools/{pool_id}"
        );
        match self {
            GithubIdentity::Repo { owner, repo } => {
                format!("{base}/attribute.repository/{owner}/{repo}")
            }
            GithubIdentity::Owner(owner) => {
                format!("{base}/attribute.repository_owner/{owner}")
            }
        }
    }

    /// The repository slug, when repo-scoped. Secret configuration requires
    /// this form.
    pub fn repo_slug(&self) -> Option<String> {
        match self {
            GithubIdentity::Repo { owner, repo } => Some(format!("{owner}/{repo}")),
            GithubIdentity::Owner(_) => None,
        }
    }
}

impl fmt::Display for GithubIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GithubIdentity::Repo { owner, repo } => write!(f, "{owner}/{repo}"),
            GithubIdentity::Owner(owner) => write!(f, "{owner}"),
        }
    }
}

/// Validated input for one provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisioningRequest {
    /// Prefix for every derived resource name (`{prefix}-fdn-…`, pools, SA).
    pub project_name: String,
    pub org_id: String,
    pub billing_account: String,
    /// Ordered; the first entry is the default region and hosts the bucket.
    pub regions: Vec<String>,
    pub github_identity: GithubIdentity,
    /// Developer email (or hosted domain) trusted for local impersonation.
    pub developer_identity: String,
    pub owner_emails: Vec<String>,
}

impl ProvisioningRequest {
    /// Build a request from raw string input, collecting **every** missing or
    /// empty field into one validation error before any remote call is made.
    pub fn from_raw(
        project_name: Option<&str>,
        org_id: Option<&str>,
        billing_account: Option<&str>,
        regions: Option<&str>,
        github_identity: Option<&str>,
        developer_identity: Option<&str>,
        owner_emails: Option<&str>,
    ) -> Result<Self> {
        let mut missing = Vec::new();

        fn required(value: Option<&str>, field: &str, missing: &mut Vec<String>) -> String {
            match value.map(str::trim) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => {
                    missing.push(format!("{field} is required"));
                    String::new()
                }
            }
        }

        let project_name = required(project_name, "projectName", &mut missing);
        let org_id = required(org_id, "orgId", &mut missing);
        let billing_account = required(billing_account, "billingAccount", &mut missing);
        let github = required(github_identity, "githubIdentity", &mut missing);
        let developer_identity = required(developer_identity, "developerIdentity", &mut missing);

        let regions = split_list(regions.unwrap_or_default());
        if regions.is_empty() {
            missing.push("regions must contain at least one region".to_string());
        }

        let owner_emails = split_list(owner_emails.unwrap_or_default());
        if owner_emails.is_empty() {
            missing.push("ownerEmails must contain at least one email".to_string());
        }

        if !missing.is_empty() {
            return Err(GcpToolsError::Validation(missing));
        }

        Ok(ProvisioningRequest {
            project_name,
            org_id,
            billing_account,
            regions,
            github_identity: GithubIdentity::parse(&github),
            developer_identity,
            owner_emails,
        })
    }

    /// The default region — first entry of the ordered region list.
    pub fn default_region(&self) -> &str {
        &self.regions[0]
    }

    /// Service-account email derived from the project name and project id.
    pub fn service_account_email(&self, project_id: &str) -> String {
        format!(
            "{}-sa@{}.iam.gserviceaccount.com",
            self.project_name, project_id
        )
    }

    /// Pool id for one environment: `{prefix}-{env}-pool`.
    pub fn pool_id(&self, env: &str) -> String {
        format!("{}-{env}-pool", self.project_name)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Aggregate output of a provisioning run — the sole artifact handed to
/// downstream consumers (GitHub secret configuration, Terraform backends).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningResult {
    pub project_id: String,
    pub project_number: String,
    pub service_account: String,
    /// Environment name → full resource path of that pool's CI provider.
    /// BTreeMap keeps serialization order deterministic.
    pub workload_identity_providers: BTreeMap<String, String>,
    pub terraform_state_bucket: String,
    pub region: String,
    pub regions: Vec<String>,
    pub org_id: String,
    pub billing_account: String,
    pub github_identity: String,
    pub developer_identity: String,
    pub owner_emails: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_collects_every_missing_field() {
        let err = ProvisioningRequest::from_raw(None, Some("123"), None, None, None, None, None)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("projectName"));
        assert!(msg.contains("billingAccount"));
        assert!(msg.contains("regions"));
        assert!(msg.contains("githubIdentity"));
        assert!(msg.contains("developerIdentity"));
        assert!(msg.contains("ownerEmails"));
        assert!(!msg.contains("orgId"));
    }

    #[test]
    fn from_raw_rejects_whitespace_only_fields() {
        let err = ProvisioningRequest::from_raw(
            Some("   "),
            Some("123"),
            Some("XXX"),
            Some("us-central1"),
            Some("my-org"),
            Some("dev@co.com"),
            Some("a@co.com"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("projectName"));
    }

    #[test]
    fn from_raw_splits_and_trims_comma_lists() {
        let req = ProvisioningRequest::from_raw(
            Some("my-app"),
            Some("123"),
            Some("XXX-XXX-XXX"),
            Some(" europe-west1 , us-west1 ,"),
            Some("my-org/my-repo"),
            Some("dev@co.com"),
            Some("a@co.com, b@co.com"),
        )
        .unwrap();
        assert_eq!(req.regions, vec!["europe-west1", "us-west1"]);
        assert_eq!(req.default_region(), "europe-west1");
        assert_eq!(req.owner_emails, vec!["a@co.com", "b@co.com"]);
    }

    #[test]
    fn repo_scoped_identity_condition_and_principal_agree() {
        let id = GithubIdentity::parse("my-org/my-repo");
        assert_eq!(
            id.attribute_condition(),
            "assertion.repository == 'my-org/my-repo'"
        );
        let principal = id.principal_set("987654321", "my-app-dev-pool");
        assert!(principal.ends_with("/attribute.repository/my-org/my-repo"));
        assert!(principal.contains("projects/987654321/locations/global"));
    }

    #[test]
    fn owner_scoped_identity_condition_and_principal_agree() {
        let id = GithubIdentity::parse("my-org");
        assert_eq!(
            id.attribute_condition(),
            "assertion.repository_owner == 'my-org'"
        );
        let principal = id.principal_set("987654321", "my-app-prod-pool");
        assert!(principal.ends_with("/attribute.repository_owner/my-org"));
    }

    #[test]
    fn repo_slug_only_for_repo_scoped() {
        assert_eq!(
            GithubIdentity::parse("o/r").repo_slug(),
            Some("o/r".to_string())
        );
        assert_eq!(GithubIdentity::parse("o").repo_slug(), None);
    }

    #[test]
    fn derived_names_are_deterministic() {
        let req = ProvisioningRequest::from_raw(
            Some("my-app"),
            Some("123"),
            Some("XXX"),
            Some("us-central1"),
            Some("my-org"),
            Some("dev@co.com"),
            Some("a@co.com"),
        )
        .unwrap();
        assert_eq!(
            req.service_account_email("my-app-fdn-1700000000"),
            "my-app-sa@my-app-fdn-1700000000.iam.gserviceaccount.com"
        );
        assert_eq!(req.pool_id("sbx"), "my-app-sbx-pool");
    }

    #[test]
    fn result_serializes_camel_case() {
        let result = ProvisioningResult {
            project_id: "p-fdn-1".into(),
            project_number: "42".into(),
            service_account: "p-sa@p-fdn-1.iam.gserviceaccount.com".into(),
            workload_identity_providers: BTreeMap::new(),
            terraform_state_bucket: "p-fdn-1-terraform-state".into(),
            region: "us-central1".into(),
            regions: vec!["us-central1".into()],
            org_id: "123".into(),
            billing_account: "XXX".into(),
            github_identity: "o/r".into(),
            developer_identity: "dev@co.com".into(),
            owner_emails: vec!["a@co.com".into()],
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["projectId"], "p-fdn-1");
        assert_eq!(value["terraformStateBucket"], "p-fdn-1-terraform-state");
        assert!(value["workloadIdentityProviders"].is_object());
    }
}
