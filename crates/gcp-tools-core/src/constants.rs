//! Shared tables consumed by the provisioning steps and the GitHub secret
//! configuration. Kept in one place so the two sides can never drift.

/// Logical deployment environments, in creation order. One workload identity
/// pool is provisioned per entry.
pub const ENVIRONMENTS: [&str; 4] = ["dev", "test", "sbx", "prod"];

/// Service APIs enabled on the foundation project. Enablement is idempotent
/// on the remote side, so these are applied unconditionally on every run.
pub const REQUIRED_APIS: [&str; 6] = [
    "cloudresourcemanager.googleapis.com",
    "cloudbilling.googleapis.com",
    "iam.googleapis.com",
    "iamcredentials.googleapis.com",
    "sts.googleapis.com",
    "storage.googleapis.com",
];

/// Roles granted to the foundation service account on the foundation project
/// itself.
pub const PROJECT_ROLES: [&str; 2] = ["roles/editor", "roles/resourcemanager.projectIamAdmin"];

/// Roles granted to the foundation service account at the organization scope.
/// These let CI create and wire per-environment application projects.
pub const ORG_ROLES: [&str; 19] = [
    "roles/artifactregistry.admin",
    "roles/billing.user",
    "roles/cloudfunctions.admin",
    "roles/cloudscheduler.admin",
    "roles/compute.networkAdmin",
    "roles/iam.serviceAccountAdmin",
    "roles/iam.serviceAccountUser",
    "roles/iam.workloadIdentityPoolAdmin",
    "roles/logging.admin",
    "roles/monitoring.admin",
    "roles/pubsub.admin",
    "roles/resourcemanager.folderAdmin",
    "roles/resourcemanager.projectCreator",
    "roles/resourcemanager.projectDeleter",
    "roles/resourcemanager.projectIamAdmin",
    "roles/run.admin",
    "roles/secretmanager.admin",
    "roles/serviceusage.serviceUsageAdmin",
    "roles/storage.admin",
];

/// Role granted to the foundation service account on the billing account so
/// new projects can be linked.
pub const BILLING_ROLE: &str = "roles/billing.user";

/// Role that lets a federated principal impersonate the service account.
pub const WORKLOAD_IDENTITY_USER_ROLE: &str = "roles/iam.workloadIdentityUser";

/// Provider id for the GitHub Actions OIDC provider, one per pool.
pub const GITHUB_PROVIDER_ID: &str = "github-actions-provider";

/// Provider id for the interactive developer-login provider (dev pool only).
pub const DEVELOPER_PROVIDER_ID: &str = "developer-identity-provider";

pub const GITHUB_ISSUER_URI: &str = "https://token.actions.githubusercontent.com";
pub const DEVELOPER_ISSUER_URI: &str = "https://accounts.google.com";

/// Suffix of the Terraform state bucket: `{projectId}-terraform-state`.
pub const TERRAFORM_BUCKET_SUFFIX: &str = "terraform-state";

/// Per-environment GitHub Actions secret holding that environment's workload
/// identity provider resource path.
pub const ENV_SECRET_WIF_PROVIDER: &str = "GCP_WIF_PROVIDER";

/// Repository-scoped GitHub Actions variables populated from the
/// provisioning result. Values are resolved in `secrets::repository_values`.
pub const REPO_VARIABLES: [&str; 9] = [
    "GCP_PROJECT_ID",
    "GCP_PROJECT_NUMBER",
    "GCP_SERVICE_ACCOUNT",
    "GCP_REGION",
    "GCP_REGIONS",
    "GCP_ORG_ID",
    "GCP_BILLING_ACCOUNT",
    "GCP_TERRAFORM_STATE_BUCKET",
    "GCP_OWNER_EMAILS",
];
