//! The ordered provisioning stages.
//!
//! Each stage follows the same shape: probe remote state, skip with an info
//! log when the resource already exists, otherwise run the creation command
//! through the fail-fast executor. Stages whose remote call is naturally
//! idempotent (API enablement, IAM bindings) skip the probe and apply
//! unconditionally.

use std::collections::BTreeMap;

use chrono::Utc;

use crate::constants::{
    BILLING_ROLE, DEVELOPER_ISSUER_URI, DEVELOPER_PROVIDER_ID, ENVIRONMENTS, GITHUB_ISSUER_URI,
    GITHUB_PROVIDER_ID, ORG_ROLES, PROJECT_ROLES, REQUIRED_APIS, TERRAFORM_BUCKET_SUFFIX,
    WORKLOAD_IDENTITY_USER_ROLE,
};
use crate::error::Result;
use crate::exec::Executor;
use crate::probes::{self, Probe};
use crate::types::ProvisioningRequest;

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// Stage 1 — resolve or create the foundation project.
///
/// Reruns with the same prefix reuse the first listed project matching
/// `^{prefix}-fdn(-\d+)?$`; a fresh prefix gets a timestamp-suffixed id.
pub fn resolve_project(exec: &Executor<'_>, request: &ProvisioningRequest) -> Result<String> {
    if let Probe::Found(projects) = probes::list_existing_projects(exec) {
        if let Some(existing) = probes::find_reusable_project(&projects, &request.project_name) {
            tracing::info!(project_id = existing, "foundation project exists, reusing");
            return Ok(existing.to_string());
        }
    }

    let project_id = format!("{}-fdn-{}", request.project_name, Utc::now().timestamp());
    tracing::info!(project_id, "creating foundation project");
    exec.execute(
        "gcloud",
        &args(&[
            "projects",
            "create",
            &project_id,
            &format!("--organization={}", request.org_id),
            &format!("--name={project_id}"),
        ]),
        "project creation",
    )?;
    Ok(project_id)
}

/// Stage 2 — link the billing account unless already linked.
pub fn link_billing(
    exec: &Executor<'_>,
    project_id: &str,
    request: &ProvisioningRequest,
) -> Result<()> {
    if probes::is_billing_linked(exec, project_id, &request.billing_account).confirmed() {
        tracing::info!(project_id, "billing already linked, skipping");
        return Ok(());
    }

    tracing::info!(project_id, billing_account = %request.billing_account, "linking billing account");
    exec.execute(
        "gcloud",
        &args(&[
            "billing",
            "projects",
            "link",
            project_id,
            &format!("--billing-account={}", request.billing_account),
        ]),
        "billing link",
    )?;
    Ok(())
}

/// Stage 3 — resolve the project number. Always runs; the number is required
/// for provider resource paths and principal sets, so empty output is fatal.
pub fn resolve_project_number(exec: &Executor<'_>, project_id: &str) -> Result<String> {
    exec.execute_nonempty(
        "gcloud",
        &args(&[
            "projects",
            "describe",
            project_id,
            "--format=value(projectNumber)",
        ]),
        "project number lookup",
    )
}

/// Stage 4 — enable the required service APIs. Enabling an already-enabled
/// API is a remote no-op, so no probe.
pub fn enable_apis(exec: &Executor<'_>, project_id: &str) -> Result<()> {
    for api in REQUIRED_APIS {
        exec.execute(
            "gcloud",
            &args(&[
                "services",
                "enable",
                api,
                &format!("--project={project_id}"),
            ]),
            &format!("API enablement ({api})"),
        )?;
    }
    Ok(())
}

/// Stage 5 — create the foundation service account unless present.
/// Returns the service-account email.
pub fn create_service_account(
    exec: &Executor<'_>,
    project_id: &str,
    request: &ProvisioningRequest,
) -> Result<String> {
    let email = request.service_account_email(project_id);
    if probes::service_account_exists(exec, project_id, &email).confirmed() {
        tracing::info!(email, "service account exists, skipping");
        return Ok(email);
    }

    tracing::info!(email, "creating service account");
    exec.execute(
        "gcloud",
        &args(&[
            "iam",
            "service-accounts",
            "create",
            &format!("{}-sa", request.project_name),
            &format!("--project={project_id}"),
            &format!("--display-name={} foundation service account", request.project_name),
        ]),
        "service account creation",
    )?;
    Ok(email)
}

/// Stage 6 — project-level role bindings. Re-binding a held role is a remote
/// no-op, so these are applied unconditionally.
pub fn bind_project_roles(
    exec: &Executor<'_>,
    project_id: &str,
    service_account: &str,
) -> Result<()> {
    let member = format!("serviceAccount:{service_account}");
    for role in PROJECT_ROLES {
        exec.execute(
            "gcloud",
            &args(&[
                "projects",
                "add-iam-policy-binding",
                project_id,
                &format!("--member={member}"),
                &format!("--role={role}"),
            ]),
            &format!("project IAM binding ({role})"),
        )?;
    }
    Ok(())
}

/// Stage 7 — organization-scope role bindings plus the billing-account role.
pub fn bind_org_roles(
    exec: &Executor<'_>,
    request: &ProvisioningRequest,
    service_account: &str,
) -> Result<()> {
    let member = format!("serviceAccount:{service_account}");
    for role in ORG_ROLES {
        exec.execute(
            "gcloud",
            &args(&[
                "organizations",
                "add-iam-policy-binding",
                &request.org_id,
                &format!("--member={member}"),
                &format!("--role={role}"),
            ]),
            &format!("org IAM binding ({role})"),
        )?;
    }

    exec.execute(
        "gcloud",
        &args(&[
            "billing",
            "accounts",
            "add-iam-policy-binding",
            &request.billing_account,
            &format!("--member={member}"),
            &format!("--role={BILLING_ROLE}"),
        ]),
        &format!("billing IAM binding ({BILLING_ROLE})"),
    )?;
    Ok(())
}

/// Stage 8 — per-environment identity pools and providers.
///
/// Every environment gets a CI provider trusting the GitHub Actions issuer,
/// scoped by the identity specifier's attribute condition. The `dev` pool
/// additionally gets an unconditioned developer-login provider for local
/// impersonation.
///
/// Returns env → full resource path of the CI provider (the audience string
/// consumed by the GitHub auth action, built on the project number).
pub fn ensure_identity_pools(
    exec: &Executor<'_>,
    request: &ProvisioningRequest,
    project_id: &str,
    project_number: &str,
) -> Result<BTreeMap<String, String>> {
    let mut providers = BTreeMap::new();

    for env in ENVIRONMENTS {
        let pool_id = request.pool_id(env);

        if probes::identity_pool_exists(exec, project_id, &pool_id).confirmed() {
            tracing::info!(pool_id, "identity pool exists, skipping");
        } else {
            tracing::info!(pool_id, "creating identity pool");
            exec.execute(
                "gcloud",
                &args(&[
                    "iam",
                    "workload-identity-pools",
                    "create",
                    &pool_id,
                    &format!("--project={project_id}"),
                    "--location=global",
                    &format!("--display-name={pool_id}"),
                ]),
                &format!("identity pool creation ({env})"),
            )?;
        }

        if probes::identity_provider_exists(exec, project_id, &pool_id, GITHUB_PROVIDER_ID)
            .confirmed()
        {
            tracing::info!(pool_id, provider = GITHUB_PROVIDER_ID, "provider exists, skipping");
        } else {
            tracing::info!(pool_id, provider = GITHUB_PROVIDER_ID, "creating CI provider");
            exec.execute(
                "gcloud",
                &args(&[
                    "iam",
                    "workload-identity-pools",
                    "providers",
                    "create-oidc",
                    GITHUB_PROVIDER_ID,
                    &format!("--project={project_id}"),
                    "--location=global",
                    &format!("--workload-identity-pool={pool_id}"),
                    &format!("--issuer-uri={GITHUB_ISSUER_URI}"),
                    &format!("--attribute-mapping={}", request.github_identity.attribute_mapping()),
                    &format!("--attribute-condition={}", request.github_identity.attribute_condition()),
                ]),
                &format!("CI provider creation ({env})"),
            )?;
        }

        // dev only: interactive developer login, unconditionally trusted
        if env == "dev" {
            if probes::identity_provider_exists(exec, project_id, &pool_id, DEVELOPER_PROVIDER_ID)
                .confirmed()
            {
                tracing::info!(pool_id, provider = DEVELOPER_PROVIDER_ID, "provider exists, skipping");
            } else {
                tracing::info!(pool_id, provider = DEVELOPER_PROVIDER_ID, "creating developer provider");
                exec.execute(
                    "gcloud",
                    &args(&[
                        "iam",
                        "workload-identity-pools",
                        "providers",
                        "create-oidc",
                        DEVELOPER_PROVIDER_ID,
                        &format!("--project={project_id}"),
                        "--location=global",
                        &format!("--workload-identity-pool={pool_id}"),
                        &format!("--issuer-uri={DEVELOPER_ISSUER_URI}"),
                        "--attribute-mapping=google.subject=assertion.email,attribute.hd=assertion.hd",
                    ]),
                    "developer provider creation (dev)",
                )?;
            }
        }

        providers.insert(
            env.to_string(),
            format!(
                "projects/{project_number}/locations/global/workloadIdentityPools/{pool_id}/providers/{GITHUB_PROVIDER_ID}"
            ),
        );
    }

    Ok(providers)
}

/// Stage 9 — impersonation grants. Re-binding is a remote no-op, so these are
/// applied unconditionally on every run.
pub fn grant_impersonation(
    exec: &Executor<'_>,
    request: &ProvisioningRequest,
    project_id: &str,
    project_number: &str,
    service_account: &str,
) -> Result<()> {
    for env in ENVIRONMENTS {
        let pool_id = request.pool_id(env);
        let principal = request.github_identity.principal_set(project_number, &pool_id);
        bind_workload_identity_user(exec, project_id, service_account, &principal, env)?;

        if env == "dev" {
            let developer = developer_principal(request, project_number, &pool_id);
            bind_workload_identity_user(exec, project_id, service_account, &developer, "dev developer")?;
        }
    }
    Ok(())
}

/// Principal for the developer-login provider. An email matches the mapped
/// subject directly; a bare domain matches the hosted-domain attribute.
fn developer_principal(
    request: &ProvisioningRequest,
    project_number: &str,
    pool_id: &str,
) -> String {
    let base = format!(
        "iam.googleapis.com/projects/{project_number}/locations/global/workloadIdentityPools/{pool_id}"
    );
    if request.developer_identity.contains('@') {
        format!("principal://{base}/subject/{}", request.developer_identity)
    } else {
        format!(
            "principalSet://{base}/attribute.hd/{}",
            request.developer_identity
        )
    }
}

fn bind_workload_identity_user(
    exec: &Executor<'_>,
    project_id: &str,
    service_account: &str,
    member: &str,
    label_scope: &str,
) -> Result<()> {
    exec.execute(
        "gcloud",
        &args(&[
            "iam",
            "service-accounts",
            "add-iam-policy-binding",
            service_account,
            &format!("--project={project_id}"),
            &format!("--member={member}"),
            &format!("--role={WORKLOAD_IDENTITY_USER_ROLE}"),
        ]),
        &format!("impersonation grant ({label_scope})"),
    )?;
    Ok(())
}

/// Stage 10 — Terraform state bucket in the default region.
/// Returns the bucket name.
pub fn create_bucket(
    exec: &Executor<'_>,
    project_id: &str,
    request: &ProvisioningRequest,
) -> Result<String> {
    let name = format!("{project_id}-{TERRAFORM_BUCKET_SUFFIX}");
    if probes::bucket_exists(exec, &name).confirmed() {
        tracing::info!(bucket = name, "state bucket exists, skipping");
        return Ok(name);
    }

    tracing::info!(bucket = name, region = request.default_region(), "creating state bucket");
    exec.execute(
        "gcloud",
        &args(&[
            "storage",
            "buckets",
            "create",
            &format!("gs://{name}"),
            &format!("--project={project_id}"),
            &format!("--location={}", request.default_region()),
            "--uniform-bucket-level-access",
        ]),
        "bucket creation",
    )?;
    Ok(name)
}
