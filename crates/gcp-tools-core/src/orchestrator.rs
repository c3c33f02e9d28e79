//! Sequencing for the foundation-project provisioning run.
//!
//! Stages execute strictly in order — each depends on identifiers produced by
//! an earlier one (project before service account, project number before
//! provider paths). The first step failure aborts the run; reruns are safe
//! because every stage probes remote state before creating.

use crate::error::Result;
use crate::exec::{CommandRunner, Executor};
use crate::steps;
use crate::types::{ProvisioningRequest, ProvisioningResult};

pub fn run_foundation_project(
    runner: &dyn CommandRunner,
    request: &ProvisioningRequest,
) -> Result<ProvisioningResult> {
    let exec = Executor::new(runner);

    let project_id = steps::resolve_project(&exec, request)?;
    steps::link_billing(&exec, &project_id, request)?;
    let project_number = steps::resolve_project_number(&exec, &project_id)?;
    steps::enable_apis(&exec, &project_id)?;
    let service_account = steps::create_service_account(&exec, &project_id, request)?;
    steps::bind_project_roles(&exec, &project_id, &service_account)?;
    steps::bind_org_roles(&exec, request, &service_account)?;
    let workload_identity_providers =
        steps::ensure_identity_pools(&exec, request, &project_id, &project_number)?;
    steps::grant_impersonation(&exec, request, &project_id, &project_number, &service_account)?;
    let terraform_state_bucket = steps::create_bucket(&exec, &project_id, request)?;

    tracing::info!(project_id, project_number, "foundation project ready");

    Ok(ProvisioningResult {
        project_id,
        project_number,
        service_account,
        workload_identity_providers,
        terraform_state_bucket,
        region: request.default_region().to_string(),
        regions: request.regions.clone(),
        org_id: request.org_id.clone(),
        billing_account: request.billing_account.clone(),
        github_identity: request.github_identity.to_string(),
        developer_identity: request.developer_identity.clone(),
        owner_emails: request.owner_emails.clone(),
    })
}
