use crate::output::{print_json, render_providers};
use anyhow::Context;
use clap::Args;
use gcp_tools_core::{preflight, run_foundation_project, ProvisioningRequest, SystemRunner};

/// All seven inputs accept an environment-variable fallback so the command
/// can be driven entirely from CI configuration.
#[derive(Args)]
pub struct SetupArgs {
    /// Project name prefix for every derived resource name
    #[arg(long, env = "GCP_TOOLS_PROJECT_NAME")]
    pub project_name: Option<String>,

    /// Organization id hosting the foundation project
    #[arg(long, env = "GCP_TOOLS_ORG_ID")]
    pub org_id: Option<String>,

    /// Billing account id to link (XXXXXX-XXXXXX-XXXXXX)
    #[arg(long, env = "GCP_TOOLS_BILLING_ACCOUNT")]
    pub billing_account: Option<String>,

    /// Comma-separated regions; the first is the default region
    #[arg(long, env = "GCP_TOOLS_REGIONS")]
    pub regions: Option<String>,

    /// GitHub identity trusted by CI providers: `owner` or `owner/repo`
    #[arg(long, env = "GCP_TOOLS_GITHUB_IDENTITY_SPECIFIER")]
    pub github_identity: Option<String>,

    /// Developer email (or hosted domain) for local impersonation
    #[arg(long, env = "GCP_TOOLS_DEVELOPER_IDENTITY_SPECIFIER")]
    pub developer_identity: Option<String>,

    /// Comma-separated owner emails
    #[arg(long, env = "GCP_TOOLS_OWNER_EMAILS")]
    pub owner_emails: Option<String>,
}

pub fn run(args: SetupArgs, json: bool) -> anyhow::Result<()> {
    // Validate before touching anything remote — every missing field is
    // reported at once.
    let request = ProvisioningRequest::from_raw(
        args.project_name.as_deref(),
        args.org_id.as_deref(),
        args.billing_account.as_deref(),
        args.regions.as_deref(),
        args.github_identity.as_deref(),
        args.developer_identity.as_deref(),
        args.owner_emails.as_deref(),
    )?;

    preflight::require("gcloud")?;

    let result = run_foundation_project(&SystemRunner, &request)
        .context("foundation project provisioning failed")?;

    if json {
        return print_json(&result);
    }

    println!("Foundation project: {}", result.project_id);
    println!("Project number:     {}", result.project_number);
    println!("Service account:    {}", result.service_account);
    println!(
        "State bucket:       {} ({})",
        result.terraform_state_bucket, result.region
    );

    println!("\nWorkload identity providers:");
    println!("{}", render_providers(&result.workload_identity_providers));

    println!("\nNext: gcp-tools secrets --repo <owner/repo> --from <result.json>");
    Ok(())
}
