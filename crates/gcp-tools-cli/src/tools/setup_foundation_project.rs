use super::{failure, GcpTool};
use gcp_tools_core::{preflight, run_foundation_project, ProvisioningRequest, SystemRunner};

pub struct SetupFoundationProjectTool;

impl GcpTool for SetupFoundationProjectTool {
    fn name(&self) -> &str {
        "setup_foundation_project"
    }

    fn description(&self) -> &str {
        "Provision the GCP foundation project: project, billing, APIs, service \
         account, IAM bindings, workload identity pools/providers, and the \
         Terraform state bucket. Idempotent — reruns skip existing resources."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "projectName": {
                    "type": "string",
                    "description": "Project name prefix for every derived resource name"
                },
                "orgId": {
                    "type": "string",
                    "description": "Organization id hosting the foundation project"
                },
                "billingAccount": {
                    "type": "string",
                    "description": "Billing account id to link"
                },
                "regions": {
                    "type": "string",
                    "description": "Comma-separated regions; the first is the default region"
                },
                "githubIdentity": {
                    "type": "string",
                    "description": "GitHub identity trusted by CI: `owner` or `owner/repo`"
                },
                "developerIdentity": {
                    "type": "string",
                    "description": "Developer email (or hosted domain) for local impersonation"
                },
                "ownerEmails": {
                    "type": "string",
                    "description": "Comma-separated owner emails"
                }
            },
            "required": [
                "projectName", "orgId", "billingAccount", "regions",
                "githubIdentity", "developerIdentity", "ownerEmails"
            ]
        })
    }

    fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, String> {
        let request = ProvisioningRequest::from_raw(
            args["projectName"].as_str(),
            args["orgId"].as_str(),
            args["billingAccount"].as_str(),
            args["regions"].as_str(),
            args["githubIdentity"].as_str(),
            args["developerIdentity"].as_str(),
            args["ownerEmails"].as_str(),
        )
        .map_err(failure)?;

        preflight::require("gcloud").map_err(failure)?;

        let result = run_foundation_project(&SystemRunner, &request).map_err(failure)?;
        serde_json::to_value(&result).map_err(failure)
    }
}
