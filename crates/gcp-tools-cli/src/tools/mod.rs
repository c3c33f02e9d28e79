pub mod setup_foundation_project;
pub mod setup_github_secrets;

pub trait GcpTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> serde_json::Value;
    fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, String>;
}

pub fn all_tools() -> Vec<Box<dyn GcpTool>> {
    vec![
        Box::new(setup_foundation_project::SetupFoundationProjectTool),
        Box::new(setup_github_secrets::SetupGithubSecretsTool),
    ]
}

/// Failure payload handed back to the calling agent: never a raw backtrace,
/// always `{"status":"failed","message":…}`.
pub(crate) fn failure(message: impl std::fmt::Display) -> String {
    serde_json::json!({
        "status": "failed",
        "message": message.to_string(),
    })
    .to_string()
}
