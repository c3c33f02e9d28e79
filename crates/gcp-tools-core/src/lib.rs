//! gcp-tools-core
//!
//! Foundation-project provisioning over the `gcloud` and `gh` CLIs. Holds no
//! local state — every run re-derives remote state through read-only probes,
//! so reruns are safe and the whole flow is idempotent.
//!
//! Public API:
//! - `ProvisioningRequest::from_raw()` — validate raw string input
//! - `run_foundation_project()` — probe-and-create every foundation resource
//! - `setup_github_secrets()` — wire a result into a GitHub repository
//! - `preflight` — prerequisite binary detection

pub mod constants;
pub mod error;
pub mod exec;
pub mod orchestrator;
pub mod preflight;
pub mod probes;
pub mod secrets;
pub mod steps;
pub mod types;

pub use crate::error::{GcpToolsError, Result};
pub use crate::exec::{CommandRunner, SystemRunner};
pub use crate::orchestrator::run_foundation_project;
pub use crate::secrets::setup_github_secrets;
pub use crate::types::{GithubIdentity, ProvisioningRequest, ProvisioningResult};
