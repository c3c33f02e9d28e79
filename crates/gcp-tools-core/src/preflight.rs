//! Prerequisite binary detection.
//!
//! Provisioning shells out to `gcloud` and secret wiring to `gh`; both are
//! resolved up front so a missing binary fails before any remote state is
//! touched.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{GcpToolsError, Result};

pub const REQUIRED_CLIS: [(&str, &str); 2] = [
    (
        "gcloud",
        "install the Google Cloud SDK: https://cloud.google.com/sdk/docs/install",
    ),
    ("gh", "install the GitHub CLI: https://cli.github.com"),
];

#[derive(Debug, Clone, Serialize)]
pub struct CliStatus {
    pub name: &'static str,
    pub path: Option<PathBuf>,
    pub hint: &'static str,
}

impl CliStatus {
    pub fn found(&self) -> bool {
        self.path.is_some()
    }
}

/// Status of every required binary, for the `doctor` report.
pub fn check() -> Vec<CliStatus> {
    REQUIRED_CLIS
        .into_iter()
        .map(|(name, hint)| CliStatus {
            name,
            path: which::which(name).ok(),
            hint,
        })
        .collect()
}

/// Resolve one binary or fail with an install hint.
pub fn require(name: &str) -> Result<PathBuf> {
    let hint = REQUIRED_CLIS
        .into_iter()
        .find(|(n, _)| *n == name)
        .map(|(_, h)| h)
        .unwrap_or("install it and ensure it is on PATH");
    which::which(name).map_err(|_| GcpToolsError::CliNotFound {
        name: name.to_string(),
        hint: hint.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_reports_every_required_cli() {
        let statuses = check();
        let names: Vec<&str> = statuses.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["gcloud", "gh"]);
    }

    #[test]
    fn require_unknown_binary_carries_hint() {
        let err = require("definitely-not-a-real-binary-xyz").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("definitely-not-a-real-binary-xyz"));
        assert!(msg.contains("PATH"));
    }
}
