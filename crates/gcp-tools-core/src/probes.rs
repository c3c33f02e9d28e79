//! Read-only existence checks against the remote account.
//!
//! A probe never aborts the run. A failed probe command degrades to
//! `Probe::Unknown` with a warning; the caller proceeds to create and lets
//! the creation command's own "already exists" failure be the final arbiter.

use regex::Regex;

use crate::exec::Executor;

/// Tri-state probe outcome. `Unknown` means the probe command itself failed
/// (network, permissions), not that the resource is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Found(T),
    Absent,
    Unknown,
}

impl Probe<bool> {
    /// True when the probe confirmed the resource is present.
    pub fn confirmed(&self) -> bool {
        matches!(self, Probe::Found(true))
    }
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

/// All project ids visible to the caller, sorted by the listing call so
/// reruns resolve the same reusable project even when several match.
pub fn list_existing_projects(exec: &Executor<'_>) -> Probe<Vec<String>> {
    let argv = args(&[
        "projects",
        "list",
        "--format=value(projectId)",
        "--sort-by=projectId",
    ]);
    match exec.probe("gcloud", &argv) {
        Ok(out) if out.success() => Probe::Found(
            out.stdout
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        Ok(out) => {
            tracing::warn!(stderr = %out.stderr.trim(), "project listing failed, treating as unknown");
            Probe::Unknown
        }
        Err(e) => {
            tracing::warn!(error = %e, "project listing failed, treating as unknown");
            Probe::Unknown
        }
    }
}

/// First project id matching `^{prefix}-fdn(-\d+)?$`, in listing order.
pub fn find_reusable_project<'a>(projects: &'a [String], prefix: &str) -> Option<&'a str> {
    let pattern = format!(r"^{}-fdn(-\d+)?$", regex::escape(prefix));
    let re = Regex::new(&pattern).ok()?;
    projects
        .iter()
        .find(|p| re.is_match(p))
        .map(String::as_str)
}

/// Whether `project_id` is linked to the requested billing account. Compares
/// the tail of the linked `billingAccounts/…` resource name.
pub fn is_billing_linked(
    exec: &Executor<'_>,
    project_id: &str,
    billing_account: &str,
) -> Probe<bool> {
    let argv = args(&[
        "billing",
        "projects",
        "describe",
        project_id,
        "--format=value(billingAccountName)",
    ]);
    match exec.probe("gcloud", &argv) {
        Ok(out) if out.success() => {
            let linked = out
                .stdout
                .trim()
                .rsplit('/')
                .next()
                .is_some_and(|tail| tail == billing_account);
            Probe::Found(linked)
        }
        Ok(out) => {
            tracing::warn!(project_id, stderr = %out.stderr.trim(), "billing probe failed");
            Probe::Unknown
        }
        Err(e) => {
            tracing::warn!(project_id, error = %e, "billing probe failed");
            Probe::Unknown
        }
    }
}

pub fn service_account_exists(exec: &Executor<'_>, project_id: &str, email: &str) -> Probe<bool> {
    let argv = args(&[
        "iam",
        "service-accounts",
        "list",
        &format!("--project={project_id}"),
        "--format=value(email)",
    ]);
    match exec.probe("gcloud", &argv) {
        Ok(out) if out.success() => Probe::Found(out.stdout.lines().any(|l| l.trim() == email)),
        Ok(out) => {
            tracing::warn!(email, stderr = %out.stderr.trim(), "service account probe failed");
            Probe::Unknown
        }
        Err(e) => {
            tracing::warn!(email, error = %e, "service account probe failed");
            Probe::Unknown
        }
    }
}

pub fn bucket_exists(exec: &Executor<'_>, name: &str) -> Probe<bool> {
    let argv = args(&[
        "storage",
        "buckets",
        "describe",
        &format!("gs://{name}"),
        "--format=value(name)",
    ]);
    describe_probe(exec, &argv, "bucket")
}

pub fn identity_pool_exists(exec: &Executor<'_>, project_id: &str, pool_id: &str) -> Probe<bool> {
    let argv = args(&[
        "iam",
        "workload-identity-pools",
        "describe",
        pool_id,
        &format!("--project={project_id}"),
        "--location=global",
        "--format=value(name)",
    ]);
    describe_probe(exec, &argv, "identity pool")
}

pub fn identity_provider_exists(
    exec: &Executor<'_>,
    project_id: &str,
    pool_id: &str,
    provider_id: &str,
) -> Probe<bool> {
    let argv = args(&[
        "iam",
        "workload-identity-pools",
        "providers",
        "describe",
        provider_id,
        &format!("--project={project_id}"),
        "--location=global",
        &format!("--workload-identity-pool={pool_id}"),
        "--format=value(name)",
    ]);
    describe_probe(exec, &argv, "identity provider")
}

/// Shared interpretation for `describe`-style probes: success means present,
/// a NOT_FOUND error means absent, anything else is unknown.
fn describe_probe(exec: &Executor<'_>, argv: &[String], what: &str) -> Probe<bool> {
    match exec.probe("gcloud", argv) {
        Ok(out) if out.success() => Probe::Found(true),
        Ok(out) if is_not_found(&out.stderr) => Probe::Found(false),
        Ok(out) => {
            tracing::warn!(what, stderr = %out.stderr.trim(), "describe probe failed");
            Probe::Unknown
        }
        Err(e) => {
            tracing::warn!(what, error = %e, "describe probe failed");
            Probe::Unknown
        }
    }
}

fn is_not_found(stderr: &str) -> bool {
    let lower = stderr.to_lowercase();
    lower.contains("not_found")
        || lower.contains("not found")
        || lower.contains("404")
        || lower.contains("does not exist")
}
