//! Human- and machine-readable output for the commands.
//!
//! Each command has exactly one human rendering, built here so the command
//! modules stay thin. `--json` bypasses all of it.

use std::collections::BTreeMap;

use gcp_tools_core::preflight::CliStatus;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Environment → provider resource path listing for `setup`. Environment
/// names are padded so the paths line up.
pub fn render_providers(providers: &BTreeMap<String, String>) -> String {
    let width = providers.keys().map(String::len).max().unwrap_or(0);
    providers
        .iter()
        .map(|(env, path)| format!("  {env:width$}  {path}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Doctor report: one line per required CLI, resolved path when found and
/// the install hint when not.
pub fn render_cli_statuses(statuses: &[CliStatus]) -> String {
    statuses
        .iter()
        .map(|s| match &s.path {
            Some(path) => format!("{:<8} ok       {}", s.name, path.display()),
            None => format!("{:<8} missing  {}", s.name, s.hint),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
