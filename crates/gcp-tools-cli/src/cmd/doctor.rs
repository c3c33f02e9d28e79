use gcp_tools_core::preflight;

use crate::output::{print_json, render_cli_statuses};

pub fn run(json: bool) -> anyhow::Result<()> {
    let statuses = preflight::check();

    if json {
        return print_json(&statuses);
    }

    println!("{}", render_cli_statuses(&statuses));

    if statuses.iter().any(|s| !s.found()) {
        println!("\nSome required CLIs are missing — provisioning will fail until they are installed.");
    }
    Ok(())
}
