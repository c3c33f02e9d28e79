mod cmd;
mod output;
mod tools;

use clap::{Parser, Subcommand};
use cmd::setup::SetupArgs;

#[derive(Parser)]
#[command(
    name = "gcp-tools",
    about = "Provision a GCP foundation project and wire up CI/CD trust",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the foundation project (idempotent — safe to rerun)
    Setup(SetupArgs),

    /// Configure GitHub environments, secrets, and variables from a saved
    /// provisioning result
    Secrets {
        /// Target repository (owner/repo)
        #[arg(long)]
        repo: String,

        /// Path to a provisioning result JSON file, or `-` for stdin
        #[arg(long, default_value = "-")]
        from: String,
    },

    /// Check that the required external CLIs are installed
    Doctor,

    /// Run as an MCP stdio server
    Mcp,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Mcp => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Setup(args) => cmd::setup::run(args, cli.json),
        Commands::Secrets { repo, from } => cmd::secrets::run(&repo, &from, cli.json),
        Commands::Doctor => cmd::doctor::run(cli.json),
        Commands::Mcp => cmd::mcp::run(),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
