use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use specloom::config::Config;

mod cmd;

#[derive(Parser)]
#[command(name = "specloom")]
#[command(version, about = "Spec-writing workflow engine")]
pub struct Cli {
    /// Root directory containing one folder per project
    #[arg(long, default_value = ".", global = true)]
    pub projects_root: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a project folder skeleton and a fresh status record
    Init { project: String },
    /// List projects and their current position
    List,
    /// Show a project's reconciled status
    Status { project: String },
    /// Detect and repair drift between the record and the filesystem
    Reconcile { project: String },
    /// Report drift without repairing it
    Drift { project: String },
    /// Put the current phase to work
    Start { project: String },
    /// Mark a phase complete and advance (drops stale requests)
    Advance {
        project: String,
        role: String,
        phase: String,
    },
    /// Reset a stale ai-working phase for retry
    Recover { project: String },
    /// Watch the projects root and react to artifact changes
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::new(cli.projects_root.clone())?;

    match cli.command {
        Commands::Init { project } => cmd::cmd_init(&config, &project),
        Commands::List => cmd::cmd_list(&config),
        Commands::Status { project } => cmd::cmd_status(&config, &project),
        Commands::Reconcile { project } => cmd::cmd_reconcile(&config, &project),
        Commands::Drift { project } => cmd::cmd_drift(&config, &project),
        Commands::Start { project } => cmd::cmd_start(&config, &project),
        Commands::Advance {
            project,
            role,
            phase,
        } => cmd::cmd_advance(&config, &project, &role, &phase),
        Commands::Recover { project } => cmd::cmd_recover(&config, &project),
        Commands::Watch => cmd::cmd_watch(&config).await,
    }
}
