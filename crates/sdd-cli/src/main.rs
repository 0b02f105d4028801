mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{spec::SpecSubcommand, sync::SyncArgs};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sdd",
    about = "Specification-driven development: keep spec requirements and code in sync",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .sdd/ or .git/)
    #[arg(long, global = true, env = "SDD_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check which spec requirements are referenced by code and tests
    Sync(SyncArgs),

    /// Inspect specs and their requirements
    Spec {
        #[command(subcommand)]
        subcommand: SpecSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Sync(args) => cmd::sync::run(&root, args, cli.json),
        Commands::Spec { subcommand } => cmd::spec::run(&root, subcommand, cli.json).map(|()| 0),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            // Print the full error chain (anyhow's alternate Display)
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
