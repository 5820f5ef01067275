mod cmd;
mod output;
mod root;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use siteid_core::config::EngineConfig;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "siteid",
    about = "FacilityID/OrderID integrity checks and repair for rollout order snapshots",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root holding .siteid/config.yaml (default: auto-detect)
    #[arg(long, global = true, env = "SITEID_ROOT")]
    root: Option<PathBuf>,

    /// Explicit config file (overrides <root>/.siteid/config.yaml)
    #[arg(long, global = true, env = "SITEID_CONFIG")]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the integrity report for an order snapshot (.json/.yaml)
    Report {
        /// Snapshot file
        snapshot: PathBuf,
    },

    /// Repair mismatched OrderIDs and prune duplicate facilities
    Fix {
        /// Snapshot file; rewritten in place unless --dry-run
        snapshot: PathBuf,

        /// Show the planned operations without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the canonical OrderID for a FacilityID
    Derive {
        facility_id: String,

        /// Year component (default: configured reference year or current year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Check a single FacilityID or OrderID against its grammar
    Validate { id: String },

    /// Inspect the engine configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn load_config(root: &Path, explicit: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let cfg = match explicit {
        Some(path) => EngineConfig::load_from(path),
        None => EngineConfig::load(root),
    };
    cfg.context("failed to load config")
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Fix { dry_run: false, .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = load_config(&root, cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Report { snapshot } => cmd::report::run(&config, &snapshot, cli.json),
        Commands::Fix { snapshot, dry_run } => cmd::fix::run(&config, &snapshot, dry_run, cli.json),
        Commands::Derive { facility_id, year } => {
            cmd::derive::run(&config, &facility_id, year, cli.json)
        }
        Commands::Validate { id } => cmd::validate::run(&id, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&config, subcommand, cli.json),
    });

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
