//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod config;
pub mod export;
pub mod preview;
pub mod snapshot;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use chemscreen_core::config::{Config, DEFAULT_CONFIG_PATH};
use chemscreen_core::export::CancelToken;
use chemscreen_core::types::BatchId;
use chemscreen_storage::{BatchSnapshot, FileSystemStorage, SnapshotStorage};

/// chemscreen - export batch chemical literature search results
#[derive(Debug, Parser)]
#[command(name = "chemscreen")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Snapshot storage directory
    #[arg(long, global = true, env = "CHEMSCREEN_STORE")]
    pub store_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Export a batch to CSV, Excel or JSON
    Export(export::ExportArgs),

    /// Show what an export would include
    Preview(preview::PreviewArgs),

    /// Manage stored batch snapshots
    #[command(subcommand)]
    Snapshot(snapshot::SnapshotCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Which batch to operate on
#[derive(Debug, Args)]
pub struct SourceArgs {
    /// Snapshot JSON file
    #[arg(long, conflicts_with = "batch")]
    pub snapshot: Option<PathBuf>,

    /// Stored batch id (defaults to the most recently stored batch)
    #[arg(long, short)]
    pub batch: Option<String>,
}

impl SourceArgs {
    /// Load the selected snapshot
    pub fn load(&self, store_dir: Option<&Path>) -> Result<BatchSnapshot> {
        if let Some(path) = &self.snapshot {
            return FileSystemStorage::load_file(path)
                .with_context(|| format!("Failed to read snapshot {}", path.display()));
        }

        let storage = open_storage(store_dir)?;
        match &self.batch {
            Some(id) => storage
                .load(&BatchId::from_string(id))
                .with_context(|| format!("Batch '{}' not found", id)),
            None => storage
                .latest()?
                .context("No snapshots stored. Use --snapshot <FILE> or 'chemscreen snapshot import'"),
        }
    }
}

/// Open the snapshot store at `dir` or the default location
pub fn open_storage(dir: Option<&Path>) -> Result<FileSystemStorage> {
    let storage = match dir {
        Some(dir) => FileSystemStorage::new(dir),
        None => FileSystemStorage::default_location(),
    };
    storage.context("Failed to open snapshot storage")
}

/// Run the CLI application
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    let store_dir = cli.store_dir.as_deref();
    let command = match cli.command {
        // Config commands must work even when the file is broken
        Commands::Config(cmd) => {
            setup_logging(cli.verbose, "warn");
            return config::execute(cmd, &config_path);
        }
        other => other,
    };

    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    setup_logging(cli.verbose, &config.logging.level);

    match command {
        Commands::Export(args) => {
            let cancel = CancelToken::new();
            crate::cancellation::install_handler(&cancel)?;
            export::execute(args, &config, store_dir, &cancel)
        }
        Commands::Preview(args) => preview::execute(args, &config, store_dir),
        Commands::Snapshot(cmd) => snapshot::execute(cmd, store_dir),
        Commands::Config(_) => Ok(()),
    }
}

fn setup_logging(verbosity: u8, config_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbosity {
        0 => EnvFilter::new(config_level),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_text() {
        let cmd = Cli::command();
        assert!(cmd.get_about().is_some());
    }

    #[test]
    fn test_snapshot_and_batch_conflict() {
        let result = Cli::try_parse_from([
            "chemscreen",
            "export",
            "--snapshot",
            "a.json",
            "--batch",
            "b",
        ]);
        assert!(result.is_err());
    }
}
