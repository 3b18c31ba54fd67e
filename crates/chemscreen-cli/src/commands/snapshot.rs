//! Snapshot command
//!
//! Manage stored batch snapshots.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use chemscreen_core::types::BatchId;
use chemscreen_storage::{FileSystemStorage, SnapshotStorage};

use super::open_storage;

/// Snapshot subcommands
#[derive(Debug, Subcommand)]
pub enum SnapshotCommand {
    /// List stored snapshots
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Limit number of snapshots
        #[arg(long, short, default_value = "10")]
        limit: usize,
    },

    /// Show snapshot details
    Show {
        /// Batch id
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import a snapshot file into the store
    Import {
        /// Snapshot JSON file
        file: PathBuf,
    },

    /// Delete a stored snapshot
    Delete {
        /// Batch id
        id: String,
    },
}

/// Execute the snapshot command
pub fn execute(cmd: SnapshotCommand, store_dir: Option<&Path>) -> Result<()> {
    let storage = open_storage(store_dir)?;

    match cmd {
        SnapshotCommand::List { json, limit } => list_snapshots(&storage, json, limit),
        SnapshotCommand::Show { id, json } => show_snapshot(&storage, &id, json),
        SnapshotCommand::Import { file } => import_snapshot(&storage, &file),
        SnapshotCommand::Delete { id } => delete_snapshot(&storage, &id),
    }
}

fn list_snapshots(storage: &FileSystemStorage, as_json: bool, limit: usize) -> Result<()> {
    let snapshots: Vec<_> = storage.list()?.into_iter().take(limit).collect();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
        return Ok(());
    }

    if snapshots.is_empty() {
        println!("No snapshots found.");
        return Ok(());
    }

    println!("{}", "Snapshots:".bold().underline());
    println!();

    for info in &snapshots {
        let saved = info
            .saved_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}  {} chemicals, {} publications, {} failed  {}",
            info.summary.batch_id.to_string().green(),
            info.summary.chemical_count,
            info.summary.total_publications,
            info.summary.failed_searches,
            saved.dimmed()
        );
    }

    Ok(())
}

fn show_snapshot(storage: &FileSystemStorage, id: &str, as_json: bool) -> Result<()> {
    let snapshot = storage
        .load(&BatchId::from_string(id))
        .with_context(|| format!("Batch '{}' not found", id))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let info = snapshot.info();
    println!("{} {}", "Batch".bold(), info.summary.batch_id.to_string().cyan());
    println!("  Chemicals:     {}", info.summary.chemical_count);
    println!("  Successful:    {}", info.summary.successful_searches);
    println!("  Failed:        {}", info.summary.failed_searches);
    println!("  Publications:  {}", info.summary.total_publications);
    println!();

    for result in &snapshot.results {
        let status = result.status();
        let marker = match &result.error {
            Some(err) => format!("{} {}", status.as_str().red(), err.dimmed()),
            None => status.as_str().green().to_string(),
        };
        println!(
            "  {:<30} {:>4} publications  {}",
            result.chemical.to_string(),
            result.publication_count(),
            marker
        );
    }

    Ok(())
}

fn import_snapshot(storage: &FileSystemStorage, file: &Path) -> Result<()> {
    let id = storage
        .import(file)
        .with_context(|| format!("Failed to import {}", file.display()))?;
    println!("{} Imported batch {}", "✓".green(), id.to_string().cyan());
    Ok(())
}

fn delete_snapshot(storage: &FileSystemStorage, id: &str) -> Result<()> {
    storage.delete(&BatchId::from_string(id))?;
    println!("{} Deleted batch {}", "✓".green(), id);
    Ok(())
}
