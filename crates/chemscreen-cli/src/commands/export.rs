//! Export command
//!
//! Export a batch of search results to CSV, Excel or JSON.

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;

use chemscreen_core::config::Config;
use chemscreen_core::export::{CancelToken, ExportFailure, ExportManager, ExportOptions, ExportOutcome};
use chemscreen_core::quality::{score_results, DefaultQualityScorer};

use super::SourceArgs;
use crate::cancellation::Cancelled;
use crate::progress::ExportProgressBar;

/// Format and content choices shared by export and preview
#[derive(Debug, Args)]
pub struct ExportChoiceArgs {
    /// Export format: csv, excel or json (anything else exports CSV)
    #[arg(long, short)]
    pub format: Option<String>,

    /// Leave out batch id, search parameters and export time
    #[arg(long)]
    pub no_metadata: bool,

    /// Include publication abstracts
    #[arg(long)]
    pub abstracts: bool,
}

impl ExportChoiceArgs {
    /// Resolve export options from flags and config
    pub fn options(&self, config: &Config) -> ExportOptions {
        let selection = self
            .format
            .as_deref()
            .unwrap_or(&config.export.default_format);
        ExportOptions::from_selection(
            selection,
            config.export.include_metadata && !self.no_metadata,
            config.export.include_abstracts || self.abstracts,
        )
    }
}

/// Arguments for the export command
#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub choice: ExportChoiceArgs,

    /// Directory to write the export file to (must exist)
    #[arg(long, short)]
    pub output_dir: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long, short)]
    pub quiet: bool,
}

/// Execute the export command
pub fn execute(
    args: ExportArgs,
    config: &Config,
    store_dir: Option<&Path>,
    cancel: &CancelToken,
) -> Result<()> {
    let snapshot = args.source.load(store_dir)?;
    let (session, results) = snapshot.into_session(&config.search.parameters());

    let scorer = DefaultQualityScorer::with_recency_window(config.quality.recency_window_years);
    let scored = score_results(&scorer, &results);
    let options = args.choice.options(config);
    debug!("Export options: {:?}", options);

    let mut export_config = config.export.clone();
    if let Some(dir) = &args.output_dir {
        export_config.output_dir = dir.clone();
    }
    let manager = ExportManager::from_config(&export_config);

    eprintln!(
        "Exporting batch {} ({} chemicals) as {}...",
        session.batch_id.to_string().cyan(),
        session.chemical_count().to_string().yellow(),
        options.format.label()
    );

    let progress = ExportProgressBar::new(!args.quiet);
    let result = manager.export_with_progress(&session, &scored, options, &progress, cancel);
    progress.clear();

    match result {
        Ok(outcome) => {
            print_outcome(&outcome);
            Ok(())
        }
        Err(ExportFailure::Cancelled) => Err(Cancelled.into()),
        Err(ExportFailure::Failed { category, message }) => {
            eprintln!("{} {}", "✗".red(), message);
            eprintln!("  {}", category.help().dimmed());
            bail!("export failed ({})", category)
        }
    }
}

fn print_outcome(outcome: &ExportOutcome) {
    println!("{} Export complete", "✓".green());
    println!("  {:<14} {}", "File:", outcome.path.display());
    println!("  {:<14} {:.1} KB", "Size:", outcome.file_size_kb());
    println!("  {:<14} {}", "Chemicals:", outcome.chemical_count);
    println!("  {:<14} {}", "Successful:", outcome.successful_searches);
    println!("  {:<14} {}", "Format:", outcome.format.label());
    println!("  {:<14} {}", "Publications:", outcome.total_publications);
    println!("  {:<14} {}", "MIME type:", outcome.mime_type.dimmed());
}
