//! Preview command
//!
//! Show what an export would include without writing anything.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

use chemscreen_core::config::Config;
use chemscreen_core::export::{ExportOptions, DETAILS_SHEET, METADATA_SHEET, SUMMARY_SHEET};
use chemscreen_core::types::ExportFormat;

use super::export::ExportChoiceArgs;
use super::SourceArgs;

/// Arguments for the preview command
#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub choice: ExportChoiceArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the preview command
pub fn execute(args: PreviewArgs, config: &Config, store_dir: Option<&Path>) -> Result<()> {
    let snapshot = args.source.load(store_dir)?;
    let (session, results) = snapshot.into_session(&config.search.parameters());
    let info = session.info(&results);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let options = args.choice.options(config);
    let yes_no = |b: bool| if b { "yes".green() } else { "no".dimmed() };

    println!("{}", "Export will include:".bold().underline());
    println!();
    println!("  Batch:          {}", info.batch_id.to_string().cyan());
    println!("  Chemicals:      {}", info.chemical_count);
    println!("  Successful:     {}", info.successful_searches.to_string().green());
    println!("  Failed:         {}", info.failed_searches.to_string().red());
    println!("  Publications:   {}", info.total_publications);
    println!("  Format:         {}", options.format.label());
    println!("  Metadata:       {}", yes_no(options.include_metadata));
    println!("  Abstracts:      {}", yes_no(options.include_abstracts));
    if let Some(sheets) = sheet_layout(&options) {
        println!("  Sheets:         {}", sheets.join(", "));
    }
    println!(
        "  Directory:      {}",
        config.export.output_dir.display().to_string().dimmed()
    );

    Ok(())
}

/// Sheet names a spreadsheet export will contain
fn sheet_layout(options: &ExportOptions) -> Option<Vec<&'static str>> {
    if options.format != ExportFormat::Spreadsheet {
        return None;
    }
    let mut sheets = vec![SUMMARY_SHEET, DETAILS_SHEET];
    if options.include_metadata {
        sheets.push(METADATA_SHEET);
    }
    Some(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: PreviewArgs,
    }

    fn parse(argv: &[&str]) -> PreviewArgs {
        let mut full = vec!["test"];
        full.extend_from_slice(argv);
        TestCli::parse_from(full).args
    }

    #[test]
    fn test_preview_follows_flags() {
        let options = parse(&["--abstracts", "--no-metadata"])
            .choice
            .options(&Config::default());
        assert!(options.include_abstracts);
        assert!(!options.include_metadata);
    }

    #[test]
    fn test_sheet_layout() {
        let excel = parse(&["--format", "excel"]).choice.options(&Config::default());
        assert_eq!(
            sheet_layout(&excel),
            Some(vec!["Summary", "Detailed Results", "Metadata"])
        );

        let no_metadata = parse(&["--format", "excel", "--no-metadata"])
            .choice
            .options(&Config::default());
        assert_eq!(
            sheet_layout(&no_metadata),
            Some(vec!["Summary", "Detailed Results"])
        );

        let csv = parse(&["--format", "csv"]).choice.options(&Config::default());
        assert_eq!(sheet_layout(&csv), None);
    }
}
