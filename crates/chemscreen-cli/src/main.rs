//! chemscreen - batch literature search export CLI
//!
//! Exports the results of a batch chemical literature search to CSV,
//! Excel or JSON, with per-chemical quality scores.
//!
//! ## Quick Start
//!
//! ```bash
//! # Store the search pipeline's output
//! chemscreen snapshot import results.json
//!
//! # Check what will be exported
//! chemscreen preview
//!
//! # Export the latest batch as a spreadsheet
//! chemscreen export --format excel --output-dir exports/
//! ```

mod cancellation;
mod commands;
mod progress;

fn main() {
    if let Err(err) = commands::run() {
        if cancellation::is_cancelled_error(&err) {
            eprintln!("^C\nExport cancelled by user");
        } else {
            eprintln!("Error: {:#}", err);
        }
        std::process::exit(cancellation::exit_code(&err));
    }
}
