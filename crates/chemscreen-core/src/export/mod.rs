//! Export functionality for batch search results
//!
//! Scored search results are flattened into [`FlatRecord`]s by the
//! [`RecordBuilder`], then written by one of the format exporters:
//! - CSV (one row per record, metadata denormalized into every row)
//! - Spreadsheet (XLSX with Summary, Detailed Results and Metadata sheets)
//! - JSON (summary, results and metadata sections)
//!
//! The [`ExportManager`] ties these together: it dispatches on
//! [`ExportFormat`](crate::types::ExportFormat), names and writes the file,
//! and classifies failures into user-facing categories.
//!
//! # Example
//!
//! ```ignore
//! use chemscreen_core::export::{ExportManager, ExportOptions};
//!
//! let manager = ExportManager::new("exports");
//! let outcome = manager.export(&session, &scored, ExportOptions::from_selection("excel", true, false))?;
//! println!("{} ({:.1} KB)", outcome.path.display(), outcome.file_size_kb());
//! ```

mod classify;
mod csv_writer;
mod dataset;
mod exporter;
mod json;
mod manager;
mod options;
mod progress;
mod record;
mod spreadsheet;

pub use classify::{ErrorCategory, ErrorClassifier};
pub use csv_writer::CsvExporter;
pub use dataset::{
    ChemicalSummary, ExportDataset, ExportMetadata, ExportSummary, MetadataPlacement,
    RecordBuilder,
};
pub use exporter::{write_atomic, Exporter};
pub use json::{ExportDocument, JsonExporter};
pub use manager::{ExportFailure, ExportManager, ExportOutcome, DEFAULT_FILENAME_PREFIX};
pub use options::ExportOptions;
pub use progress::{CancelToken, ExportProgress, ExportStage, NoProgress};
pub use record::{fields, header_union, FieldValue, FlatRecord};
pub use spreadsheet::{
    SheetPlan, SpreadsheetExporter, WorkbookPlan, DETAILS_SHEET, METADATA_SHEET, SUMMARY_SHEET,
};
