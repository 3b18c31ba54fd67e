//! JSON exporter
//!
//! The JSON document is the reference representation of an export: the CSV
//! rows are `results` with the `metadata` entries appended, and the
//! spreadsheet sheets mirror its three keys.

use super::dataset::{ExportDataset, ExportMetadata, ExportSummary};
use super::exporter::Exporter;
use super::record::FlatRecord;
use crate::error::Result;
use crate::types::ExportFormat;
use serde::Serialize;

/// JSON exporter with pretty-print support
pub struct JsonExporter {
    /// Whether to use pretty-print formatting
    pretty: bool,
}

impl JsonExporter {
    /// Create a new JSON exporter
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Create a pretty-printed JSON exporter
    pub fn pretty() -> Self {
        Self::new(true)
    }

    /// Create a compact JSON exporter
    pub fn compact() -> Self {
        Self::new(false)
    }
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self::pretty()
    }
}

impl Exporter for JsonExporter {
    fn render(&self, dataset: &ExportDataset) -> Result<Vec<u8>> {
        let document = ExportDocument::from_dataset(dataset);

        let bytes = if self.pretty {
            serde_json::to_vec_pretty(&document)?
        } else {
            serde_json::to_vec(&document)?
        };

        Ok(bytes)
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }
}

/// Exported document structure
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    /// Aggregate counts
    pub summary: &'a ExportSummary,
    /// Flat records
    pub results: &'a [FlatRecord],
    /// Session metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<&'a ExportMetadata>,
}

impl<'a> ExportDocument<'a> {
    /// Borrow the sections of a dataset
    pub fn from_dataset(dataset: &'a ExportDataset) -> Self {
        Self {
            summary: &dataset.summary,
            results: &dataset.records,
            metadata: dataset.metadata.as_ref(),
        }
    }
}
