//! CSV exporter

use super::dataset::ExportDataset;
use super::exporter::Exporter;
use crate::error::Result;
use crate::types::ExportFormat;

/// CSV exporter: one row per flat record, header is the field-name union
pub struct CsvExporter;

impl CsvExporter {
    /// Create a new CSV exporter
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for CsvExporter {
    fn render(&self, dataset: &ExportDataset) -> Result<Vec<u8>> {
        let columns = dataset.columns();
        let mut writer = csv::Writer::from_writer(Vec::new());

        if !columns.is_empty() {
            writer.write_record(&columns)?;
            for record in &dataset.records {
                writer.write_record(record.values_for(&columns).map(|v| v.to_cell_string()))?;
            }
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| std::io::Error::new(e.error().kind(), e.error().to_string()))?;
        Ok(bytes)
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }
}
