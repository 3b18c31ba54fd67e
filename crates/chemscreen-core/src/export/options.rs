//! Export options chosen by the caller

use crate::types::ExportFormat;
use serde::{Deserialize, Serialize};

/// What to export and how
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Artifact format
    pub format: ExportFormat,
    /// Include batch id, search parameters and export timestamp
    pub include_metadata: bool,
    /// Include publication abstracts (no truncation)
    pub include_abstracts: bool,
}

impl ExportOptions {
    /// Options for a format with default toggles
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    /// Options from a free-form format selection; unknown selections become CSV
    pub fn from_selection(selection: &str, include_metadata: bool, include_abstracts: bool) -> Self {
        Self {
            format: ExportFormat::from_selection(selection),
            include_metadata,
            include_abstracts,
        }
    }

    /// Set whether to include metadata
    pub fn with_metadata(mut self, include: bool) -> Self {
        self.include_metadata = include;
        self
    }

    /// Set whether to include abstracts
    pub fn with_abstracts(mut self, include: bool) -> Self {
        self.include_abstracts = include;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            include_metadata: true,
            include_abstracts: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExportOptions::default();
        assert_eq!(options.format, ExportFormat::Csv);
        assert!(options.include_metadata);
        assert!(!options.include_abstracts);
    }

    #[test]
    fn test_from_selection() {
        let options = ExportOptions::from_selection("Excel (XLSX)", false, true);
        assert_eq!(options.format, ExportFormat::Spreadsheet);
        assert!(!options.include_metadata);
        assert!(options.include_abstracts);

        let fallback = ExportOptions::from_selection("parquet", true, false);
        assert_eq!(fallback.format, ExportFormat::Csv);
    }

    #[test]
    fn test_builder_methods() {
        let options = ExportOptions::new(ExportFormat::Json)
            .with_metadata(false)
            .with_abstracts(true);
        assert_eq!(options.format, ExportFormat::Json);
        assert!(!options.include_metadata);
        assert!(options.include_abstracts);
    }
}
