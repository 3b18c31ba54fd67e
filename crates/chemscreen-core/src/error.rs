//! Error types for chemscreen

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for chemscreen
#[derive(Debug, Error)]
pub enum ChemScreenError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Spreadsheet library error
    #[error("Spreadsheet error (rust_xlsxwriter): {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Export directory missing or not a directory
    #[error("Export directory is not accessible: {0}")]
    ExportDirUnavailable(PathBuf),

    /// Snapshot not found
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Export cancelled by the caller
    #[error("Export cancelled")]
    Cancelled,

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ChemScreenError>,
    },
}

impl ChemScreenError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ChemScreenError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Strip any context wrappers and return the underlying error
    pub fn root(&self) -> &ChemScreenError {
        match self {
            ChemScreenError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for chemscreen
pub type Result<T> = std::result::Result<T, ChemScreenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChemScreenError::SnapshotNotFound("batch-42".to_string());
        assert_eq!(err.to_string(), "Snapshot not found: batch-42");
    }

    #[test]
    fn test_error_with_context() {
        let err = ChemScreenError::Validation("missing chemical name".to_string());
        let err = err.with_context("Failed to load snapshot");
        assert!(err.to_string().contains("Failed to load snapshot"));
        assert!(matches!(err.root(), ChemScreenError::Validation(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ChemScreenError = io_err.into();
        assert!(matches!(err, ChemScreenError::Io(_)));
    }

    #[test]
    fn test_spreadsheet_error_names_library() {
        let err: ChemScreenError = rust_xlsxwriter::XlsxError::MaxStringLengthExceeded.into();
        assert!(err.to_string().contains("xlsx"));
    }
}
