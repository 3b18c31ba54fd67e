//! Export failure classification
//!
//! Maps an export error to one of five categories, each with a user-facing
//! message prefix and remediation help. Typed signals are checked first
//! (I/O error kinds anywhere in the source chain, spreadsheet library
//! errors); the error text is only consulted when nothing typed matches.

use crate::error::ChemScreenError;
use crate::types::ExportFormat;
use rust_xlsxwriter::XlsxError;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::io::ErrorKind;

/// Category of an export failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    #[serde(rename = "file_permission_error")]
    FilePermission,
    #[serde(rename = "disk_space_error")]
    DiskSpace,
    #[serde(rename = "large_dataset_error")]
    LargeDataset,
    #[serde(rename = "excel_error")]
    Excel,
    #[serde(rename = "export_failed")]
    ExportFailed,
}

impl ErrorCategory {
    /// Stable category name
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::FilePermission => "file_permission_error",
            ErrorCategory::DiskSpace => "disk_space_error",
            ErrorCategory::LargeDataset => "large_dataset_error",
            ErrorCategory::Excel => "excel_error",
            ErrorCategory::ExportFailed => "export_failed",
        }
    }

    /// Prefix shown before the underlying error message
    pub fn message_prefix(&self) -> &'static str {
        match self {
            ErrorCategory::FilePermission => "Cannot write export file",
            ErrorCategory::DiskSpace => "Insufficient disk space",
            ErrorCategory::LargeDataset => "Dataset too large for export",
            ErrorCategory::Excel => "Spreadsheet export failed",
            ErrorCategory::ExportFailed => "Export generation failed",
        }
    }

    /// Remediation guidance
    pub fn help(&self) -> &'static str {
        match self {
            ErrorCategory::FilePermission => {
                "Check that the export directory exists and is writable, and that the file is not open in another program."
            }
            ErrorCategory::DiskSpace => "Free up disk space or choose another export directory.",
            ErrorCategory::LargeDataset => {
                "Export fewer chemicals at a time, or use CSV or JSON for large batches."
            }
            ErrorCategory::Excel => {
                "Try exporting as CSV instead; it opens in any spreadsheet application."
            }
            ErrorCategory::ExportFailed => {
                "Retry the export; if it keeps failing, run with -v for details."
            }
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifies export errors
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error raised while exporting `format`
    pub fn classify(error: &ChemScreenError, format: ExportFormat) -> ErrorCategory {
        Self::classify_typed(error, format)
            .unwrap_or_else(|| Self::classify_message(&error.root().to_string(), format))
    }

    /// Build the user-facing message for a classified error
    pub fn user_message(category: ErrorCategory, error: &ChemScreenError) -> String {
        format!("{}: {}", category.message_prefix(), error)
    }

    fn classify_typed(error: &ChemScreenError, format: ExportFormat) -> Option<ErrorCategory> {
        match error.root() {
            ChemScreenError::ExportDirUnavailable(_) => {
                return Some(ErrorCategory::FilePermission)
            }
            ChemScreenError::Spreadsheet(XlsxError::RowColumnLimitError) => {
                return Some(ErrorCategory::LargeDataset)
            }
            ChemScreenError::Spreadsheet(XlsxError::IoError(io)) => {
                if let Some(category) = Self::io_kind_category(io.kind()) {
                    return Some(category);
                }
            }
            _ => {}
        }

        // Walk the whole source chain for an io::Error
        let mut current: Option<&(dyn StdError + 'static)> = Some(error);
        while let Some(err) = current {
            if let Some(io) = err.downcast_ref::<std::io::Error>() {
                if let Some(category) = Self::io_kind_category(io.kind()) {
                    return Some(category);
                }
            }
            current = err.source();
        }

        match error.root() {
            ChemScreenError::Spreadsheet(_) if format == ExportFormat::Spreadsheet => {
                Some(ErrorCategory::Excel)
            }
            _ => None,
        }
    }

    fn io_kind_category(kind: ErrorKind) -> Option<ErrorCategory> {
        match kind {
            ErrorKind::PermissionDenied => Some(ErrorCategory::FilePermission),
            ErrorKind::StorageFull => Some(ErrorCategory::DiskSpace),
            ErrorKind::OutOfMemory => Some(ErrorCategory::LargeDataset),
            _ => None,
        }
    }

    /// Keyword fallback over the root error text, leaving out context paths
    fn classify_message(message: &str, format: ExportFormat) -> ErrorCategory {
        let lower = message.to_lowercase();

        if lower.contains("permission") || lower.contains("access") {
            ErrorCategory::FilePermission
        } else if lower.contains("disk") || lower.contains("space") {
            ErrorCategory::DiskSpace
        } else if lower.contains("memory") || lower.contains("too large") {
            ErrorCategory::LargeDataset
        } else if lower.contains("xlsx") && format == ExportFormat::Spreadsheet {
            ErrorCategory::Excel
        } else {
            ErrorCategory::ExportFailed
        }
    }
}
