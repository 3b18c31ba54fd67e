//! Core type definitions for chemscreen

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a batch of chemicals searched together
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub String);

impl BatchId {
    /// Placeholder used when the caller has no batch identifier
    pub const UNKNOWN: &'static str = "unknown";

    /// Generate a new BatchId
    /// Format: YYYYMMDDHHMMSS-<short_uuid>
    pub fn generate() -> Self {
        let now = chrono::Utc::now();
        let uuid = Uuid::new_v4();
        let short_uuid = &uuid.to_string()[..8];
        BatchId(format!("{}-{}", now.format("%Y%m%d%H%M%S"), short_uuid))
    }

    /// Create from a string
    pub fn from_string(s: impl Into<String>) -> Self {
        BatchId(s.into())
    }

    /// BatchId used when none was recorded
    pub fn unknown() -> Self {
        BatchId(Self::UNKNOWN.to_string())
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File-name safe rendering (alphanumerics, `-` and `_` only)
    pub fn file_stem(&self) -> String {
        let stem: String = self
            .0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if stem.is_empty() {
            Self::UNKNOWN.to_string()
        } else {
            stem
        }
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Artifact format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Flat comma-separated values
    #[default]
    Csv,
    /// Multi-sheet XLSX workbook
    Spreadsheet,
    /// Structured JSON document
    Json,
}

impl ExportFormat {
    /// All supported formats
    pub const ALL: [ExportFormat; 3] = [
        ExportFormat::Csv,
        ExportFormat::Spreadsheet,
        ExportFormat::Json,
    ];

    /// Resolve a user selection, falling back to CSV for anything unrecognized
    pub fn from_selection(selection: &str) -> Self {
        match selection.parse() {
            Ok(format) => format,
            Err(_) => {
                tracing::warn!(
                    "Unknown export format '{}', falling back to CSV",
                    selection
                );
                ExportFormat::Csv
            }
        }
    }

    /// Short identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Spreadsheet => "spreadsheet",
            ExportFormat::Json => "json",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "CSV",
            ExportFormat::Spreadsheet => "Excel (XLSX)",
            ExportFormat::Json => "JSON",
        }
    }

    /// File extension without the dot
    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Spreadsheet => "xlsx",
            ExportFormat::Json => "json",
        }
    }

    /// MIME type for serving the artifact
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Json => "application/json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = crate::ChemScreenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" | "excel (xlsx)" | "spreadsheet" => Ok(ExportFormat::Spreadsheet),
            "json" => Ok(ExportFormat::Json),
            other => Err(crate::ChemScreenError::Validation(format!(
                "Unknown export format: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
