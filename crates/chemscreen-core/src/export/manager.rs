//! Export manager: format dispatch, file naming and failure classification

use super::classify::{ErrorCategory, ErrorClassifier};
use super::csv_writer::CsvExporter;
use super::dataset::RecordBuilder;
use super::exporter::Exporter;
use super::json::JsonExporter;
use super::options::ExportOptions;
use super::progress::{CancelToken, ExportProgress, ExportStage, NoProgress};
use super::spreadsheet::SpreadsheetExporter;
use crate::config::ExportConfig;
use crate::error::{ChemScreenError, Result};
use crate::quality::QualityMetrics;
use crate::search::SearchResult;
use crate::session::BatchSearchSession;
use crate::types::{BatchId, ExportFormat};
use chrono::Utc;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Default first component of export file names
pub const DEFAULT_FILENAME_PREFIX: &str = "chemscreen_export";

/// Result of a successful export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    /// Absolute path of the written file
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
    /// Format actually written, after any fallback
    pub format: ExportFormat,
    /// Size in bytes
    pub file_size: u64,
    pub chemical_count: usize,
    pub successful_searches: usize,
    pub total_publications: usize,
}

impl ExportOutcome {
    /// File size in kilobytes
    pub fn file_size_kb(&self) -> f64 {
        self.file_size as f64 / 1024.0
    }
}

/// Why an export did not produce a file
#[derive(Debug, Error)]
pub enum ExportFailure {
    /// The cancel token was set before writing started
    #[error("Export cancelled")]
    Cancelled,

    /// Classified failure with a user-facing message
    #[error("{message}")]
    Failed {
        category: ErrorCategory,
        message: String,
    },
}

impl ExportFailure {
    /// Category of a failed export
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            ExportFailure::Cancelled => None,
            ExportFailure::Failed { category, .. } => Some(*category),
        }
    }

    /// Remediation guidance for a failed export
    pub fn help(&self) -> Option<&'static str> {
        self.category().map(|c| c.help())
    }
}

/// Manager for handling multiple export formats
pub struct ExportManager {
    export_dir: PathBuf,
    filename_prefix: String,
    exporters: HashMap<ExportFormat, Box<dyn Exporter>>,
}

impl ExportManager {
    /// Create a manager writing into `export_dir` with the default exporters
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        let mut manager = Self {
            export_dir: export_dir.into(),
            filename_prefix: DEFAULT_FILENAME_PREFIX.to_string(),
            exporters: HashMap::new(),
        };

        manager.register(Box::new(CsvExporter::new()));
        manager.register(Box::new(SpreadsheetExporter::new()));
        manager.register(Box::new(JsonExporter::pretty()));

        manager
    }

    /// Create a manager from the `[export]` config section
    pub fn from_config(config: &ExportConfig) -> Self {
        let mut manager = Self::new(config.output_dir.clone());
        manager.filename_prefix = config.filename_prefix.clone();
        manager.register(Box::new(JsonExporter::new(config.pretty_json)));
        manager
    }

    /// Register an exporter, replacing any existing one for its format
    pub fn register(&mut self, exporter: Box<dyn Exporter>) {
        self.exporters.insert(exporter.format(), exporter);
    }

    /// Check if a format is available
    pub fn has_format(&self, format: ExportFormat) -> bool {
        self.exporters.contains_key(&format)
    }

    /// Get list of available formats
    pub fn available_formats(&self) -> Vec<ExportFormat> {
        ExportFormat::ALL
            .iter()
            .copied()
            .filter(|f| self.has_format(*f))
            .collect()
    }

    /// Directory export files are written to
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Export scored results to one file in the export directory
    pub fn export(
        &self,
        session: &BatchSearchSession,
        results: &[(SearchResult, QualityMetrics)],
        options: ExportOptions,
    ) -> std::result::Result<ExportOutcome, ExportFailure> {
        self.export_with_progress(session, results, options, &NoProgress, &CancelToken::new())
    }

    /// Export with stage reporting and cooperative cancellation
    pub fn export_with_progress(
        &self,
        session: &BatchSearchSession,
        results: &[(SearchResult, QualityMetrics)],
        options: ExportOptions,
        progress: &dyn ExportProgress,
        cancel: &CancelToken,
    ) -> std::result::Result<ExportOutcome, ExportFailure> {
        progress.report(ExportStage::Collecting);

        let exporter = match self.exporter_for(options.format) {
            Ok(exporter) => exporter,
            Err(e) => return Err(self.fail(e, options.format)),
        };
        let options = ExportOptions {
            format: exporter.format(),
            ..options
        };

        if !self.export_dir.is_dir() {
            let err = ChemScreenError::ExportDirUnavailable(self.export_dir.clone());
            return Err(self.fail(err, options.format));
        }

        if cancel.is_cancelled() {
            info!("Export of batch {} cancelled", session.batch_id);
            return Err(ExportFailure::Cancelled);
        }
        progress.report(ExportStage::Building);
        let dataset = RecordBuilder::new(options).build(session, results);

        if cancel.is_cancelled() {
            info!("Export of batch {} cancelled", session.batch_id);
            return Err(ExportFailure::Cancelled);
        }
        progress.report(ExportStage::Writing);

        let file_name = self.unique_file_name(&session.batch_id, exporter.file_extension());
        let path = self.export_dir.join(&file_name);
        let file_size = exporter
            .write(&dataset, &path)
            .map_err(|e| self.fail(e, options.format))?;
        let path = fs::canonicalize(&path).unwrap_or(path);

        progress.report(ExportStage::Done);
        info!(
            "Exported batch {} as {} to {:?} ({} bytes)",
            session.batch_id,
            options.format.as_str(),
            path,
            file_size
        );

        Ok(ExportOutcome {
            path,
            file_name,
            mime_type: exporter.mime_type().to_string(),
            format: options.format,
            file_size,
            chemical_count: dataset.summary.chemicals_searched,
            successful_searches: dataset.summary.successful_searches,
            total_publications: dataset.summary.total_publications,
        })
    }

    /// File name unique per invocation
    pub fn unique_file_name(&self, batch_id: &BatchId, extension: &str) -> String {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S_%6f");
        let nonce = Uuid::new_v4().simple().to_string();
        format!(
            "{}_{}_{}_{}.{}",
            self.filename_prefix,
            batch_id.file_stem(),
            timestamp,
            &nonce[..8],
            extension
        )
    }

    fn exporter_for(&self, format: ExportFormat) -> Result<&dyn Exporter> {
        if let Some(exporter) = self.exporters.get(&format) {
            return Ok(exporter.as_ref());
        }

        warn!("No exporter registered for {}, falling back to CSV", format.as_str());
        self.exporters
            .get(&ExportFormat::Csv)
            .map(|e| e.as_ref())
            .ok_or_else(|| {
                ChemScreenError::Validation(format!("Unknown export format: {}", format.as_str()))
            })
    }

    fn fail(&self, err: ChemScreenError, format: ExportFormat) -> ExportFailure {
        let category = ErrorClassifier::classify(&err, format);
        error!("Export failed ({}): {}", category, err);
        debug!("Export failure detail: {:?}", err);
        ExportFailure::Failed {
            category,
            message: ErrorClassifier::user_message(category, &err),
        }
    }
}
