//! Configuration management for chemscreen

use crate::error::{ChemScreenError, Result};
use crate::quality::DEFAULT_RECENCY_WINDOW_YEARS;
use crate::session::SearchParameters;
use crate::types::ExportFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default location of the project config file
pub const DEFAULT_CONFIG_PATH: &str = ".chemscreen/config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Export settings
    pub export: ExportConfig,
    /// Defaults for snapshots without search parameters
    pub search: SearchConfig,
    /// Quality scoring settings
    pub quality: QualityConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ChemScreenError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ChemScreenError::Toml(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        self.export
            .default_format
            .parse::<ExportFormat>()
            .map_err(|_| {
                ChemScreenError::Config(format!(
                    "export.default_format '{}' is not one of csv, excel, json",
                    self.export.default_format
                ))
            })?;

        if self.export.filename_prefix.trim().is_empty() {
            return Err(ChemScreenError::Config(
                "export.filename_prefix must not be empty".to_string(),
            ));
        }
        if self.quality.recency_window_years == 0 {
            return Err(ChemScreenError::Config(
                "quality.recency_window_years must be at least 1".to_string(),
            ));
        }
        if self.search.max_results == 0 {
            return Err(ChemScreenError::Config(
                "search.max_results must be at least 1".to_string(),
            ));
        }
        if !matches!(
            self.logging.level.as_str(),
            "error" | "warn" | "info" | "debug" | "trace"
        ) {
            return Err(ChemScreenError::Config(format!(
                "logging.level '{}' is not a valid level",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Serialize to pretty TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ChemScreenError::Toml(e.to_string()))
    }
}

/// Export-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory export files are written to; must already exist
    pub output_dir: PathBuf,
    /// Format used when none is given on the command line
    pub default_format: String,
    pub include_metadata: bool,
    pub include_abstracts: bool,
    /// Pretty-print JSON exports
    pub pretty_json: bool,
    /// First component of generated file names
    pub filename_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("exports"),
            default_format: "csv".to_string(),
            include_metadata: true,
            include_abstracts: false,
            pretty_json: true,
            filename_prefix: "chemscreen_export".to_string(),
        }
    }
}

/// Search parameter defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub date_range_years: u32,
    pub max_results: u32,
    pub include_reviews: bool,
    pub use_cache: bool,
}

impl SearchConfig {
    /// Parameters to assume when a snapshot does not record them
    pub fn parameters(&self) -> SearchParameters {
        SearchParameters {
            date_range_years: self.date_range_years,
            max_results: self.max_results,
            include_reviews: self.include_reviews,
            use_cache: self.use_cache,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        let params = SearchParameters::default();
        Self {
            date_range_years: params.date_range_years,
            max_results: params.max_results,
            include_reviews: params.include_reviews,
            use_cache: params.use_cache,
        }
    }
}

/// Quality scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Publications older than this many years get no recency credit
    pub recency_window_years: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            recency_window_years: DEFAULT_RECENCY_WINDOW_YEARS,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level used when neither RUST_LOG nor -v is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}
