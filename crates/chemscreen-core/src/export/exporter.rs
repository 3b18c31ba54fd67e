//! Exporter trait and atomic artifact writes

use super::dataset::ExportDataset;
use crate::error::{ChemScreenError, Result};
use crate::types::ExportFormat;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Trait for format writers
pub trait Exporter: Send + Sync {
    /// Render a dataset to the artifact bytes
    fn render(&self, dataset: &ExportDataset) -> Result<Vec<u8>>;

    /// Get the format this exporter produces
    fn format(&self) -> ExportFormat;

    /// Get the file extension
    fn file_extension(&self) -> &str {
        self.format().file_extension()
    }

    /// Get the MIME type
    fn mime_type(&self) -> &str {
        self.format().mime_type()
    }

    /// Render and write the artifact to `path`, returning its size in bytes
    fn write(&self, dataset: &ExportDataset, path: &Path) -> Result<u64> {
        let bytes = self.render(dataset)?;
        write_atomic(path, &bytes)
    }
}

/// Write bytes next to `path` under a hidden temp name, then rename into place
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<u64> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            ChemScreenError::Validation(format!("Invalid export path: {}", path.display()))
        })?;
    let temp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let result = (|| -> Result<()> {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.flush()?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e.with_context(format!("Failed to write {}", path.display())));
    }

    debug!("Wrote {} bytes to {:?}", bytes.len(), path);
    Ok(bytes.len() as u64)
}
