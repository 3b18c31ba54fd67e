//! File system storage for batch snapshots

use chemscreen_core::error::{ChemScreenError, Result};
use chemscreen_core::search::{Chemical, SearchResult};
use chemscreen_core::session::{BatchSearchSession, SearchParameters, SessionInfo, STATUS_COMPLETED};
use chemscreen_core::types::BatchId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Results of a finished batch search as handed over by the search pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSnapshot {
    /// Batch identifier; assigned on save when absent
    #[serde(default)]
    pub batch_id: Option<BatchId>,
    /// Batch status
    #[serde(default)]
    pub status: Option<String>,
    /// Chemicals in the batch; derived from results when empty
    #[serde(default)]
    pub chemicals: Vec<Chemical>,
    /// One result per searched chemical
    pub results: Vec<SearchResult>,
    /// Search parameters; config defaults apply when absent
    #[serde(default)]
    pub parameters: Option<SearchParameters>,
    /// When the snapshot was stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl BatchSnapshot {
    /// Create a snapshot from search results
    pub fn new(batch_id: BatchId, chemicals: Vec<Chemical>, results: Vec<SearchResult>) -> Self {
        Self {
            batch_id: Some(batch_id),
            status: None,
            chemicals,
            results,
            parameters: None,
            saved_at: None,
        }
    }

    /// Set the search parameters
    pub fn with_parameters(mut self, parameters: SearchParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Batch id, or "unknown" when the snapshot has none
    pub fn batch_id(&self) -> BatchId {
        self.batch_id.clone().unwrap_or_default()
    }

    /// Split into the session and its results, filling gaps from `defaults`
    pub fn into_session(self, defaults: &SearchParameters) -> (BatchSearchSession, Vec<SearchResult>) {
        let batch_id = self.batch_id.unwrap_or_default();
        let chemicals = if self.chemicals.is_empty() {
            self.results.iter().map(|r| r.chemical.clone()).collect()
        } else {
            self.chemicals
        };

        let session = BatchSearchSession {
            batch_id,
            chemicals,
            parameters: self.parameters.unwrap_or_else(|| defaults.clone()),
            status: self.status.unwrap_or_else(|| STATUS_COMPLETED.to_string()),
        };

        (session, self.results)
    }

    /// Summary of the snapshot without consuming it
    pub fn info(&self) -> SnapshotInfo {
        let (session, results) = self.clone().into_session(&SearchParameters::default());
        SnapshotInfo {
            summary: session.info(&results),
            saved_at: self.saved_at,
        }
    }
}

/// Listing entry for a stored snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotInfo {
    #[serde(flatten)]
    pub summary: SessionInfo,
    pub saved_at: Option<DateTime<Utc>>,
}

/// Trait for snapshot storage implementations
pub trait SnapshotStorage: Send + Sync {
    /// Save a snapshot, returning the batch id it was stored under
    fn save(&self, snapshot: &BatchSnapshot) -> Result<BatchId>;

    /// Load a snapshot by batch id
    fn load(&self, id: &BatchId) -> Result<BatchSnapshot>;

    /// List all snapshots, most recently saved first
    fn list(&self) -> Result<Vec<SnapshotInfo>>;

    /// Delete a snapshot
    fn delete(&self, id: &BatchId) -> Result<()>;

    /// Check if a snapshot exists
    fn exists(&self, id: &BatchId) -> bool;

    /// Get the most recently saved snapshot
    fn latest(&self) -> Result<Option<BatchSnapshot>> {
        match self.list()?.into_iter().next() {
            Some(info) => self.load(&info.summary.batch_id).map(Some),
            None => Ok(None),
        }
    }
}

/// File system based snapshot storage
pub struct FileSystemStorage {
    /// Base directory for storage
    base_dir: PathBuf,
    /// Snapshots subdirectory
    snapshots_dir: PathBuf,
}

impl FileSystemStorage {
    /// Create a new file system storage
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let snapshots_dir = base_dir.join("snapshots");

        let storage = Self {
            base_dir,
            snapshots_dir,
        };

        storage.ensure_dirs()?;
        Ok(storage)
    }

    /// Create storage in the platform data directory (fallback ~/.chemscreen)
    pub fn default_location() -> Result<Self> {
        Self::new(Self::default_base_dir())
    }

    /// Platform data directory used by [`FileSystemStorage::default_location`]
    pub fn default_base_dir() -> PathBuf {
        directories::ProjectDirs::from("org", "chemscreen", "chemscreen")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".chemscreen")
            })
    }

    /// Read a snapshot from any JSON file
    pub fn load_file(path: &Path) -> Result<BatchSnapshot> {
        let file = fs::File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ChemScreenError::FileNotFound(path.to_path_buf())
            } else {
                ChemScreenError::Io(e)
            }
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            ChemScreenError::from(e).with_context(format!("Invalid snapshot {}", path.display()))
        })
    }

    /// Copy a snapshot file into the store
    pub fn import(&self, path: &Path) -> Result<BatchId> {
        let snapshot = Self::load_file(path)?;
        let id = self.save(&snapshot)?;
        info!("Imported snapshot {} from {:?}", id, path);
        Ok(id)
    }

    /// Ensure required directories exist
    fn ensure_dirs(&self) -> Result<()> {
        if !self.snapshots_dir.exists() {
            fs::create_dir_all(&self.snapshots_dir).map_err(|e| {
                ChemScreenError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create snapshots directory: {}", e),
                ))
            })?;
            debug!("Created snapshots directory: {:?}", self.snapshots_dir);
        }
        Ok(())
    }

    fn snapshot_path(&self, id: &BatchId) -> PathBuf {
        self.snapshots_dir.join(format!("{}.json", id.file_stem()))
    }

    fn temp_path(&self, id: &BatchId) -> PathBuf {
        self.snapshots_dir.join(format!(".{}.json.tmp", id.file_stem()))
    }

    /// Write snapshot atomically (write to temp, then rename)
    fn atomic_write(&self, id: &BatchId, snapshot: &BatchSnapshot) -> Result<()> {
        let temp_path = self.temp_path(id);
        let final_path = self.snapshot_path(id);

        let temp_file = fs::File::create(&temp_path).map_err(|e| {
            ChemScreenError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create temp file: {}", e),
            ))
        })?;
        let mut writer = BufWriter::new(temp_file);
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writer.flush()?;

        fs::rename(&temp_path, &final_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            ChemScreenError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to rename temp file: {}", e),
            ))
        })?;

        debug!("Saved snapshot {} to {:?}", id, final_path);
        Ok(())
    }

    /// Get base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get snapshots directory
    pub fn snapshots_dir(&self) -> &PathBuf {
        &self.snapshots_dir
    }
}

impl SnapshotStorage for FileSystemStorage {
    fn save(&self, snapshot: &BatchSnapshot) -> Result<BatchId> {
        let id = snapshot.batch_id.clone().unwrap_or_else(BatchId::generate);
        let stored = BatchSnapshot {
            batch_id: Some(id.clone()),
            saved_at: Some(Utc::now()),
            ..snapshot.clone()
        };
        self.atomic_write(&id, &stored)?;
        Ok(id)
    }

    fn load(&self, id: &BatchId) -> Result<BatchSnapshot> {
        let path = self.snapshot_path(id);
        if !path.exists() {
            return Err(ChemScreenError::SnapshotNotFound(id.to_string()));
        }
        Self::load_file(&path)
    }

    fn list(&self) -> Result<Vec<SnapshotInfo>> {
        let mut snapshots = Vec::new();

        let entries = fs::read_dir(&self.snapshots_dir).map_err(|e| {
            ChemScreenError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read snapshots directory: {}", e),
            ))
        })?;

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Failed to read directory entry: {}", e);
                    continue;
                }
            };

            let path = entry.path();

            // Skip non-json files and temp files
            if !path.extension().map(|e| e == "json").unwrap_or(false) {
                continue;
            }
            if path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with('.'))
                .unwrap_or(false)
            {
                continue;
            }

            match Self::load_file(&path) {
                Ok(snapshot) => snapshots.push(snapshot.info()),
                Err(e) => {
                    warn!("Failed to read snapshot file {:?}: {}", path, e);
                }
            }
        }

        snapshots.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(snapshots)
    }

    fn delete(&self, id: &BatchId) -> Result<()> {
        let path = self.snapshot_path(id);

        if !path.exists() {
            return Err(ChemScreenError::SnapshotNotFound(id.to_string()));
        }

        fs::remove_file(&path).map_err(|e| {
            ChemScreenError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to delete snapshot file: {}", e),
            ))
        })?;

        debug!("Deleted snapshot {} from {:?}", id, path);
        Ok(())
    }

    fn exists(&self, id: &BatchId) -> bool {
        self.snapshot_path(id).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemscreen_core::search::PublicationBuilder;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn create_test_storage() -> (FileSystemStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileSystemStorage::new(temp_dir.path()).unwrap();
        (storage, temp_dir)
    }

    fn create_test_snapshot(id: &str) -> BatchSnapshot {
        let benzene = Chemical::with_cas("Benzene", "71-43-2");
        let toluene = Chemical::new("Toluene");
        BatchSnapshot::new(
            BatchId::from_string(id),
            vec![benzene.clone(), toluene.clone()],
            vec![
                SearchResult::success(
                    benzene,
                    vec![
                        PublicationBuilder::new("One").build(),
                        PublicationBuilder::new("Two").build(),
                    ],
                    Utc::now(),
                ),
                SearchResult::failure(toluene, "timeout", Utc::now()),
            ],
        )
    }

    #[test]
    fn test_storage_creation() {
        let (storage, _temp) = create_test_storage();
        assert!(storage.snapshots_dir().exists());
    }

    #[test]
    fn test_save_and_load() {
        let (storage, _temp) = create_test_storage();
        let snapshot = create_test_snapshot("batch-1");

        let id = storage.save(&snapshot).unwrap();
        assert_eq!(id.as_str(), "batch-1");
        assert!(storage.exists(&id));

        let loaded = storage.load(&id).unwrap();
        assert_eq!(loaded.results.len(), 2);
        assert!(loaded.saved_at.is_some());
        assert!(loaded.results[1].is_failure());
    }

    #[test]
    fn test_save_assigns_batch_id() {
        let (storage, _temp) = create_test_storage();
        let mut snapshot = create_test_snapshot("ignored");
        snapshot.batch_id = None;

        let id = storage.save(&snapshot).unwrap();
        assert_ne!(id, BatchId::unknown());
        assert_eq!(storage.load(&id).unwrap().batch_id, Some(id));
    }

    #[test]
    fn test_load_nonexistent() {
        let (storage, _temp) = create_test_storage();
        let result = storage.load(&BatchId::from_string("nope"));
        assert!(matches!(result, Err(ChemScreenError::SnapshotNotFound(_))));
    }

    #[test]
    fn test_list_and_latest() {
        let (storage, _temp) = create_test_storage();
        assert!(storage.list().unwrap().is_empty());
        assert!(storage.latest().unwrap().is_none());

        storage.save(&create_test_snapshot("first")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(10));
        storage.save(&create_test_snapshot("second")).unwrap();

        let list = storage.list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].summary.batch_id.as_str(), "second");
        assert_eq!(list[0].summary.total_publications, 2);
        assert_eq!(list[0].summary.failed_searches, 1);

        let latest = storage.latest().unwrap().unwrap();
        assert_eq!(latest.batch_id(), BatchId::from_string("second"));
    }

    #[test]
    fn test_delete_snapshot() {
        let (storage, _temp) = create_test_storage();
        let id = storage.save(&create_test_snapshot("batch-1")).unwrap();

        storage.delete(&id).unwrap();
        assert!(!storage.exists(&id));
        assert!(storage.delete(&id).is_err());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp() {
        let (storage, _temp) = create_test_storage();
        let id = storage.save(&create_test_snapshot("batch-1")).unwrap();

        assert!(!storage.temp_path(&id).exists());
        let content = fs::read_to_string(storage.snapshot_path(&id)).unwrap();
        assert!(content.contains("batch-1"));
    }

    #[test]
    fn test_ignores_temp_and_non_json_files() {
        let (storage, _temp) = create_test_storage();
        fs::write(storage.snapshots_dir().join(".temp.json.tmp"), "{}").unwrap();
        fs::write(storage.snapshots_dir().join("readme.txt"), "test").unwrap();
        fs::write(storage.snapshots_dir().join("broken.json"), "{").unwrap();

        assert!(storage.list().unwrap().is_empty());
    }

    #[test]
    fn test_into_session_fills_defaults() {
        let json = r#"{
            "results": [
                {"chemical": {"name": "Benzene"}, "publications": [], "timestamp": "2024-01-01T00:00:00Z"}
            ]
        }"#;
        let snapshot: BatchSnapshot = serde_json::from_str(json).unwrap();
        let defaults = SearchParameters {
            max_results: 25,
            ..Default::default()
        };

        let (session, results) = snapshot.into_session(&defaults);
        assert_eq!(session.batch_id, BatchId::unknown());
        assert_eq!(session.status, STATUS_COMPLETED);
        assert_eq!(session.parameters.max_results, 25);
        assert_eq!(session.chemicals, vec![Chemical::new("Benzene")]);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_load_file_rejects_error_with_publications() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        let json = r#"{
            "results": [{
                "chemical": {"name": "Benzene"},
                "publications": [{"title": "x"}],
                "error": "timeout",
                "timestamp": "2024-01-01T00:00:00Z"
            }]
        }"#;
        fs::write(&path, json).unwrap();

        let err = FileSystemStorage::load_file(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid snapshot"));
    }

    #[test]
    fn test_import() {
        let (storage, temp) = create_test_storage();
        let path = temp.path().join("export.json");
        fs::write(&path, serde_json::to_string(&create_test_snapshot("imported")).unwrap()).unwrap();

        let id = storage.import(&path).unwrap();
        assert_eq!(id.as_str(), "imported");
        assert!(storage.exists(&id));
    }
}
