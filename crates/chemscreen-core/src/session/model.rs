//! Batch session data models

use crate::search::{Chemical, SearchResult};
use crate::types::BatchId;
use serde::{Deserialize, Serialize};

/// Status string for a batch whose searches have all finished
pub const STATUS_COMPLETED: &str = "completed";

/// Settings the literature search ran with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParameters {
    /// How many years back the search looked
    pub date_range_years: u32,
    /// Maximum publications fetched per chemical
    pub max_results: u32,
    /// Whether review articles were included
    pub include_reviews: bool,
    /// Whether cached search responses were used
    pub use_cache: bool,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            date_range_years: 10,
            max_results: 100,
            include_reviews: true,
            use_cache: true,
        }
    }
}

/// Snapshot of a batch search, assembled at export time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSearchSession {
    /// Batch identifier
    pub batch_id: BatchId,
    /// Chemicals that were searched
    pub chemicals: Vec<Chemical>,
    /// Parameters used for the search
    pub parameters: SearchParameters,
    /// Batch status, e.g. "completed"
    pub status: String,
}

impl BatchSearchSession {
    /// Create a completed session
    pub fn completed(
        batch_id: BatchId,
        chemicals: Vec<Chemical>,
        parameters: SearchParameters,
    ) -> Self {
        Self {
            batch_id,
            chemicals,
            parameters,
            status: STATUS_COMPLETED.to_string(),
        }
    }

    /// Number of chemicals in the batch
    pub fn chemical_count(&self) -> usize {
        self.chemicals.len()
    }

    /// Get session info summary
    pub fn info(&self, results: &[SearchResult]) -> SessionInfo {
        SessionInfo::new(self, results)
    }
}

/// Preview of what an export of this session will contain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Batch identifier
    pub batch_id: BatchId,
    /// Number of chemicals
    pub chemical_count: usize,
    /// Results without an error
    pub successful_searches: usize,
    /// Results with an error
    pub failed_searches: usize,
    /// Sum of publications across results
    pub total_publications: usize,
}

impl SessionInfo {
    fn new(session: &BatchSearchSession, results: &[SearchResult]) -> Self {
        let successful = results.iter().filter(|r| !r.is_failure()).count();
        Self {
            batch_id: session.batch_id.clone(),
            chemical_count: session.chemical_count(),
            successful_searches: successful,
            failed_searches: results.len() - successful,
            total_publications: crate::search::total_publications(results),
        }
    }
}
