//! Search result data models

use crate::error::{ChemScreenError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A chemical submitted for literature search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chemical {
    /// Common or IUPAC name
    pub name: String,
    /// CAS registry number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cas_number: Option<String>,
}

impl Chemical {
    /// Create a chemical with a name only
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cas_number: None,
        }
    }

    /// Create a chemical with a CAS registry number
    pub fn with_cas(name: impl Into<String>, cas_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cas_number: Some(cas_number.into()),
        }
    }
}

impl fmt::Display for Chemical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cas_number {
            Some(cas) => write!(f, "{} ({})", self.name, cas),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A publication matched by the search pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    /// Title
    pub title: String,
    /// Authors in citation order
    #[serde(default)]
    pub authors: Vec<String>,
    /// Journal or conference
    #[serde(default)]
    pub venue: String,
    /// Publication year
    #[serde(default)]
    pub year: Option<i32>,
    /// Abstract text
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    /// DOI, PMID or other external identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

impl Publication {
    /// Authors joined for display in a single cell
    pub fn authors_display(&self) -> String {
        self.authors.join("; ")
    }
}

/// Outcome of the search for one chemical
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStatus {
    /// Search succeeded with at least one publication
    Success,
    /// Search succeeded but matched nothing
    Partial,
    /// Search failed
    Failure,
}

impl SearchStatus {
    /// Stable string form used in exports
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStatus::Success => "success",
            SearchStatus::Partial => "partial",
            SearchStatus::Failure => "failure",
        }
    }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Search result for a single chemical
///
/// A result carrying an error never carries publications; this is checked
/// on construction and on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSearchResult")]
pub struct SearchResult {
    /// Chemical that was searched
    pub chemical: Chemical,
    /// Matched publications in relevance order
    pub publications: Vec<Publication>,
    /// Error message if the search failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the search completed
    pub timestamp: DateTime<Utc>,
}

impl SearchResult {
    /// Create a successful result
    pub fn success(
        chemical: Chemical,
        publications: Vec<Publication>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            chemical,
            publications,
            error: None,
            timestamp,
        }
    }

    /// Create a failed result
    pub fn failure(chemical: Chemical, error: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            chemical,
            publications: Vec::new(),
            error: Some(error.into()),
            timestamp,
        }
    }

    /// Whether the search failed
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Number of matched publications
    pub fn publication_count(&self) -> usize {
        self.publications.len()
    }

    /// Classify the outcome
    pub fn status(&self) -> SearchStatus {
        if self.error.is_some() {
            SearchStatus::Failure
        } else if self.publications.is_empty() {
            SearchStatus::Partial
        } else {
            SearchStatus::Success
        }
    }
}

/// Wire shape of a search result before invariant checks
#[derive(Deserialize)]
struct RawSearchResult {
    chemical: Chemical,
    #[serde(default)]
    publications: Vec<Publication>,
    #[serde(default)]
    error: Option<String>,
    timestamp: DateTime<Utc>,
}

impl TryFrom<RawSearchResult> for SearchResult {
    type Error = ChemScreenError;

    fn try_from(raw: RawSearchResult) -> Result<Self> {
        if raw.error.is_some() && !raw.publications.is_empty() {
            return Err(ChemScreenError::Validation(format!(
                "Search result for '{}' has an error and {} publications",
                raw.chemical.name,
                raw.publications.len()
            )));
        }

        Ok(Self {
            chemical: raw.chemical,
            publications: raw.publications,
            error: raw.error,
            timestamp: raw.timestamp,
        })
    }
}

/// Total publications across results
pub fn total_publications(results: &[SearchResult]) -> usize {
    results.iter().map(SearchResult::publication_count).sum()
}
