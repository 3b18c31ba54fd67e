//! Quality metrics for search results
//!
//! Scores are derived on demand from a [`SearchResult`] and never stored, so
//! every export reflects the current scoring logic. Scoring is deterministic:
//! recency is measured against the result's own timestamp, not the wall clock.

use crate::search::{Publication, SearchResult};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default recency window in years
pub const DEFAULT_RECENCY_WINDOW_YEARS: u32 = 10;

const RELEVANCE_WEIGHT: f64 = 0.4;
const COMPLETENESS_WEIGHT: f64 = 0.3;
const RECENCY_WEIGHT: f64 = 0.3;

/// Publications below this count never rate above low confidence
const MIN_PUBLICATIONS_FOR_CONFIDENCE: usize = 3;

/// Confidence in a chemical's literature coverage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    None,
}

impl ConfidenceLevel {
    /// Stable string form used in exports
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::None => "none",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derived quality signals for one search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Number of publications scored
    pub publication_count: usize,
    /// How recent the publications are, 0..=1
    pub recency_score: f64,
    /// How complete the bibliographic records are, 0..=1
    pub completeness_score: f64,
    /// Share of publications mentioning the chemical, 0..=1
    pub relevance_score: f64,
    /// Weighted combination of the scores above
    pub overall_score: f64,
    /// Coarse confidence bucket
    pub confidence: ConfidenceLevel,
}

impl QualityMetrics {
    /// Neutral metrics for failed or empty results
    pub fn empty() -> Self {
        Self {
            publication_count: 0,
            recency_score: 0.0,
            completeness_score: 0.0,
            relevance_score: 0.0,
            overall_score: 0.0,
            confidence: ConfidenceLevel::None,
        }
    }
}

/// Strategy for scoring a search result
pub trait QualityScorer: Send + Sync {
    /// Score a result. Must be total and deterministic.
    fn score(&self, result: &SearchResult) -> QualityMetrics;
}

/// Built-in scorer: recency, completeness and chemical-mention relevance
#[derive(Debug, Clone)]
pub struct DefaultQualityScorer {
    recency_window_years: u32,
}

impl DefaultQualityScorer {
    /// Create a scorer with the default recency window
    pub fn new() -> Self {
        Self::with_recency_window(DEFAULT_RECENCY_WINDOW_YEARS)
    }

    /// Create a scorer with a custom recency window (minimum 1 year)
    pub fn with_recency_window(years: u32) -> Self {
        Self {
            recency_window_years: years.max(1),
        }
    }

    fn recency(&self, publication: &Publication, reference_year: i32) -> f64 {
        let Some(year) = publication.year else {
            return 0.0;
        };
        let age = (i64::from(reference_year) - i64::from(year)).max(0) as f64;
        (1.0 - age / self.recency_window_years as f64).max(0.0)
    }

    fn completeness(publication: &Publication) -> f64 {
        let present = [
            !publication.title.trim().is_empty(),
            !publication.authors.is_empty(),
            !publication.venue.trim().is_empty(),
            publication.year.is_some(),
            has_text(&publication.abstract_text),
            has_text(&publication.identifier),
        ];
        present.iter().filter(|p| **p).count() as f64 / present.len() as f64
    }

    fn mentions(publication: &Publication, needles: &[String]) -> bool {
        let title = publication.title.to_lowercase();
        let abstract_text = publication
            .abstract_text
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        needles
            .iter()
            .any(|n| title.contains(n.as_str()) || abstract_text.contains(n.as_str()))
    }
}

impl Default for DefaultQualityScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl QualityScorer for DefaultQualityScorer {
    fn score(&self, result: &SearchResult) -> QualityMetrics {
        if result.is_failure() || result.publications.is_empty() {
            return QualityMetrics::empty();
        }

        let publications = &result.publications;
        let count = publications.len() as f64;
        let reference_year = result.timestamp.year();

        let needles: Vec<String> = std::iter::once(result.chemical.name.as_str())
            .chain(result.chemical.cas_number.as_deref())
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let recency = publications
            .iter()
            .map(|p| self.recency(p, reference_year))
            .sum::<f64>()
            / count;
        let completeness = publications.iter().map(Self::completeness).sum::<f64>() / count;
        let relevance = publications
            .iter()
            .filter(|p| Self::mentions(p, &needles))
            .count() as f64
            / count;

        let overall = RELEVANCE_WEIGHT * relevance
            + COMPLETENESS_WEIGHT * completeness
            + RECENCY_WEIGHT * recency;

        let confidence = if publications.len() < MIN_PUBLICATIONS_FOR_CONFIDENCE || overall < 0.4 {
            ConfidenceLevel::Low
        } else if overall < 0.7 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::High
        };

        QualityMetrics {
            publication_count: publications.len(),
            recency_score: round3(recency),
            completeness_score: round3(completeness),
            relevance_score: round3(relevance),
            overall_score: round3(overall),
            confidence,
        }
    }
}

/// Score a result with the default scorer
pub fn calculate_quality_metrics(result: &SearchResult) -> QualityMetrics {
    DefaultQualityScorer::new().score(result)
}

/// Pair each result with its metrics
pub fn score_results(
    scorer: &dyn QualityScorer,
    results: &[SearchResult],
) -> Vec<(SearchResult, QualityMetrics)> {
    results
        .iter()
        .map(|r| (r.clone(), scorer.score(r)))
        .collect()
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
