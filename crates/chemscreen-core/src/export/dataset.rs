//! Export record builder
//!
//! Flattens `(SearchResult, QualityMetrics)` pairs into [`FlatRecord`]s and
//! computes the summary every writer reports. Building never fails: odd input
//! shapes degrade to empty values instead of errors.

use super::options::ExportOptions;
use super::record::{fields, header_union, FieldValue, FlatRecord};
use crate::quality::{ConfidenceLevel, QualityMetrics};
use crate::search::{Publication, SearchResult, SearchStatus};
use crate::session::BatchSearchSession;
use crate::types::ExportFormat;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

/// Where session metadata goes when it is included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataPlacement {
    /// Appended to every record (CSV)
    PerRecord,
    /// Kept in a dedicated section (spreadsheet sheet, JSON key)
    Section,
}

impl MetadataPlacement {
    /// Placement used by a format
    pub fn for_format(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Csv => MetadataPlacement::PerRecord,
            ExportFormat::Spreadsheet | ExportFormat::Json => MetadataPlacement::Section,
        }
    }
}

/// Session-level fields attached to an export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportMetadata {
    entries: Vec<(&'static str, FieldValue)>,
}

impl ExportMetadata {
    /// Capture session fields at export time
    pub fn new(session: &BatchSearchSession, exported_at: DateTime<Utc>) -> Self {
        let params = &session.parameters;
        Self {
            entries: vec![
                ("batch_id", session.batch_id.as_str().into()),
                ("session_status", session.status.as_str().into()),
                ("date_range_years", params.date_range_years.into()),
                ("max_results", params.max_results.into()),
                ("include_reviews", params.include_reviews.into()),
                ("use_cache", params.use_cache.into()),
                (
                    "exported_at",
                    exported_at.to_rfc3339_opts(SecondsFormat::Secs, true).into(),
                ),
            ],
        }
    }

    /// Metadata fields in order
    pub fn entries(&self) -> &[(&'static str, FieldValue)] {
        &self.entries
    }

    /// Look up a metadata field
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

impl Serialize for ExportMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Per-chemical line of the summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChemicalSummary {
    pub chemical_name: String,
    pub cas_number: Option<String>,
    pub search_status: SearchStatus,
    pub publication_count: usize,
    pub overall_score: f64,
    pub confidence: ConfidenceLevel,
}

/// Aggregate counts for an export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    /// Chemicals in the batch
    pub chemicals_searched: usize,
    /// Results without an error
    pub successful_searches: usize,
    /// Results with an error
    pub failed_searches: usize,
    /// Publication rows emitted
    pub total_publications: usize,
    /// Per-chemical breakdown in result order
    pub chemicals: Vec<ChemicalSummary>,
}

/// Everything a writer needs: records, summary and optional metadata
#[derive(Debug, Clone)]
pub struct ExportDataset {
    /// Format the dataset was built for
    pub format: ExportFormat,
    /// Flat records in result order
    pub records: Vec<FlatRecord>,
    /// Aggregate counts
    pub summary: ExportSummary,
    /// Session metadata, present only when requested
    pub metadata: Option<ExportMetadata>,
    /// Where the metadata lives
    pub placement: MetadataPlacement,
}

impl ExportDataset {
    /// Column order shared by CSV and the "Detailed Results" sheet
    pub fn columns(&self) -> Vec<String> {
        header_union(&self.records)
    }

    /// Metadata meant for a dedicated section
    pub fn section_metadata(&self) -> Option<&ExportMetadata> {
        match self.placement {
            MetadataPlacement::Section => self.metadata.as_ref(),
            MetadataPlacement::PerRecord => None,
        }
    }
}

/// Builds an [`ExportDataset`] from scored results
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    options: ExportOptions,
    placement: MetadataPlacement,
    exported_at: DateTime<Utc>,
}

impl RecordBuilder {
    /// Create a builder; placement follows the options' format
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            placement: MetadataPlacement::for_format(options.format),
            exported_at: Utc::now(),
        }
    }

    /// Override the metadata placement
    pub fn placement(mut self, placement: MetadataPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the export timestamp recorded in metadata
    pub fn exported_at(mut self, exported_at: DateTime<Utc>) -> Self {
        self.exported_at = exported_at;
        self
    }

    /// Flatten results into records and compute the summary
    pub fn build(
        &self,
        session: &BatchSearchSession,
        results: &[(SearchResult, QualityMetrics)],
    ) -> ExportDataset {
        let metadata = self
            .options
            .include_metadata
            .then(|| ExportMetadata::new(session, self.exported_at));
        let row_metadata = match self.placement {
            MetadataPlacement::PerRecord => metadata.as_ref(),
            MetadataPlacement::Section => None,
        };

        let mut records = Vec::new();
        let mut chemicals = Vec::with_capacity(results.len());
        let mut total_publications = 0;
        let mut successful_searches = 0;

        for (result, metrics) in results {
            // An error wins over any publications that came with it
            let publications: &[Publication] = if result.is_failure() {
                if !result.publications.is_empty() {
                    warn!(
                        "Ignoring {} publications on failed result for '{}'",
                        result.publications.len(),
                        result.chemical.name
                    );
                }
                &[]
            } else {
                successful_searches += 1;
                &result.publications
            };

            let base = Self::chemical_fields(result, metrics, publications.len());

            if publications.is_empty() {
                records.push(self.finish(self.placeholder(base, result), row_metadata));
            } else {
                for (index, publication) in publications.iter().enumerate() {
                    let record = self.publication_record(base.clone(), index + 1, publication);
                    records.push(self.finish(record, row_metadata));
                }
            }

            total_publications += publications.len();
            chemicals.push(ChemicalSummary {
                chemical_name: result.chemical.name.clone(),
                cas_number: result.chemical.cas_number.clone(),
                search_status: result.status(),
                publication_count: publications.len(),
                overall_score: metrics.overall_score,
                confidence: metrics.confidence,
            });
        }

        debug!(
            "Built {} records for {} results ({} publications)",
            records.len(),
            results.len(),
            total_publications
        );

        ExportDataset {
            format: self.options.format,
            records,
            summary: ExportSummary {
                chemicals_searched: session.chemical_count(),
                successful_searches,
                failed_searches: results.len() - successful_searches,
                total_publications,
                chemicals,
            },
            metadata,
            placement: self.placement,
        }
    }

    fn chemical_fields(
        result: &SearchResult,
        metrics: &QualityMetrics,
        publication_count: usize,
    ) -> FlatRecord {
        FlatRecord::new()
            .with(fields::CHEMICAL_NAME, result.chemical.name.as_str())
            .with(
                fields::CAS_NUMBER,
                FieldValue::text_opt(result.chemical.cas_number.as_deref()),
            )
            .with(fields::SEARCH_STATUS, result.status().as_str())
            .with(fields::PUBLICATION_COUNT, publication_count)
            .with(fields::RECENCY_SCORE, metrics.recency_score)
            .with(fields::COMPLETENESS_SCORE, metrics.completeness_score)
            .with(fields::RELEVANCE_SCORE, metrics.relevance_score)
            .with(fields::OVERALL_SCORE, metrics.overall_score)
            .with(fields::CONFIDENCE, metrics.confidence.as_str())
    }

    fn publication_record(
        &self,
        base: FlatRecord,
        rank: usize,
        publication: &Publication,
    ) -> FlatRecord {
        let mut record = base
            .with(fields::PUBLICATION_RANK, rank)
            .with(fields::TITLE, publication.title.as_str())
            .with(fields::AUTHORS, publication.authors_display())
            .with(fields::VENUE, publication.venue.as_str())
            .with(
                fields::YEAR,
                publication
                    .year
                    .map(|y| FieldValue::Integer(i64::from(y)))
                    .unwrap_or(FieldValue::Empty),
            )
            .with(
                fields::IDENTIFIER,
                FieldValue::text_opt(publication.identifier.as_deref()),
            );

        if self.options.include_abstracts {
            record.insert(
                fields::ABSTRACT,
                FieldValue::text_opt(publication.abstract_text.as_deref()),
            );
        }

        record.with(fields::ERROR, FieldValue::Empty)
    }

    fn placeholder(&self, base: FlatRecord, result: &SearchResult) -> FlatRecord {
        let mut record = base
            .with(fields::PUBLICATION_RANK, FieldValue::Empty)
            .with(fields::TITLE, FieldValue::Empty)
            .with(fields::AUTHORS, FieldValue::Empty)
            .with(fields::VENUE, FieldValue::Empty)
            .with(fields::YEAR, FieldValue::Empty)
            .with(fields::IDENTIFIER, FieldValue::Empty);

        if self.options.include_abstracts {
            record.insert(fields::ABSTRACT, FieldValue::Empty);
        }

        record.with(fields::ERROR, FieldValue::text_opt(result.error.as_deref()))
    }

    fn finish(&self, mut record: FlatRecord, metadata: Option<&ExportMetadata>) -> FlatRecord {
        if let Some(metadata) = metadata {
            for (name, value) in metadata.entries() {
                record.insert(*name, value.clone());
            }
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::calculate_quality_metrics;
    use crate::search::{Chemical, PublicationBuilder};
    use crate::session::SearchParameters;
    use crate::types::BatchId;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn session() -> BatchSearchSession {
        BatchSearchSession::completed(
            BatchId::from_string("batch-7"),
            vec![Chemical::new("A"), Chemical::new("B")],
            SearchParameters::default(),
        )
    }

    fn scored(results: Vec<SearchResult>) -> Vec<(SearchResult, QualityMetrics)> {
        results
            .into_iter()
            .map(|r| {
                let m = calculate_quality_metrics(&r);
                (r, m)
            })
            .collect()
    }

    fn example_results() -> Vec<(SearchResult, QualityMetrics)> {
        scored(vec![
            SearchResult::success(
                Chemical::new("A"),
                vec![
                    PublicationBuilder::new("A one")
                        .abstract_text("secret abstract one")
                        .year(2023)
                        .build(),
                    PublicationBuilder::new("A two").build(),
                    PublicationBuilder::new("A three").build(),
                ],
                ts(),
            ),
            SearchResult::failure(Chemical::new("B"), "timeout", ts()),
        ])
    }

    #[test]
    fn test_example_batch() {
        let dataset = RecordBuilder::new(ExportOptions::default())
            .exported_at(ts())
            .build(&session(), &example_results());

        assert_eq!(dataset.records.len(), 4);
        assert_eq!(
            dataset.records.iter().filter(|r| r.is_publication_row()).count(),
            3
        );
        assert_eq!(dataset.summary.chemicals_searched, 2);
        assert_eq!(dataset.summary.successful_searches, 1);
        assert_eq!(dataset.summary.failed_searches, 1);
        assert_eq!(dataset.summary.total_publications, 3);

        let failed = &dataset.records[3];
        assert_eq!(failed.get(fields::CHEMICAL_NAME), Some(&FieldValue::from("B")));
        assert_eq!(failed.get(fields::SEARCH_STATUS), Some(&FieldValue::from("failure")));
        assert_eq!(failed.get(fields::PUBLICATION_COUNT), Some(&FieldValue::Integer(0)));
        assert_eq!(failed.get(fields::ERROR), Some(&FieldValue::from("timeout")));
        assert!(!failed.is_publication_row());
    }

    #[test]
    fn test_publication_order_and_rank() {
        let dataset = RecordBuilder::new(ExportOptions::default()).build(&session(), &example_results());
        let titles: Vec<_> = dataset.records[..3]
            .iter()
            .map(|r| r.get(fields::TITLE).unwrap().to_cell_string())
            .collect();
        assert_eq!(titles, vec!["A one", "A two", "A three"]);
        assert_eq!(
            dataset.records[2].get(fields::PUBLICATION_RANK),
            Some(&FieldValue::Integer(3))
        );
    }

    #[test]
    fn test_zero_publication_success_keeps_chemical() {
        let results = scored(vec![SearchResult::success(Chemical::new("C"), vec![], ts())]);
        let dataset = RecordBuilder::new(ExportOptions::default()).build(&session(), &results);

        assert_eq!(dataset.records.len(), 1);
        let record = &dataset.records[0];
        assert_eq!(record.get(fields::SEARCH_STATUS), Some(&FieldValue::from("partial")));
        assert_eq!(record.get(fields::TITLE), Some(&FieldValue::Empty));
        assert_eq!(record.get(fields::ERROR), Some(&FieldValue::Empty));
        assert_eq!(dataset.summary.successful_searches, 1);
    }

    #[test]
    fn test_abstracts_excluded_by_default() {
        let dataset = RecordBuilder::new(ExportOptions::default()).build(&session(), &example_results());
        assert!(!dataset.columns().iter().any(|c| c == fields::ABSTRACT));
        let json = serde_json::to_string(&dataset.records).unwrap();
        assert!(!json.contains("secret abstract"));
    }

    #[test]
    fn test_abstracts_included() {
        let options = ExportOptions::default().with_abstracts(true);
        let dataset = RecordBuilder::new(options).build(&session(), &example_results());
        assert_eq!(
            dataset.records[0].get(fields::ABSTRACT),
            Some(&FieldValue::from("secret abstract one"))
        );
        // Every row carries the column, including the failure placeholder
        assert!(dataset.records.iter().all(|r| r.get(fields::ABSTRACT).is_some()));
    }

    #[test]
    fn test_metadata_per_record_for_csv() {
        let dataset = RecordBuilder::new(ExportOptions::default())
            .exported_at(ts())
            .build(&session(), &example_results());

        for record in &dataset.records {
            assert_eq!(record.get("batch_id"), Some(&FieldValue::from("batch-7")));
            assert_eq!(
                record.get("exported_at"),
                Some(&FieldValue::from("2024-06-01T12:00:00Z"))
            );
        }
        assert!(dataset.section_metadata().is_none());
    }

    #[test]
    fn test_metadata_section_for_json() {
        let options = ExportOptions::new(ExportFormat::Json);
        let dataset = RecordBuilder::new(options).build(&session(), &example_results());

        assert!(dataset.records.iter().all(|r| r.get("batch_id").is_none()));
        let metadata = dataset.section_metadata().unwrap();
        assert_eq!(metadata.get("max_results"), Some(&FieldValue::Integer(100)));
    }

    #[test]
    fn test_metadata_excluded() {
        let options = ExportOptions::default().with_metadata(false);
        let dataset = RecordBuilder::new(options).build(&session(), &example_results());
        assert!(dataset.metadata.is_none());
        assert!(!dataset.columns().iter().any(|c| c == "batch_id"));
    }

    #[test]
    fn test_columns_stable_across_row_kinds() {
        let dataset = RecordBuilder::new(ExportOptions::default().with_metadata(false))
            .build(&session(), &example_results());
        let columns = dataset.columns();
        assert_eq!(
            columns,
            vec![
                "chemical_name",
                "cas_number",
                "search_status",
                "publication_count",
                "recency_score",
                "completeness_score",
                "relevance_score",
                "overall_score",
                "confidence",
                "publication_rank",
                "title",
                "authors",
                "venue",
                "year",
                "identifier",
                "error",
            ]
        );
        for record in &dataset.records {
            assert_eq!(record.len(), columns.len());
        }
    }

    #[test]
    fn test_failed_result_with_publications_is_normalized() {
        let mut result = SearchResult::failure(Chemical::new("B"), "timeout", ts());
        result.publications.push(PublicationBuilder::new("stray").build());
        let results = vec![(result, QualityMetrics::empty())];

        let dataset = RecordBuilder::new(ExportOptions::default()).build(&session(), &results);
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.summary.total_publications, 0);
    }

    #[test]
    fn test_idempotent_records() {
        let results = example_results();
        let builder = RecordBuilder::new(ExportOptions::new(ExportFormat::Json));
        let first = builder.build(&session(), &results);
        let second = builder.build(&session(), &results);
        assert_eq!(first.records, second.records);
        assert_eq!(first.summary, second.summary);
    }
}
