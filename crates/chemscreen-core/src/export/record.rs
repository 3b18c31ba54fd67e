//! Flat export records
//!
//! A flat record is an ordered mapping from field name to a scalar value.
//! Every writer consumes the same records, so column order and values match
//! across formats.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// Field names used in flat records, in emission order
pub mod fields {
    pub const CHEMICAL_NAME: &str = "chemical_name";
    pub const CAS_NUMBER: &str = "cas_number";
    pub const SEARCH_STATUS: &str = "search_status";
    pub const PUBLICATION_COUNT: &str = "publication_count";
    pub const RECENCY_SCORE: &str = "recency_score";
    pub const COMPLETENESS_SCORE: &str = "completeness_score";
    pub const RELEVANCE_SCORE: &str = "relevance_score";
    pub const OVERALL_SCORE: &str = "overall_score";
    pub const CONFIDENCE: &str = "confidence";
    pub const PUBLICATION_RANK: &str = "publication_rank";
    pub const TITLE: &str = "title";
    pub const AUTHORS: &str = "authors";
    pub const VENUE: &str = "venue";
    pub const YEAR: &str = "year";
    pub const IDENTIFIER: &str = "identifier";
    pub const ABSTRACT: &str = "abstract";
    pub const ERROR: &str = "error";
}

/// A single scalar cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Missing value (empty cell, JSON null)
    Empty,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Text value, or empty for `None`
    pub fn text_opt(value: Option<&str>) -> Self {
        match value {
            Some(s) => FieldValue::Text(s.to_string()),
            None => FieldValue::Empty,
        }
    }

    /// Whether the value is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    /// Render for a text cell (CSV)
    pub fn to_cell_string(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => format_float(*f),
            FieldValue::Text(s) => s.clone(),
        }
    }
}

/// Whole floats keep a trailing `.0` so text cells match the JSON rendering
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_cell_string())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<usize> for FieldValue {
    fn from(value: usize) -> Self {
        FieldValue::Integer(value as i64)
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

static EMPTY_FIELD: FieldValue = FieldValue::Empty;

/// One row of an export: a publication match or a chemical placeholder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatRecord {
    fields: Vec<(String, FieldValue)>,
}

impl FlatRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, keeping its original position if already present
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Builder-style variant of [`FlatRecord::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a field
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Field names in order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Fields in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether the row stands for a publication (as opposed to a chemical placeholder)
    pub fn is_publication_row(&self) -> bool {
        self.get(fields::PUBLICATION_RANK)
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }

    /// Values in the given column order, empty for missing fields
    pub fn values_for<'a>(&'a self, columns: &'a [String]) -> impl Iterator<Item = &'a FieldValue> {
        columns
            .iter()
            .map(move |c| self.get(c).unwrap_or(&EMPTY_FIELD))
    }
}

impl Serialize for FlatRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Union of field names across records, ordered by first appearance
pub fn header_union(records: &[FlatRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();
    for record in records {
        for name in record.field_names() {
            if seen.insert(name) {
                columns.push(name.to_string());
            }
        }
    }
    columns
}
