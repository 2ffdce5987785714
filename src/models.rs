//! Core data models used throughout the text analyzer.
//!
//! [`AnalysisRecord`] is what the analyze path produces; [`TableEntity`] is
//! the flat shape it takes once written to a table store.

use serde::{Deserialize, Serialize};

/// Partition key shared by every record this service writes.
pub const PARTITION_KEY: &str = "TextAnalyzer";

/// Statistics computed over a single input text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnalysis {
    pub word_count: usize,
    pub character_count: usize,
    pub character_count_no_spaces: usize,
    pub sentence_count: usize,
    pub paragraph_count: usize,
    pub average_word_length: f64,
    pub longest_word: String,
    pub reading_time_minutes: f64,
}

/// When the analysis ran, plus a short preview of the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// UTC timestamp, RFC 3339.
    pub analyzed_at: String,
    pub text_preview: String,
}

/// A complete analysis, as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: String,
    pub analysis: TextAnalysis,
    pub metadata: AnalysisMetadata,
    /// The full input. Persisted, but never echoed back over HTTP.
    #[serde(skip)]
    pub original_text: String,
}

/// Flat, schemaless row stored in the table backend.
///
/// `analysis_json` and `metadata_json` hold the serialized
/// [`TextAnalysis`] and [`AnalysisMetadata`]. They are optional because a
/// row written by another producer may lack them.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntity {
    pub partition_key: String,
    pub row_key: String,
    pub analysis_json: Option<String>,
    pub metadata_json: Option<String>,
    pub original_text: Option<String>,
    pub created_at: Option<String>,
}

impl TableEntity {
    /// Build the storage entity for an analysis record.
    pub fn from_record(record: &AnalysisRecord) -> serde_json::Result<Self> {
        Ok(Self {
            partition_key: PARTITION_KEY.to_string(),
            row_key: record.id.clone(),
            analysis_json: Some(serde_json::to_string(&record.analysis)?),
            metadata_json: Some(serde_json::to_string(&record.metadata)?),
            original_text: Some(record.original_text.clone()),
            created_at: Some(record.metadata.analyzed_at.clone()),
        })
    }
}
