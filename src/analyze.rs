//! Single-pass text statistics.
//!
//! [`analyze_text`] computes the fixed metric set over one string, and
//! [`build_record`] wraps it into an [`AnalysisRecord`] with a fresh id,
//! timestamp and preview. Everything here is pure apart from the UUID and
//! clock reads in `build_record`.
//!
//! Lengths are counted in Unicode scalar values, not bytes.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::error::StoreResult;
use crate::models::{AnalysisMetadata, AnalysisRecord, TableEntity, TextAnalysis};
use crate::store::{open_table, TableStore};

/// Assumed reading speed used for `readingTimeMinutes`.
pub const WORDS_PER_MINUTE: f64 = 200.0;

/// Number of characters kept in `textPreview` before truncation.
pub const PREVIEW_CHARS: usize = 100;

const PREVIEW_MARKER: &str = "...";

/// Compute every metric for `text`.
pub fn analyze_text(text: &str) -> TextAnalysis {
    let words: Vec<&str> = text.split_whitespace().collect();
    let word_count = words.len();
    let character_count = text.chars().count();
    let character_count_no_spaces = text.chars().filter(|c| *c != ' ').count();

    let average_word_length = if word_count > 0 {
        round1(character_count_no_spaces as f64 / word_count as f64)
    } else {
        0.0
    };

    TextAnalysis {
        word_count,
        character_count,
        character_count_no_spaces,
        sentence_count: sentence_count(text),
        paragraph_count: paragraph_count(text),
        average_word_length,
        longest_word: longest_word(&words).to_string(),
        reading_time_minutes: round1(word_count as f64 / WORDS_PER_MINUTE),
    }
}

/// Analyze `text` and stamp the result with a new id and the current time.
pub fn build_record(text: &str) -> AnalysisRecord {
    AnalysisRecord {
        id: Uuid::new_v4().to_string(),
        analysis: analyze_text(text),
        metadata: AnalysisMetadata {
            analyzed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            text_preview: text_preview(text),
        },
        original_text: text.to_string(),
    }
}

/// Analysis result plus the outcome of the best-effort write.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub record: AnalysisRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_warning: Option<String>,
}

/// Write `record` to the store under the analyzer partition.
pub async fn persist_record(store: &dyn TableStore, record: &AnalysisRecord) -> StoreResult<()> {
    let entity = TableEntity::from_record(record)?;
    store.insert_entity(&entity).await
}

/// Analyze `text` and try to persist it. A failed write is logged and
/// reported as `storageWarning`; it never fails the analysis.
pub async fn analyze_and_store(store: &dyn TableStore, text: &str) -> AnalyzeResponse {
    let record = build_record(text);

    let storage_warning = match persist_record(store, &record).await {
        Ok(()) => None,
        Err(e) => {
            tracing::error!(id = %record.id, error = %e, "Failed to write to table storage");
            Some(e.to_string())
        }
    };

    AnalyzeResponse {
        record,
        storage_warning,
    }
}

/// `analyze` command: print the analysis as JSON, optionally storing it.
///
/// Without `save` no store is opened, so it works without any connection
/// string configured.
pub async fn run_analyze(config: &Config, text: &str, save: bool) -> anyhow::Result<()> {
    if text.is_empty() {
        anyhow::bail!("No text provided");
    }

    let response = if save {
        let settings = config.store.resolve()?;
        let store = open_table(&settings).await?;
        analyze_and_store(store.as_ref(), text).await
    } else {
        AnalyzeResponse {
            record: build_record(text),
            storage_warning: None,
        }
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Count maximal runs of `.`, `!` or `?`. Text without any counts as one
/// sentence.
pub fn sentence_count(text: &str) -> usize {
    let mut runs = 0;
    let mut in_run = false;
    for c in text.chars() {
        let terminal = matches!(c, '.' | '!' | '?');
        if terminal && !in_run {
            runs += 1;
        }
        in_run = terminal;
    }
    runs.max(1)
}

/// Count blank-line separated blocks that contain something besides whitespace.
pub fn paragraph_count(text: &str) -> usize {
    text.split("\n\n").filter(|p| !p.trim().is_empty()).count()
}

/// First word with the greatest character length, or `""` for no words.
pub fn longest_word<'a>(words: &[&'a str]) -> &'a str {
    let mut best = "";
    let mut best_len = 0;
    for word in words {
        let len = word.chars().count();
        if len > best_len {
            best = word;
            best_len = len;
        }
    }
    best
}

/// First [`PREVIEW_CHARS`] characters, with `"..."` appended when truncated.
pub fn text_preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], PREVIEW_MARKER),
        None => text.to_string(),
    }
}

/// Round the exact binary value to one decimal place. Formatting is
/// correctly rounded, so 0.35 (stored just below) becomes 0.3 and 4.45
/// (stored just above) becomes 4.5.
fn round1(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}
