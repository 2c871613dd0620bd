//! Values produced by the pipeline stages.
//!
//! Every type here is an immutable value handed from one stage to the next:
//! the extractor returns [`Document`]s, the synthesiser a [`JobAdContent`],
//! the visualiser a [`VisualAsset`]. [`GenerationOutput`] bundles all three
//! with run statistics for callers that drive the whole pipeline at once.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// Paragraphs extracted from exactly one source file.
///
/// Paragraphs are whitespace-trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Base name of the source file (no directory components).
    pub file_name: String,
    /// Paragraphs in source order.
    pub paragraphs: Vec<String>,
}

/// The documents found by one folder scan, in traversal order.
///
/// Entries within each directory are visited in file-name order so the
/// result is reproducible across runs on the same tree; ordering across
/// platforms with different name collation is not guaranteed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionBatch {
    pub documents: Vec<Document>,
}

impl ExtractionBatch {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Total paragraph count across all documents.
    pub fn paragraph_count(&self) -> usize {
        self.documents.iter().map(|d| d.paragraphs.len()).sum()
    }

    /// All paragraphs, document by document, in original order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.documents
            .iter()
            .flat_map(|d| d.paragraphs.iter().map(String::as_str))
    }
}

impl From<Document> for ExtractionBatch {
    fn from(doc: Document) -> Self {
        Self {
            documents: vec![doc],
        }
    }
}

/// The on-disk shape of extracted text: one object for a single file, a list
/// for a folder scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtractedText {
    Single(Document),
    Batch(ExtractionBatch),
}

impl ExtractedText {
    pub fn into_batch(self) -> ExtractionBatch {
        match self {
            ExtractedText::Single(doc) => doc.into(),
            ExtractedText::Batch(batch) => batch,
        }
    }
}

/// Structured job-advertisement copy produced by the language model.
///
/// Field order is the serialisation order. Fields the model delivers as a
/// JSON list are joined with newlines; `null` or missing fields become empty
/// strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAdContent {
    #[serde(default, deserialize_with = "lenient_text")]
    pub job_title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub responsibilities: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub requirements: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub qualifications: String,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(&value))
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

/// A generated poster image and where it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualAsset {
    /// Raw image bytes exactly as downloaded.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// File extension without the dot, e.g. `"webp"`.
    pub extension: String,
    /// Where the bytes were persisted.
    pub path: PathBuf,
}

/// Timing and volume figures for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Documents successfully extracted.
    pub documents: usize,
    /// Paragraphs across all extracted documents.
    pub paragraphs: usize,
    /// Paragraphs actually sent to the language model.
    pub context_paragraphs: usize,
    pub extract_duration_ms: u64,
    pub synthesis_duration_ms: u64,
    pub visual_duration_ms: u64,
    pub total_duration_ms: u64,
}

/// Everything a full pipeline run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutput {
    pub extraction: ExtractionBatch,
    pub content: JobAdContent,
    pub visual: VisualAsset,
    pub stats: GenerationStats,
}
