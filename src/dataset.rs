//! Loader for the Ecommerce FAQ Chatbot dataset.
//!
//! Converts each raw question/answer pair into an `IndexedDocument` with a
//! formatted `Q:`/`A:` content block and positional metadata.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RagError;

pub const DATASET_SOURCE: &str = "Ecommerce_FAQ_Chatbot_dataset";

/// A raw question/answer pair as it appears in the dataset JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct FaqRecord {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Deserialize)]
struct FaqDataset {
    #[serde(default)]
    questions: Vec<FaqRecord>,
}

/// Metadata attached to every indexed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Dataset identifier the document came from.
    pub source: String,
    /// The original (trimmed) question text.
    pub question: String,
    /// Zero-based position in the source dataset; stable reference id.
    pub index: usize,
}

/// A normalized text unit ready for embedding and storage.
///
/// Immutable once built; `content` holds the `Q:`/`A:` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    pub content: String,
    pub metadata: DocumentMetadata,
}

impl IndexedDocument {
    pub fn from_record(record: &FaqRecord, index: usize) -> Self {
        let question = record.question.trim().to_string();
        let answer = record.answer.trim();
        IndexedDocument {
            content: format!("Q: {}\nA: {}", question, answer),
            metadata: DocumentMetadata {
                source: DATASET_SOURCE.to_string(),
                question,
                index,
            },
        }
    }
}

/// Load the FAQ JSON dataset and convert each Q&A pair into a document.
///
/// Output order matches input order; `index` is assigned by position.
pub fn load_faq_documents(path: &Path) -> Result<Vec<IndexedDocument>, RagError> {
    if !path.exists() {
        return Err(RagError::DatasetNotFound {
            path: path.to_path_buf(),
        });
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| RagError::MalformedDataset(format!("failed to read '{}': {}", path.display(), e)))?;
    let dataset: FaqDataset = serde_json::from_str(&raw)
        .map_err(|e| RagError::MalformedDataset(format!("invalid JSON in '{}': {}", path.display(), e)))?;

    if dataset.questions.is_empty() {
        return Err(RagError::MalformedDataset(
            "expected a non-empty 'questions' list in the dataset JSON".to_string(),
        ));
    }

    let documents: Vec<IndexedDocument> = dataset
        .questions
        .iter()
        .enumerate()
        .map(|(i, record)| IndexedDocument::from_record(record, i))
        .collect();

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    println!("[DataLoader] Loaded {} FAQ documents from '{}'.", documents.len(), file_name);

    Ok(documents)
}
