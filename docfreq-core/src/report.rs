//! Frequency reports stored in the result cache

use serde::{Deserialize, Serialize};

use crate::job::DocumentId;

/// Number of occurrences of one word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    #[serde(rename = "Word")]
    pub word: String,

    #[serde(rename = "Frequency")]
    pub count: u64,
}

impl FrequencyEntry {
    pub fn new(word: impl Into<String>, count: u64) -> Self {
        Self {
            word: word.into(),
            count,
        }
    }
}

/// The result of analysing one document
///
/// `frequencies` holds at most [`crate::TOP_WORDS`] entries, sorted by
/// descending count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyReport {
    #[serde(rename = "DocumentID")]
    pub document_id: DocumentId,

    #[serde(rename = "Frequencies")]
    pub frequencies: Vec<FrequencyEntry>,
}

impl FrequencyReport {
    pub fn new(document_id: DocumentId, frequencies: Vec<FrequencyEntry>) -> Self {
        Self {
            document_id,
            frequencies,
        }
    }
}
