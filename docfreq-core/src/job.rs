//! Jobs and content-addressed document ids

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Content-addressed identifier of a document
///
/// The id is the SHA-256 digest of the document's UTF-8 bytes, encoded with
/// standard padded base64. It is used both as the deduplication key and as
/// the result cache key, so byte-identical documents always share one id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Length of every id produced by [`DocumentId::for_document`]
    pub const ENCODED_LEN: usize = 44;

    /// Derive the id of a document from its content
    pub fn for_document(document: &str) -> Self {
        let digest = Sha256::digest(document.as_bytes());
        Self(STANDARD.encode(digest))
    }

    /// Wrap an id that was computed elsewhere (e.g. decoded from a message)
    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A request for a document to be analysed, as submitted by a caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentRequest {
    /// Raw document text
    #[serde(default)]
    pub document: String,

    /// Extra processing latency the worker should simulate, in seconds
    #[serde(default)]
    pub duration_seconds: u64,
}

impl DocumentRequest {
    pub fn new(document: impl Into<String>, duration_seconds: u64) -> Self {
        Self {
            document: document.into(),
            duration_seconds,
        }
    }
}

/// A unit of work carried on the work queue
///
/// The id is assigned once, when the job is created from a request, and is
/// never recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    pub document: String,

    #[serde(default)]
    pub duration_seconds: u64,

    #[serde(default = "empty_id")]
    pub id: DocumentId,
}

fn empty_id() -> DocumentId {
    DocumentId::from_raw(String::new())
}

impl Job {
    /// Build a job from a submission, assigning its content-addressed id
    pub fn from_request(request: DocumentRequest) -> Self {
        let id = DocumentId::for_document(&request.document);
        Self {
            document: request.document,
            duration_seconds: request.duration_seconds,
            id,
        }
    }

    /// The id to store the result under
    ///
    /// Messages produced by the dispatcher always carry an id. A hand-crafted
    /// message without one falls back to the content id of its document.
    pub fn effective_id(&self) -> DocumentId {
        if self.id.is_empty() {
            DocumentId::for_document(&self.document)
        } else {
            self.id.clone()
        }
    }
}
