//! Error types for dispatching

use docfreq_core::{CodecError, DocumentId};
use docfreq_interfaces::{CacheError, QueueError};
use std::time::Duration;
use thiserror::Error;

/// Submission errors
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("invalid document")]
    InvalidRequest,

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("unable to enqueue job: {0}")]
    Queue(#[from] QueueError),

    #[error("result cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("request cancelled while waiting for document {document_id}")]
    Cancelled { document_id: DocumentId },

    #[error("no result for document {document_id} within {timeout:?}")]
    DeadlineExceeded {
        document_id: DocumentId,
        timeout: Duration,
    },

    #[error("cached report for {found} does not match document {expected}")]
    Mismatch {
        expected: DocumentId,
        found: DocumentId,
    },
}
