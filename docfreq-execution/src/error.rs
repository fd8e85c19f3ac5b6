//! Error types for job execution

use docfreq_core::{CodecError, DocumentId};
use thiserror::Error;

/// Job execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// Cancelled during the simulated work; nothing was stored
    #[error("processing of document {document_id} cancelled")]
    Cancelled { document_id: DocumentId },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ExecutionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
