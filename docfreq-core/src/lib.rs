//! Core domain model for docfreq
//!
//! This crate contains the types shared by the dispatcher and the worker:
//! the job carried on the work queue, the frequency report stored in the
//! result cache, the content-addressed document id, and the word counting
//! that produces a report. It has no async or I/O dependencies.

pub mod codec;
pub mod frequency;
pub mod job;
pub mod report;

// Re-export commonly used types at the crate root
pub use codec::{decode_job, decode_report, encode_job, encode_report, CodecError};
pub use frequency::{count_words, top_words, TOP_WORDS};
pub use job::{DocumentId, DocumentRequest, Job};
pub use report::{FrequencyEntry, FrequencyReport};
