//! Byte encoding of queue messages and cache values
//!
//! Both directions use JSON. Jobs reject unknown fields so that a report
//! accidentally pushed on the worker channel is dropped instead of being
//! processed as an empty document.

use thiserror::Error;

use crate::job::Job;
use crate::report::FrequencyReport;

/// Encoding/decoding errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("unable to encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("unable to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub fn encode_job(job: &Job) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(job).map_err(|source| CodecError::Encode { what: "job", source })
}

pub fn decode_job(bytes: &[u8]) -> Result<Job, CodecError> {
    serde_json::from_slice(bytes).map_err(|source| CodecError::Decode { what: "job", source })
}

pub fn encode_report(report: &FrequencyReport) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(report).map_err(|source| CodecError::Encode {
        what: "frequency report",
        source,
    })
}

pub fn decode_report(bytes: &[u8]) -> Result<FrequencyReport, CodecError> {
    serde_json::from_slice(bytes).map_err(|source| CodecError::Decode {
        what: "frequency report",
        source,
    })
}
