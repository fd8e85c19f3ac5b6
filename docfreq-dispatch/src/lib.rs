//! Dispatcher for docfreq
//!
//! Submitting a document computes its content id, answers straight from the
//! result cache when a report is already there, and otherwise pushes a job
//! on the work queue and polls the cache until the report shows up.

pub mod dispatcher;
pub mod error;

pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use error::DispatchError;
