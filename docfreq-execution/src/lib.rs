//! Worker side of docfreq
//!
//! [`WorkerProcessor`] turns one job into a frequency report and stores it in
//! the result cache. [`Subscriber`] pulls jobs off the work queue and runs
//! the processor for each one in its own task.

pub mod error;
pub mod processor;
pub mod subscriber;

pub use error::ExecutionError;
pub use processor::{WorkerProcessor, DEFAULT_REPORT_TTL};
pub use subscriber::{Subscriber, SubscriberConfig};
