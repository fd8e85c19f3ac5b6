//! Configuration for docfreq
//!
//! Configuration is split by domain. Every field has a default, so an empty
//! YAML document is a valid configuration. Values are layered as defaults,
//! then an optional YAML file, then `DOCFREQ_*` environment variables; the
//! server binary applies its command line flags last.

pub mod domains;
pub mod error;
pub mod loader;
pub mod validation;

// Re-export main types
pub use domains::{
    backend::{BackendConfig, BackendKind},
    cache::CacheConfig,
    dispatch::DispatchConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    queue::QueueConfig,
    server::ServerConfig,
    worker::WorkerConfig,
    DocfreqConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;
