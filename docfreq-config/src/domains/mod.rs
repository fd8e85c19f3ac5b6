//! Domain-specific configuration modules

pub mod backend;
pub mod cache;
pub mod dispatch;
pub mod logging;
pub mod queue;
pub mod server;
pub mod worker;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main docfreq configuration combining all domains
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocfreqConfig {
    /// HTTP server configuration
    pub server: server::ServerConfig,

    /// Which queue and cache backend to run on
    pub backend: backend::BackendConfig,

    /// Work queue configuration
    pub queue: queue::QueueConfig,

    /// Result cache configuration
    pub cache: cache::CacheConfig,

    /// Dispatcher configuration
    pub dispatch: dispatch::DispatchConfig,

    /// Worker configuration
    pub worker: worker::WorkerConfig,

    /// Logging configuration
    pub logging: logging::LoggingConfig,
}

impl DocfreqConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.server.validate()?;
        self.backend.validate()?;
        self.queue.validate()?;
        self.cache.validate()?;
        self.dispatch.validate()?;
        self.worker.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        serde_yaml::to_string(&DocfreqConfig::default())
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
