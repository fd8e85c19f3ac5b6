//! Worker configuration

use crate::error::ConfigResult;
use crate::validation::{validate_duration, validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Run the queue subscription in this process
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Upper bound on concurrently processed jobs; unbounded when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_in_flight: Option<usize>,

    /// Pause after a failed pull before pulling again
    #[serde(with = "humantime_serde", default = "default_error_backoff")]
    pub error_backoff: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            max_in_flight: None,
            error_backoff: default_error_backoff(),
        }
    }
}

impl Validatable for WorkerConfig {
    fn validate(&self) -> ConfigResult<()> {
        if let Some(max_in_flight) = self.max_in_flight {
            validate_positive(max_in_flight, "max_in_flight", self.domain_name())?;
        }
        validate_duration(self.error_backoff, "error_backoff", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "worker"
    }
}

fn default_enabled() -> bool {
    true
}

fn default_error_backoff() -> Duration {
    Duration::from_millis(100)
}
