//! Result cache configuration

use crate::error::ConfigResult;
use crate::validation::{validate_duration, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a computed report stays cached; `0s` keeps it forever
    #[serde(with = "humantime_serde", default = "default_report_ttl")]
    pub report_ttl: Duration,

    /// How often the in-memory store sweeps expired entries
    #[serde(with = "humantime_serde", default = "default_cleanup_interval")]
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            report_ttl: default_report_ttl(),
            cleanup_interval: default_cleanup_interval(),
        }
    }
}

impl Validatable for CacheConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_duration(self.cleanup_interval, "cleanup_interval", self.domain_name())
    }

    fn domain_name(&self) -> &'static str {
        "cache"
    }
}

fn default_report_ttl() -> Duration {
    Duration::from_secs(30)
}

fn default_cleanup_interval() -> Duration {
    Duration::from_secs(60)
}
