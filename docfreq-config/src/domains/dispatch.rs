//! Dispatcher configuration

use crate::error::ConfigResult;
use crate::validation::{validate_duration, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Deadline of each cache read; slower reads count as misses
    #[serde(with = "humantime_serde", default = "default_probe_timeout")]
    pub probe_timeout: Duration,

    /// Delay between cache reads while waiting for a report
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    pub poll_interval: Duration,

    /// Overall budget of one submission
    #[serde(with = "humantime_serde", default = "default_request_timeout")]
    pub request_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            probe_timeout: default_probe_timeout(),
            poll_interval: default_poll_interval(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Validatable for DispatchConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_duration(self.probe_timeout, "probe_timeout", self.domain_name())?;
        validate_duration(self.poll_interval, "poll_interval", self.domain_name())?;
        validate_duration(self.request_timeout, "request_timeout", self.domain_name())?;

        if self.poll_interval >= self.request_timeout {
            return Err(self.validation_error(format!(
                "poll_interval ({:?}) must be shorter than request_timeout ({:?})",
                self.poll_interval, self.request_timeout
            )));
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "dispatch"
    }
}

fn default_probe_timeout() -> Duration {
    Duration::from_millis(20)
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(50)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_must_be_shorter_than_timeout() {
        let config = DispatchConfig {
            poll_interval: Duration::from_secs(10),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_probe_rejected() {
        let config = DispatchConfig {
            probe_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
