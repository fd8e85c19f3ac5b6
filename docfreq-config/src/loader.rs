//! Configuration loading and environment variable handling

use crate::domains::DocfreqConfig;
use crate::error::{ConfigError, ConfigResult};
use humantime_serde::re::humantime;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with the `DOCFREQ` prefix
    pub fn new() -> Self {
        Self {
            prefix: "DOCFREQ".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<DocfreqConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: DocfreqConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<DocfreqConfig> {
        let mut config = DocfreqConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load from `config_path` when given, otherwise from the environment
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<DocfreqConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&self, config: &mut DocfreqConfig) -> ConfigResult<()> {
        if let Some(bind) = self.get_env_var("SERVER_BIND_ADDRESS") {
            config.server.bind_address = bind;
        }
        if let Some(port) = self.parse_env_var("SERVER_PORT")? {
            config.server.port = port;
        }

        if let Some(kind) = self.parse_env_var("BACKEND")? {
            config.backend.kind = kind;
        }
        if let Some(url) = self.get_env_var("REDIS_URL") {
            config.backend.redis_url = url;
        }

        if let Some(channel) = self.get_env_var("QUEUE_CHANNEL") {
            config.queue.channel = channel;
        }
        if let Some(max_fetch) = self.parse_env_var("QUEUE_MAX_FETCH")? {
            config.queue.max_fetch = max_fetch;
        }

        if let Some(ttl) = self.duration_env_var("REPORT_TTL")? {
            config.cache.report_ttl = ttl;
        }

        if let Some(timeout) = self.duration_env_var("PROBE_TIMEOUT")? {
            config.dispatch.probe_timeout = timeout;
        }
        if let Some(interval) = self.duration_env_var("POLL_INTERVAL")? {
            config.dispatch.poll_interval = interval;
        }
        if let Some(timeout) = self.duration_env_var("REQUEST_TIMEOUT")? {
            config.dispatch.request_timeout = timeout;
        }

        if let Some(enabled) = self.parse_env_var("WORKER_ENABLED")? {
            config.worker.enabled = enabled;
        }
        if let Some(max_in_flight) = self.parse_env_var("WORKER_MAX_IN_FLIGHT")? {
            config.worker.max_in_flight = Some(max_in_flight);
        }

        if let Some(level) = self.parse_env_var("LOG_LEVEL")? {
            config.logging.level = level;
        }
        if let Some(format) = self.parse_env_var("LOG_FORMAT")? {
            config.logging.format = format;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Option<String> {
        std::env::var(format!("{}_{}", self.prefix, name)).ok()
    }

    fn parse_env_var<T>(&self, name: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_env_var(name)
            .map(|raw| {
                raw.trim().parse::<T>().map_err(|e| {
                    ConfigError::EnvError(format!("Invalid {}_{}: {}", self.prefix, name, e))
                })
            })
            .transpose()
    }

    /// Durations use the same notation as the YAML file, e.g. `250ms`
    fn duration_env_var(&self, name: &str) -> ConfigResult<Option<Duration>> {
        self.get_env_var(name)
            .map(|raw| {
                humantime::parse_duration(raw.trim()).map_err(|e| {
                    ConfigError::EnvError(format!("Invalid {}_{}: {}", self.prefix, name, e))
                })
            })
            .transpose()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
