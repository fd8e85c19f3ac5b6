//! Backend selection

use crate::error::ConfigResult;
use crate::validation::{validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which implementation backs the work queue and the result cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process queue and cache; a single process only
    #[default]
    Memory,
    /// Redis lists and string keys
    Redis,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(BackendKind::Memory),
            "redis" => Ok(BackendKind::Redis),
            _ => Err(format!("Invalid backend: {}", s)),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Memory => f.write_str("memory"),
            BackendKind::Redis => f.write_str("redis"),
        }
    }
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    /// Connection URL, used by the Redis backend
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            redis_url: default_redis_url(),
        }
    }
}

impl Validatable for BackendConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.kind == BackendKind::Redis {
            validate_required_string(&self.redis_url, "redis_url", self.domain_name())?;
            if !self.redis_url.starts_with("redis://") && !self.redis_url.starts_with("rediss://") {
                return Err(self.validation_error(format!(
                    "redis_url must start with redis:// or rediss://, got {}",
                    self.redis_url
                )));
            }
        }
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "backend"
    }
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!("Redis".parse::<BackendKind>().unwrap(), BackendKind::Redis);
        assert!("etcd".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_redis_url_checked_only_for_redis() {
        let mut config = BackendConfig {
            kind: BackendKind::Memory,
            redis_url: "http://nope".to_string(),
        };
        assert!(config.validate().is_ok());

        config.kind = BackendKind::Redis;
        assert!(config.validate().is_err());
    }
}
