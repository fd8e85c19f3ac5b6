//! Work queue configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};

/// Work queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Channel the dispatcher pushes jobs on and workers pull from
    #[serde(default = "default_channel")]
    pub channel: String,

    /// Upper bound on messages taken from the broker in one fetch
    #[serde(default = "default_max_fetch")]
    pub max_fetch: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
            max_fetch: default_max_fetch(),
        }
    }
}

impl Validatable for QueueConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.channel, "channel", self.domain_name())?;
        validate_positive(self.max_fetch, "max_fetch", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "queue"
    }
}

fn default_channel() -> String {
    "worker_document_parser".to_string()
}

fn default_max_fetch() -> usize {
    16
}
