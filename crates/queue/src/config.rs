use std::env;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::QueueError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Compute queue configuration, typically parsed from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Queue label. Also used as the lane thread's name.
    #[serde(default = "default_label")]
    pub label: String,
    /// Lane thread stack size in bytes. `None` = platform default.
    #[serde(default)]
    pub stack_size: Option<usize>,
}

fn default_label() -> String {
    "compute-queue".into()
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            stack_size: None,
        }
    }
}

impl QueueConfig {
    /// Config with the given label and defaults for everything else.
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Parse config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, QueueError> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, QueueError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Build config from environment variables, loading `.env` first.
    pub fn from_env() -> Result<Self, QueueError> {
        load_dotenv();
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// - `COMPUTE_QUEUE_LABEL` -> `label`
    /// - `COMPUTE_QUEUE_STACK_SIZE` -> `stack_size` (ignored unless it parses)
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Some(v) = env_opt("COMPUTE_QUEUE_LABEL") {
            self.label = v;
        }
        if let Some(v) = env_opt("COMPUTE_QUEUE_STACK_SIZE") {
            if let Ok(size) = v.parse::<usize>() {
                self.stack_size = Some(size);
            }
        }
    }

    /// Check the config can actually name and size a thread.
    pub fn validate(&self) -> Result<(), QueueError> {
        if self.label.trim().is_empty() {
            return Err(QueueError::Config("label must not be empty".into()));
        }
        // std::thread::Builder panics on interior NULs.
        if self.label.contains('\0') {
            return Err(QueueError::Config(format!(
                "label {:?} contains a NUL byte",
                self.label
            )));
        }
        if self.stack_size == Some(0) {
            return Err(QueueError::Config("stack_size must be non-zero".into()));
        }
        Ok(())
    }
}
