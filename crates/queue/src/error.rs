//! Queue error types.
//!
//! Only construction and configuration can fail. Submitting work,
//! querying membership and signalling are infallible.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("failed to spawn lane thread for {label}: {source}")]
    Spawn {
        label: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),
}
