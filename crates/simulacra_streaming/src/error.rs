//! # Streaming Error Types
//!
//! Only startup can fail. Once the tick loop runs, socket trouble is
//! handled inside the session and never surfaces here.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use simulacra_motion::MotionError;

/// Errors from configuring or starting a session.
#[derive(Error, Debug)]
pub enum StreamError {
    /// A socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: SocketAddr,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A config value is out of range or unparseable.
    #[error("invalid config value for {field}: {reason}")]
    Config {
        /// Dotted key, e.g. `stream.tick_rate`.
        field: &'static str,
        /// What was wrong.
        reason: String,
    },

    /// A capture file failed to load.
    #[error(transparent)]
    Motion(#[from] MotionError),

    /// The session behind a handle has shut down.
    #[error("session is no longer running")]
    SessionClosed,
}

impl StreamError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Config {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for streaming operations.
pub type StreamResult<T> = Result<T, StreamError>;
