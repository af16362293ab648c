use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::core::stats::MetricKind;

/// Custom error type for rasp-stat
#[derive(Error, Debug)]
pub enum StatError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Command `{command}` failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("Command `{command}` timed out after {timeout:?}")]
    CommandTimeout { command: String, timeout: Duration },

    #[error("Could not parse {kind} output {raw:?}: {reason}")]
    Parse {
        kind: MetricKind,
        raw: String,
        reason: String,
    },

    #[error("Server error: {0}")]
    Server(String),
}

/// Result type alias for rasp-stat
pub type Result<T> = std::result::Result<T, StatError>;

impl StatError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        StatError::Config(msg.into())
    }

    pub fn command_failed<C: Into<String>, R: Into<String>>(command: C, reason: R) -> Self {
        StatError::CommandFailed {
            command: command.into(),
            reason: reason.into(),
        }
    }

    pub fn command_timeout<C: Into<String>>(command: C, timeout: Duration) -> Self {
        StatError::CommandTimeout {
            command: command.into(),
            timeout,
        }
    }

    /// Create a parse error, keeping the offending output for the log line
    pub fn parse<R: Into<String>, S: Into<String>>(kind: MetricKind, raw: R, reason: S) -> Self {
        StatError::Parse {
            kind,
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    pub fn server<S: Into<String>>(msg: S) -> Self {
        StatError::Server(msg.into())
    }
}
