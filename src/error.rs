//! Error types for the Q-learning agent

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("unknown action {action}: not part of the configured action set")]
    UnknownAction { action: String },

    #[error("cannot serialize value table: {message}")]
    Serialization { message: String },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to {operation}: {source}")]
    Load {
        operation: String,
        #[source]
        source: LoadFailure,
    },
}

/// Underlying cause of a failed table load.
#[derive(Error, Debug)]
pub enum LoadFailure {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("malformed table blob: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("row has {got} values, expected {expected}")]
    RowLength { expected: usize, got: usize },
}

impl Error {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfig {
            message: message.into(),
        }
    }
}
