//! Error types for serialhub.
//!
//! Stream errors (`Closed`, `Unsupported`) are surfaced synchronously to the
//! caller and never retried. The remaining variants cover the hub message
//! layer and configuration loading.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The provider reports its transport as closed at call time.
    #[error("Stream closed")]
    Closed,

    /// Permanent: the stream has no such capability.
    #[error("{0}")]
    Unsupported(&'static str),

    /// A frontend message that cannot be handled.
    #[error("Invalid message: {0}")]
    Message(String),

    #[error("Failed to load config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn is_closed(&self) -> bool {
        matches!(self, Error::Closed)
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported(_))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            Error::Closed => io::Error::new(io::ErrorKind::NotConnected, err),
            Error::Unsupported(_) => io::Error::new(io::ErrorKind::Unsupported, err),
            other => io::Error::new(io::ErrorKind::Other, other),
        }
    }
}
