//! Error types for the viewer.

use crate::types::EntityId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed map text or frame payload (bad header, dimension
    /// mismatch). Fatal for the initial map, skip-logged for frames.
    #[error("format error: {0}")]
    Format(String),

    /// Transport failure or non-success HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// The server referenced an id this client never registered.
    /// Always recovered locally.
    #[error("unknown entity id {0}")]
    UnknownEntity(EntityId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Format(err.to_string())
    }
}
