//! Error types for oar-core.
//!
//! The write queue itself never surfaces errors (see `sync::diagnostics`);
//! this enum covers the fallible edges around it: opening the local
//! database, reading configuration, validating domain input, and talking
//! to the hosted backend.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected caller input, such as an unknown table or a no-op status change
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Missing or malformed client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Remote(#[from] crate::remote::RemoteError),
}
