use std::path::PathBuf;

use thiserror::Error;

use crate::entity::EntityType;

/// Core error type shared across careseed crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The manifest file is missing, unreadable or not valid JSON.
    #[error("storage error ({}): {message}", path.display())]
    Storage { path: PathBuf, message: String },
    /// A parent identifier was requested from an empty pool.
    #[error("empty registry: no identifiers recorded for '{0}'")]
    EmptyRegistry(EntityType),
    /// A value has no SQL literal representation.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub(crate) fn storage(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Storage {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Convenience alias for results returned by careseed crates.
pub type Result<T> = std::result::Result<T, Error>;
