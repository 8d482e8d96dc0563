use thiserror::Error;

/// Errors emitted while filtering a fixture script.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid section pattern: {0}")]
    Regex(#[from] regex::Error),
}
