//! Error types for BranchSight

use thiserror::Error;

/// BranchSight error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed branch directive: {0}")]
    MalformedDirective(String),

    #[error("No matching #endif for branch: {0}")]
    UnterminatedBranch(String),

    #[error("Pairing marker not found: {0}")]
    MissingMarker(String),

    #[error("Preprocessor error: {0}")]
    Preprocess(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Expansion depth limit exceeded ({0})")]
    DepthExceeded(usize),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for BranchSight
pub type Result<T> = std::result::Result<T, Error>;
