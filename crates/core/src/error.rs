//! Error types for volgrid

use thiserror::Error;

/// Main error type for volgrid operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Duplicate composite key (ID, X, Y, Z): {0}")]
    DuplicateKey(String),

    #[error("Invalid axis: {0} (expected one of X, Y, Z)")]
    InvalidAxis(String),

    #[error("Model {0} not supported")]
    UnsupportedModel(String),

    #[error("Result shape mismatch: expected {expected:?}, got {got:?}")]
    ResultShape {
        expected: (usize, usize, usize),
        got: (usize, usize, usize),
    },

    #[error("No preprocessing has been applied to the data")]
    NoPreprocessing,

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for volgrid operations
pub type Result<T> = std::result::Result<T, Error>;
