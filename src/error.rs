//! Error types for the regtune crate

use thiserror::Error;

/// Result type alias for regtune operations
pub type Result<T> = std::result::Result<T, RegtuneError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum RegtuneError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Optimization error: {0}")]
    OptimizationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),
}

impl From<serde_json::Error> for RegtuneError {
    fn from(err: serde_json::Error) -> Self {
        RegtuneError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for RegtuneError {
    fn from(err: ndarray::ShapeError) -> Self {
        RegtuneError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<polars::error::PolarsError> for RegtuneError {
    fn from(err: polars::error::PolarsError) -> Self {
        RegtuneError::DataError(err.to_string())
    }
}
