//! Error types for the explicit dynamics engine

use thiserror::Error;

/// Main error type for assembly, integration and run management
#[derive(Error, Debug)]
pub enum FEAError {
    #[error("Size mismatch: {0}")]
    SizeMismatch(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid time step {0}: must be finite and positive")]
    InvalidTimeStep(f64),

    #[error("Singular matrix: {0}")]
    SingularMatrix(String),

    #[error("Linear solve failed: {0}")]
    SolveError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for FEA operations
pub type FEAResult<T> = Result<T, FEAError>;
