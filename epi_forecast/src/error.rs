//! Error types for the epi_forecast crate

use epi_math::MathError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the epi_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The series is empty, malformed, or too short for the model
    #[error("Data error: {0}")]
    DataError(String),

    /// The model could not be fitted or evaluated
    #[error("Fitting error: {0}")]
    FittingError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error reading or writing a CSV forecast table
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error parsing a date
    #[error("Parse error: {0}")]
    ParseError(#[from] chrono::ParseError),

    /// Error serializing a forecast
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InsufficientData(msg) => ForecastError::DataError(msg),
            MathError::InvalidInput(msg) => ForecastError::InvalidParameter(msg),
            MathError::CalculationError(msg) => ForecastError::FittingError(msg),
        }
    }
}
