//! # Epi Math
//!
//! Numeric building blocks for daily epidemiological series.
//! This crate provides the pieces the additive decomposition model is
//! assembled from: smoothing, seasonal and trend regressors, and a
//! penalized least squares solver.

use thiserror::Error;

pub mod fourier;
pub mod moving_averages;
pub mod regression;
pub mod stats;
pub mod trend;

/// Errors that can occur in numeric calculations
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;

pub use fourier::FourierSeries;
pub use moving_averages::{rolling_mean, RollingMean};
pub use regression::PenalizedLeastSquares;
pub use trend::PiecewiseLinearBasis;
