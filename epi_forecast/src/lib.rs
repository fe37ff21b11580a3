//! # Epi Forecast
//!
//! Short-horizon forecasting of daily epidemiological indicators.
//!
//! ## Features
//!
//! - Loading of daily indicator tables (CSV, via polars) and MM7 smoothing
//! - Preparation of a clean `(date, value)` series
//! - An additive trend + yearly + weekly seasonality model with a 95%
//!   uncertainty band
//! - A forecast table of non-negative whole counts, persisted as CSV
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use epi_forecast::data::{prepare, DataLoader};
//! use epi_forecast::engine::forecast;
//! use epi_forecast::output::save_forecast;
//!
//! # fn main() -> epi_forecast::Result<()> {
//! // Load the national test indicators
//! let table = DataLoader::from_csv("data/processed/indicateurs_tests.csv", "jour")?;
//!
//! // Keep the 7-day rolling mean of positive tests
//! let series = prepare(&table, "cas_mm7")?;
//!
//! // Fit and project one week ahead
//! let (_fit, table) = forecast(&series, 7)?;
//! println!("{}", table);
//!
//! save_forecast(&table, "data/processed")?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod models;
pub mod output;
pub mod utils;

// Re-export commonly used types
pub use crate::config::{DecompositionConfig, ForecastSettings};
pub use crate::data::{prepare, DataLoader, IndicatorTable, ObservedSeries, SeriesPoint};
pub use crate::engine::{forecast, ForecastRow, ForecastTable};
pub use crate::error::{ForecastError, Result};
pub use crate::models::{
    AdditiveDecomposition, FitRow, ForecastModel, FullFit, TrainedForecastModel,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
