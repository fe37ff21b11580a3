//! Model and pipeline configuration
//!
//! All hyperparameters are fixed constants of the forecasting system; the
//! structs exist so that the constants live in one place and can be
//! validated, logged and serialized alongside a forecast.

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Date column of the national indicator tables
pub const DEFAULT_DATE_COLUMN: &str = "jour";

/// 7-day rolling mean of daily positive tests
pub const DEFAULT_VALUE_COLUMN: &str = "cas_mm7";

/// Days forecast past the last observation
pub const DEFAULT_HORIZON_DAYS: usize = 7;

/// Seed of the uncertainty sampler
pub const DEFAULT_SEED: u64 = 42;

/// A periodic component: period in days and number of Fourier harmonics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityConfig {
    pub period_days: f64,
    pub fourier_order: usize,
}

impl SeasonalityConfig {
    pub const YEARLY: SeasonalityConfig = SeasonalityConfig {
        period_days: 365.25,
        fourier_order: 10,
    };

    pub const WEEKLY: SeasonalityConfig = SeasonalityConfig {
        period_days: 7.0,
        fourier_order: 3,
    };

    pub const DAILY: SeasonalityConfig = SeasonalityConfig {
        period_days: 1.0,
        fourier_order: 4,
    };
}

/// Hyperparameters of the additive trend + seasonality model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    /// Scale of the Laplace prior on trend changes; larger bends more easily
    pub changepoint_prior_scale: f64,
    /// Scale of the Gaussian prior on seasonal coefficients
    pub seasonality_prior_scale: f64,
    /// Number of potential trend changepoints
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints may be placed
    pub changepoint_range: f64,
    pub yearly_seasonality: bool,
    pub weekly_seasonality: bool,
    pub daily_seasonality: bool,
    /// Probability mass covered by the uncertainty interval
    pub interval_width: f64,
    /// Number of simulated paths used to estimate the interval
    pub uncertainty_samples: usize,
    pub seed: u64,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            changepoint_prior_scale: 0.15,
            seasonality_prior_scale: 10.0,
            n_changepoints: 25,
            changepoint_range: 0.8,
            yearly_seasonality: true,
            weekly_seasonality: true,
            daily_seasonality: false,
            interval_width: 0.95,
            uncertainty_samples: 1000,
            seed: DEFAULT_SEED,
        }
    }
}

impl DecompositionConfig {
    /// Check that every scale and width is usable
    pub fn validate(&self) -> Result<()> {
        if !(self.changepoint_prior_scale > 0.0) || !self.changepoint_prior_scale.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "changepoint_prior_scale must be positive, got {}",
                self.changepoint_prior_scale
            )));
        }
        if !(self.seasonality_prior_scale > 0.0) || !self.seasonality_prior_scale.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonality_prior_scale must be positive, got {}",
                self.seasonality_prior_scale
            )));
        }
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "changepoint_range must be in (0, 1], got {}",
                self.changepoint_range
            )));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval_width must be in (0, 1), got {}",
                self.interval_width
            )));
        }
        if self.uncertainty_samples == 0 {
            return Err(ForecastError::InvalidParameter(
                "uncertainty_samples must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Enabled seasonal components, by name
    pub fn seasonalities(&self) -> Vec<(&'static str, SeasonalityConfig)> {
        let mut enabled = Vec::new();
        if self.yearly_seasonality {
            enabled.push(("yearly", SeasonalityConfig::YEARLY));
        }
        if self.weekly_seasonality {
            enabled.push(("weekly", SeasonalityConfig::WEEKLY));
        }
        if self.daily_seasonality {
            enabled.push(("daily", SeasonalityConfig::DAILY));
        }
        enabled
    }

    /// Fewest observations the model accepts: two full cycles of the
    /// longest enabled seasonality, and never fewer than two points
    pub fn min_history(&self) -> usize {
        self.seasonalities()
            .iter()
            .map(|(_, s)| (2.0 * s.period_days).floor() as usize)
            .max()
            .unwrap_or(2)
            .max(2)
    }
}

/// Call-level settings of one forecast run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    pub value_column: String,
    pub horizon_days: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            value_column: DEFAULT_VALUE_COLUMN.to_string(),
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }
}
