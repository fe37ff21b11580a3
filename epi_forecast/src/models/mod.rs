//! Forecasting models for daily time series

use crate::data::ObservedSeries;
use crate::error::{ForecastError, Result};
use crate::metrics::{forecast_accuracy, ForecastAccuracy};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;

/// Model evaluation at one date, in the units of the observed series.
///
/// Values are raw model output and may be negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitRow {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub trend: f64,
    /// Seasonal contributions keyed by component name (`yearly`, `weekly`, ...)
    pub seasonal: HashMap<String, f64>,
}

/// In-sample plus out-of-sample evaluation of a trained model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullFit {
    rows: Vec<FitRow>,
}

impl FullFit {
    /// Create a fit from rows sorted by date
    pub fn new(rows: Vec<FitRow>) -> Result<Self> {
        if rows.windows(2).any(|w| w[0].date >= w[1].date) {
            return Err(ForecastError::FittingError(
                "Fit rows must be strictly increasing in date".to_string(),
            ));
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[FitRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows dated strictly after `date`
    pub fn rows_after(&self, date: NaiveDate) -> &[FitRow] {
        let start = self.rows.partition_point(|row| row.date <= date);
        &self.rows[start..]
    }

    /// Row for a given date, if evaluated
    pub fn get(&self, date: NaiveDate) -> Option<&FitRow> {
        self.rows
            .binary_search_by_key(&date, |row| row.date)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Accuracy of `yhat` against the observations it was fitted on
    pub fn in_sample_accuracy(&self, series: &ObservedSeries) -> Result<ForecastAccuracy> {
        let mut predicted = Vec::with_capacity(series.len());
        let mut actual = Vec::with_capacity(series.len());
        for point in series.points() {
            if let Some(row) = self.get(point.date) {
                predicted.push(row.yhat);
                actual.push(point.value);
            }
        }
        forecast_accuracy(&predicted, &actual)
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Evaluate the model, with uncertainty bounds, at the given sorted dates
    fn predict(&self, dates: &[NaiveDate]) -> Result<FullFit>;

    /// Last date of the training series
    fn last_observed(&self) -> NaiveDate;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on an observed series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on the full series
    fn train(&self, series: &ObservedSeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod decomposition;

pub use decomposition::{AdditiveDecomposition, FittedDecomposition};
