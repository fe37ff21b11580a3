//! Forecast engine: fit on the full history, project `horizon_days` ahead
//!
//! Each call retrains from scratch and keeps no state between calls. Either
//! a complete table of `horizon_days` rows is produced or an error is
//! returned.

use crate::config::{ForecastSettings, DEFAULT_HORIZON_DAYS};
use crate::data::{prepare, IndicatorTable, ObservedSeries};
use crate::error::{ForecastError, Result};
use crate::models::{AdditiveDecomposition, FitRow, ForecastModel, FullFit, TrainedForecastModel};
use crate::utils::future_dates;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// One forecast day.
///
/// Always satisfies `0 <= lower_bound <= prediction <= upper_bound`, with
/// integral values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub prediction: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl ForecastRow {
    /// Build a row from raw model output: clamp at zero, round to whole
    /// counts, then restore the bound ordering
    pub fn from_raw(date: NaiveDate, estimate: f64, lower: f64, upper: f64) -> Self {
        let clean = |v: f64| v.max(0.0).round();
        let prediction = clean(estimate);
        Self {
            date,
            prediction,
            lower_bound: clean(lower).min(prediction),
            upper_bound: clean(upper).max(prediction),
        }
    }

    fn from_fit(row: &FitRow) -> Self {
        Self::from_raw(row.date, row.yhat, row.yhat_lower, row.yhat_upper)
    }
}

/// Forecast for the days immediately following the last observation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastTable {
    rows: Vec<ForecastRow>,
}

impl ForecastTable {
    /// Create a table, checking that dates are consecutive days
    pub fn new(rows: Vec<ForecastRow>) -> Result<Self> {
        if let Some(w) = rows.windows(2).find(|w| w[0].date.succ_opt() != Some(w[1].date)) {
            return Err(ForecastError::DataError(format!(
                "Forecast dates must be consecutive days, found {} followed by {}",
                w[0].date, w[1].date
            )));
        }
        Ok(Self { rows })
    }

    /// Take the rows after `last_observed` out of a full fit
    pub fn from_fit(fit: &FullFit, last_observed: NaiveDate, horizon_days: usize) -> Result<Self> {
        let future = fit.rows_after(last_observed);
        if future.len() != horizon_days {
            return Err(ForecastError::FittingError(format!(
                "Expected {} forecast days after {}, model produced {}",
                horizon_days,
                last_observed,
                future.len()
            )));
        }
        if future.first().map(|r| r.date) != last_observed.succ_opt() {
            return Err(ForecastError::FittingError(format!(
                "Forecast does not start the day after {}",
                last_observed
            )));
        }
        Self::new(future.iter().map(ForecastRow::from_fit).collect())
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// Serialize the rows as a JSON array
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.rows)?)
    }
}

impl fmt::Display for ForecastTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>10}  {:>10}  {:>11}  {:>11}",
            "date", "prediction", "lower_bound", "upper_bound"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:>10}  {:>10}  {:>11}  {:>11}",
                row.date, row.prediction, row.lower_bound, row.upper_bound
            )?;
        }
        Ok(())
    }
}

/// Forecast `horizon_days` past the end of `series` with the default model
pub fn forecast(series: &ObservedSeries, horizon_days: usize) -> Result<(FullFit, ForecastTable)> {
    forecast_with(&AdditiveDecomposition::default(), series, horizon_days)
}

/// Forecast the default horizon of seven days
pub fn forecast_default(series: &ObservedSeries) -> Result<(FullFit, ForecastTable)> {
    forecast(series, DEFAULT_HORIZON_DAYS)
}

/// Forecast with any model.
///
/// The model is evaluated over every observed date plus the horizon; the
/// full evaluation is returned for diagnostics alongside the table of
/// future days.
pub fn forecast_with<M: ForecastModel>(
    model: &M,
    series: &ObservedSeries,
    horizon_days: usize,
) -> Result<(FullFit, ForecastTable)> {
    if horizon_days == 0 {
        return Err(ForecastError::InvalidParameter(
            "Forecast horizon must be at least one day".to_string(),
        ));
    }
    let (first, last) = match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(ForecastError::DataError(
                "Cannot forecast from an empty series".to_string(),
            ))
        }
    };

    info!("Training on {} days of data", series.len());
    info!("Period: {} -> {}", first, last);

    let trained = model.train(series)?;

    let mut index = series.dates();
    index.extend(future_dates(last, horizon_days)?);
    let fit = trained.predict(&index)?;
    let table = ForecastTable::from_fit(&fit, trained.last_observed(), horizon_days)?;

    info!(
        model = trained.name(),
        "Forecast for the next {} days:\n{}", horizon_days, table
    );
    Ok((fit, table))
}

/// Prepare `settings.value_column` from a raw table and forecast it
pub fn forecast_table(
    table: &IndicatorTable,
    settings: &ForecastSettings,
) -> Result<(ObservedSeries, FullFit, ForecastTable)> {
    let series = prepare(table, &settings.value_column)?;
    let (fit, forecast) = forecast(&series, settings.horizon_days)?;
    Ok((series, fit, forecast))
}
