//! Additive trend + seasonality decomposition
//!
//! The series is modelled as
//!
//! ```text
//! y(t) = trend(t) + Σ seasonal_c(t) + ε,    ε ~ N(0, σ²)
//! ```
//!
//! where the trend is piecewise linear with potential changepoints spread
//! over the first part of the history and each seasonal component is a
//! truncated Fourier series. Coefficients get priors: N(0, 5²) on the base
//! offset and slope, Laplace(0, τ) on changepoint deltas (τ is the
//! changepoint prior scale) and N(0, s²) on seasonal coefficients (s is the
//! seasonality prior scale). The fit is the MAP estimate, found by
//! iteratively reweighted penalized least squares on scaled time and values.
//!
//! Uncertainty combines observation noise with trend uncertainty: future
//! paths get new changepoints at the historical rate, with Laplace
//! magnitudes matching the fitted deltas.

use crate::config::DecompositionConfig;
use crate::data::ObservedSeries;
use crate::error::{ForecastError, Result};
use crate::models::{FitRow, ForecastModel, FullFit, TrainedForecastModel};
use chrono::{Datelike, Duration, NaiveDate};
use epi_math::regression::{predict_row, PenalizedLeastSquares};
use epi_math::stats::{central_interval, mean_abs};
use epi_math::{FourierSeries, PiecewiseLinearBasis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal, Poisson};
use std::collections::HashMap;
use tracing::debug;

const MAX_ITERATIONS: usize = 100;
const TOLERANCE: f64 = 1e-8;
const TREND_PRIOR_SCALE: f64 = 5.0;
/// Floor on |δ| in the reweighted Laplace penalty
const MIN_DELTA: f64 = 1e-6;
const MIN_VARIANCE: f64 = 1e-10;

/// Untrained additive decomposition model
#[derive(Debug, Clone)]
pub struct AdditiveDecomposition {
    name: String,
    config: DecompositionConfig,
}

#[derive(Debug, Clone)]
struct SeasonalComponent {
    name: &'static str,
    basis: FourierSeries,
    /// Position of the first coefficient of this component
    offset: usize,
}

/// Trained additive decomposition; opaque outside this module
#[derive(Debug, Clone)]
pub struct FittedDecomposition {
    name: String,
    config: DecompositionConfig,
    start: NaiveDate,
    last_observed: NaiveDate,
    span_days: f64,
    y_scale: f64,
    trend: PiecewiseLinearBasis,
    seasonal: Vec<SeasonalComponent>,
    coefficients: Vec<f64>,
    /// Residual standard deviation on the scaled axis
    sigma: f64,
    iterations: usize,
}

impl AdditiveDecomposition {
    /// Create a model with the given hyperparameters
    pub fn new(config: DecompositionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: "Additive decomposition (trend + seasonality)".to_string(),
            config,
        })
    }

    pub fn config(&self) -> &DecompositionConfig {
        &self.config
    }

    fn check_history(&self, series: &ObservedSeries) -> Result<(NaiveDate, NaiveDate)> {
        let (start, last) = match (series.first_date(), series.last_date()) {
            (Some(start), Some(last)) => (start, last),
            _ => {
                return Err(ForecastError::DataError(
                    "Cannot fit a model to an empty series".to_string(),
                ))
            }
        };
        series.ensure_unique_dates()?;

        let min_history = self.config.min_history();
        if series.len() < min_history {
            let names: Vec<&str> = self.config.seasonalities().iter().map(|(n, _)| *n).collect();
            return Err(ForecastError::DataError(format!(
                "Need at least {} daily observations to identify {} seasonality, got {}",
                min_history,
                if names.is_empty() { "trend".to_string() } else { names.join(" + ") },
                series.len()
            )));
        }
        Ok((start, last))
    }
}

impl Default for AdditiveDecomposition {
    fn default() -> Self {
        Self {
            name: "Additive decomposition (trend + seasonality)".to_string(),
            config: DecompositionConfig::default(),
        }
    }
}

impl ForecastModel for AdditiveDecomposition {
    type Trained = FittedDecomposition;

    fn train(&self, series: &ObservedSeries) -> Result<Self::Trained> {
        let (start, last_observed) = self.check_history(series)?;
        let span_days = (last_observed - start).num_days() as f64;

        let values = series.values();
        let y_scale = match values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())) {
            m if m > 0.0 => m,
            _ => 1.0,
        };
        let y: Vec<f64> = values.iter().map(|v| v / y_scale).collect();
        let t: Vec<f64> = series
            .dates()
            .iter()
            .map(|d| (*d - start).num_days() as f64 / span_days)
            .collect();

        let trend = PiecewiseLinearBasis::uniform(
            &t,
            self.config.n_changepoints,
            self.config.changepoint_range,
        )?;
        let mut seasonal = Vec::new();
        let mut width = trend.width();
        for (name, season) in self.config.seasonalities() {
            let basis = FourierSeries::new(season.period_days, season.fourier_order)?;
            seasonal.push(SeasonalComponent {
                name,
                basis,
                offset: width,
            });
            width += basis.width();
        }

        let design: Vec<Vec<f64>> = series
            .dates()
            .iter()
            .zip(&t)
            .map(|(date, &ti)| design_row(&trend, &seasonal, *date, ti))
            .collect();

        let n_changepoints = trend.changepoints().len();
        let tau = self.config.changepoint_prior_scale;
        let seasonality_scale = self.config.seasonality_prior_scale;

        let mean = y.iter().sum::<f64>() / y.len() as f64;
        let mut variance =
            (y.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / y.len() as f64).max(MIN_VARIANCE);
        let mut delta_weights = vec![tau; n_changepoints];
        let mut coefficients = vec![0.0; width];
        let mut iterations = 0;

        for iteration in 1..=MAX_ITERATIONS {
            let mut penalties = vec![variance / (seasonality_scale * seasonality_scale); width];
            penalties[0] = variance / (TREND_PRIOR_SCALE * TREND_PRIOR_SCALE);
            penalties[1] = variance / (TREND_PRIOR_SCALE * TREND_PRIOR_SCALE);
            for (j, weight) in delta_weights.iter().enumerate() {
                penalties[2 + j] = variance / (tau * weight);
            }

            let next = PenalizedLeastSquares::new(penalties)?.solve(&design, &y)?;
            let change = next
                .iter()
                .zip(&coefficients)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0_f64, f64::max);
            coefficients = next;

            let rss: f64 = design
                .iter()
                .zip(&y)
                .map(|(row, yi)| (yi - predict_row(row, &coefficients)).powi(2))
                .sum();
            variance = (rss / y.len() as f64).max(MIN_VARIANCE);
            delta_weights = coefficients[2..2 + n_changepoints]
                .iter()
                .map(|d| d.abs().max(MIN_DELTA))
                .collect();

            iterations = iteration;
            if change < TOLERANCE {
                break;
            }
        }

        let fitted = FittedDecomposition {
            name: self.name.clone(),
            config: self.config.clone(),
            start,
            last_observed,
            span_days,
            y_scale,
            trend,
            seasonal,
            coefficients,
            sigma: variance.sqrt(),
            iterations,
        };
        debug!(
            iterations,
            residual_scale = fitted.residual_scale(),
            changepoints = n_changepoints,
            "fitted additive decomposition"
        );
        Ok(fitted)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn design_row(
    trend: &PiecewiseLinearBasis,
    seasonal: &[SeasonalComponent],
    date: NaiveDate,
    t: f64,
) -> Vec<f64> {
    let mut row = Vec::with_capacity(
        trend.width() + seasonal.iter().map(|c| c.basis.width()).sum::<usize>(),
    );
    trend.extend_row(t, &mut row);
    let day = day_number(date);
    for component in seasonal {
        component.basis.extend_row(day, &mut row);
    }
    row
}

impl FittedDecomposition {
    /// Residual standard deviation in the units of the series
    pub fn residual_scale(&self) -> f64 {
        self.sigma * self.y_scale
    }

    /// Reweighting rounds used by the fit
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn config(&self) -> &DecompositionConfig {
        &self.config
    }

    /// Dates of the potential trend changepoints
    pub fn changepoint_dates(&self) -> Vec<NaiveDate> {
        self.trend
            .changepoints()
            .iter()
            .map(|s| self.start + Duration::days((s * self.span_days).round() as i64))
            .collect()
    }

    fn deltas(&self) -> &[f64] {
        &self.coefficients[2..self.trend.width()]
    }

    fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }

    /// Trend and seasonal components at `date`, on the scaled axis
    fn components(&self, date: NaiveDate) -> Result<(f64, Vec<(&'static str, f64)>)> {
        let t = self.scaled_time(date);
        let trend = self.trend.evaluate(
            t,
            self.coefficients[0],
            self.coefficients[1],
            self.deltas(),
        );
        let day = day_number(date);
        let seasonal = self
            .seasonal
            .iter()
            .map(|c| {
                let coefficients = &self.coefficients[c.offset..c.offset + c.basis.width()];
                Ok((c.name, c.basis.evaluate(day, coefficients)?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((trend, seasonal))
    }

    /// Simulated deviations from the point estimate, one vector of samples
    /// per time point, on the scaled axis
    fn sample_deviations(&self, t: &[f64]) -> Result<Vec<Vec<f64>>> {
        let n_samples = self.config.uncertainty_samples;
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let t_max = t.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let change_rate = self.trend.changepoints().len() as f64 * (t_max - 1.0);
        let new_changes = if change_rate > 0.0 {
            Some(Poisson::new(change_rate).map_err(|e| ForecastError::FittingError(e.to_string()))?)
        } else {
            None
        };
        let magnitude = Exp::new(1.0 / (mean_abs(self.deltas()) + 1e-8))
            .map_err(|e| ForecastError::FittingError(e.to_string()))?;
        let noise = Normal::new(0.0, self.sigma)
            .map_err(|e| ForecastError::FittingError(e.to_string()))?;

        let mut samples = vec![Vec::with_capacity(n_samples); t.len()];
        for _ in 0..n_samples {
            let changes: Vec<(f64, f64)> = match &new_changes {
                Some(count) => {
                    let count = count.sample(&mut rng) as usize;
                    (0..count)
                        .map(|_| {
                            let at = rng.gen_range(1.0..t_max);
                            let size = magnitude.sample(&mut rng);
                            let delta = if rng.gen_bool(0.5) { size } else { -size };
                            (at, delta)
                        })
                        .collect()
                }
                None => Vec::new(),
            };

            for (ti, slot) in t.iter().zip(samples.iter_mut()) {
                let drift: f64 = changes
                    .iter()
                    .map(|(at, delta)| delta * (ti - at).max(0.0))
                    .sum();
                slot.push(drift + noise.sample(&mut rng));
            }
        }
        Ok(samples)
    }
}

impl TrainedForecastModel for FittedDecomposition {
    fn predict(&self, dates: &[NaiveDate]) -> Result<FullFit> {
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ForecastError::InvalidParameter(
                "Prediction dates must be strictly increasing".to_string(),
            ));
        }

        let t: Vec<f64> = dates.iter().map(|d| self.scaled_time(*d)).collect();
        let deviations = self.sample_deviations(&t)?;

        let mut rows = Vec::with_capacity(dates.len());
        for (date, samples) in dates.iter().zip(&deviations) {
            let (trend, seasonal) = self.components(*date)?;
            let yhat = trend + seasonal.iter().map(|(_, v)| v).sum::<f64>();
            let (low, high) = central_interval(samples, self.config.interval_width)?;

            let row = FitRow {
                date: *date,
                yhat: yhat * self.y_scale,
                yhat_lower: (yhat + low) * self.y_scale,
                yhat_upper: (yhat + high) * self.y_scale,
                trend: trend * self.y_scale,
                seasonal: seasonal
                    .into_iter()
                    .map(|(name, v)| (name.to_string(), v * self.y_scale))
                    .collect::<HashMap<_, _>>(),
            };
            if ![row.yhat, row.yhat_lower, row.yhat_upper].iter().all(|v| v.is_finite()) {
                return Err(ForecastError::FittingError(format!(
                    "Model produced a non-finite estimate for {}",
                    date
                )));
            }
            rows.push(row);
        }

        FullFit::new(rows)
    }

    fn last_observed(&self) -> NaiveDate {
        self.last_observed
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::future_dates;
    use std::f64::consts::PI;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
    }

    /// Linear trend plus an exact weekly cycle, no noise
    fn weekly_series(days: usize) -> ObservedSeries {
        let values: Vec<f64> = (0..days)
            .map(|i| 1000.0 + 0.5 * i as f64 + 100.0 * (2.0 * PI * i as f64 / 7.0).sin())
            .collect();
        ObservedSeries::from_daily_values(start(), &values).unwrap()
    }

    #[test]
    fn test_fits_trend_and_weekly_cycle() {
        let series = weekly_series(800);
        let fitted = AdditiveDecomposition::default().train(&series).unwrap();
        let fit = fitted.predict(&series.dates()).unwrap();

        let accuracy = fit.in_sample_accuracy(&series).unwrap();
        assert!(accuracy.rmse < 5.0, "rmse too high: {}", accuracy.rmse);
        assert!(fitted.residual_scale() < 5.0);
        assert!(fitted.iterations() >= 1);
    }

    #[test]
    fn test_components_sum_to_estimate() {
        let series = weekly_series(800);
        let fitted = AdditiveDecomposition::default().train(&series).unwrap();
        let fit = fitted.predict(&series.dates()[..10]).unwrap();

        for row in fit.rows() {
            let total = row.trend + row.seasonal.values().sum::<f64>();
            assert!((total - row.yhat).abs() < 1e-6);
            assert!(row.seasonal.contains_key("yearly"));
            assert!(row.seasonal.contains_key("weekly"));
        }
    }

    #[test]
    fn test_interval_brackets_estimate() {
        let series = weekly_series(800);
        let fitted = AdditiveDecomposition::default().train(&series).unwrap();
        let last = series.last_date().unwrap();
        let mut dates = series.dates();
        dates.extend(future_dates(last, 7).unwrap());

        let fit = fitted.predict(&dates).unwrap();
        assert_eq!(fit.len(), 807);
        for row in fit.rows() {
            assert!(row.yhat_lower <= row.yhat && row.yhat <= row.yhat_upper);
        }
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let series = weekly_series(800);
        let model = AdditiveDecomposition::default();
        let last = series.last_date().unwrap();
        let horizon = future_dates(last, 7).unwrap();

        let first = model.train(&series).unwrap().predict(&horizon).unwrap();
        let second = model.train(&series).unwrap().predict(&horizon).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_short_history_is_rejected() {
        let series = weekly_series(100);
        let err = AdditiveDecomposition::default().train(&series).unwrap_err();
        assert!(matches!(err, ForecastError::DataError(_)));

        // weekly-only model accepts the same history
        let weekly_only = AdditiveDecomposition::new(DecompositionConfig {
            yearly_seasonality: false,
            ..Default::default()
        })
        .unwrap();
        assert!(weekly_only.train(&series).is_ok());
    }

    #[test]
    fn test_empty_series_is_rejected() {
        let err = AdditiveDecomposition::default()
            .train(&ObservedSeries::default())
            .unwrap_err();
        assert!(matches!(err, ForecastError::DataError(_)));
    }

    #[test]
    fn test_unsorted_prediction_dates_rejected() {
        let series = weekly_series(60);
        let model = AdditiveDecomposition::new(DecompositionConfig {
            yearly_seasonality: false,
            ..Default::default()
        })
        .unwrap();
        let fitted = model.train(&series).unwrap();
        let dates = series.dates();

        assert!(fitted.predict(&[dates[5], dates[2]]).is_err());
    }

    #[test]
    fn test_changepoints_lie_in_first_part_of_history() {
        let series = weekly_series(800);
        let fitted = AdditiveDecomposition::default().train(&series).unwrap();
        let changepoints = fitted.changepoint_dates();
        let cutoff = start() + Duration::days(640);

        assert_eq!(changepoints.len(), 25);
        assert!(changepoints.iter().all(|d| *d > start() && *d <= cutoff));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = AdditiveDecomposition::new(DecompositionConfig {
            interval_width: 0.0,
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
