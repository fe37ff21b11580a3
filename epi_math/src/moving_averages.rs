//! Rolling mean calculation
//!
//! Daily indicators are smoothed with a trailing 7-day mean (MM7) before
//! they are forecast. Missing days inside the window are skipped rather
//! than poisoning the mean, and a value is emitted as soon as the window
//! holds `min_periods` observations.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Window length of the MM7 smoothing
pub const MM7_WINDOW: usize = 7;

/// Trailing rolling mean over possibly-missing observations
#[derive(Debug, Clone)]
pub struct RollingMean {
    period: usize,
    min_periods: usize,
    values: VecDeque<Option<f64>>,
    sum: f64,
    count: usize,
}

impl RollingMean {
    /// Create a new rolling mean with the specified period
    pub fn new(period: usize, min_periods: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }
        if min_periods == 0 || min_periods > period {
            return Err(MathError::InvalidInput(format!(
                "min_periods must be between 1 and {}, got {}",
                period, min_periods
            )));
        }

        Ok(Self {
            period,
            min_periods,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
            count: 0,
        })
    }

    /// Push the next day's observation; `None` marks a missing day
    pub fn update(&mut self, value: Option<f64>) {
        let value = value.filter(|v| v.is_finite());
        self.values.push_back(value);
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }

        if self.values.len() > self.period {
            if let Some(Some(old_value)) = self.values.pop_front() {
                self.sum -= old_value;
                self.count -= 1;
            }
        }
    }

    /// Current mean, or `None` while fewer than `min_periods` values are present
    pub fn value(&self) -> Option<f64> {
        if self.count < self.min_periods {
            return None;
        }
        Some(self.sum / self.count as f64)
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the window, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
        self.sum = 0.0;
        self.count = 0;
    }
}

/// Trailing rolling mean of a whole column.
///
/// The output has the same length as the input. Entry `i` is the mean of
/// the present values among `values[i + 1 - period ..= i]`, or `None` when
/// fewer than `min_periods` of them are present.
pub fn rolling_mean(
    values: &[Option<f64>],
    period: usize,
    min_periods: usize,
) -> Result<Vec<Option<f64>>> {
    let mut window = RollingMean::new(period, min_periods)?;
    Ok(values
        .iter()
        .map(|&v| {
            window.update(v);
            window.value()
        })
        .collect())
}
