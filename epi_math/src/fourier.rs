//! Fourier series regressors for periodic components
//!
//! A seasonal component of period `P` is modelled as a truncated Fourier
//! series. For order `N` each time point maps to `2N` features:
//! `sin(2πnt/P), cos(2πnt/P)` for `n = 1..=N`, interleaved.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Truncated Fourier basis of a given period (in days) and order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourierSeries {
    period: f64,
    order: usize,
}

impl FourierSeries {
    /// Create a new Fourier basis
    pub fn new(period: f64, order: usize) -> Result<Self> {
        if !(period > 0.0) || !period.is_finite() {
            return Err(MathError::InvalidInput(format!(
                "Period must be a positive number of days, got {}",
                period
            )));
        }
        if order == 0 {
            return Err(MathError::InvalidInput(
                "Fourier order must be greater than zero".to_string(),
            ));
        }

        Ok(Self { period, order })
    }

    /// Period in days
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Number of harmonics
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of regressor columns this basis contributes
    pub fn width(&self) -> usize {
        2 * self.order
    }

    /// Features for a single time point, `t` measured in days
    pub fn features(&self, t: f64) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.width());
        self.extend_row(t, &mut row);
        row
    }

    /// Append the features for `t` to an existing design row
    pub fn extend_row(&self, t: f64, row: &mut Vec<f64>) {
        for n in 1..=self.order {
            let angle = 2.0 * PI * n as f64 * t / self.period;
            row.push(angle.sin());
            row.push(angle.cos());
        }
    }

    /// Evaluate the series with the given coefficients at `t`
    pub fn evaluate(&self, t: f64, coefficients: &[f64]) -> Result<f64> {
        if coefficients.len() != self.width() {
            return Err(MathError::InvalidInput(format!(
                "Expected {} Fourier coefficients, got {}",
                self.width(),
                coefficients.len()
            )));
        }

        Ok(self
            .features(t)
            .iter()
            .zip(coefficients)
            .map(|(x, beta)| x * beta)
            .sum())
    }
}
