//! Piecewise-linear trend basis
//!
//! The trend is `k·t + m + Σ δ_j·(t - s_j)⁺`: a base slope and offset plus
//! one hinge per changepoint `s_j`. Written this way the trend is linear in
//! its parameters, so it can share one regression with the seasonal terms.
//! Time is expected on the scaled `[0, 1]` history axis.

use crate::{MathError, Result};

/// Changepoint locations for a piecewise-linear trend
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinearBasis {
    changepoints: Vec<f64>,
}

impl PiecewiseLinearBasis {
    /// Create a basis from explicit, strictly increasing changepoints
    pub fn new(changepoints: Vec<f64>) -> Result<Self> {
        if changepoints.windows(2).any(|w| w[1] <= w[0]) {
            return Err(MathError::InvalidInput(
                "Changepoints must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { changepoints })
    }

    /// Place up to `count` changepoints uniformly over the first `range`
    /// fraction of the observed (sorted) time points.
    ///
    /// Changepoints sit on observed times, skipping the first one. Fewer are
    /// placed when the history is too short to hold `count` distinct ones.
    pub fn uniform(t: &[f64], count: usize, range: f64) -> Result<Self> {
        if !(range > 0.0 && range <= 1.0) {
            return Err(MathError::InvalidInput(format!(
                "Changepoint range must be in (0, 1], got {}",
                range
            )));
        }
        if t.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot place changepoints on an empty history".to_string(),
            ));
        }

        let hist_size = ((t.len() as f64) * range).floor() as usize;
        let count = count.min(hist_size.saturating_sub(1));
        if count == 0 {
            return Ok(Self {
                changepoints: Vec::new(),
            });
        }

        let last = (hist_size - 1) as f64;
        let mut changepoints: Vec<f64> = (0..=count)
            .skip(1)
            .map(|i| {
                let idx = (last * i as f64 / count as f64).round() as usize;
                t[idx]
            })
            .collect();
        changepoints.dedup();

        Self::new(changepoints)
    }

    /// Changepoint locations
    pub fn changepoints(&self) -> &[f64] {
        &self.changepoints
    }

    /// Number of regressor columns: offset, slope, one hinge per changepoint
    pub fn width(&self) -> usize {
        2 + self.changepoints.len()
    }

    /// Append the trend regressors for `t` to a design row
    pub fn extend_row(&self, t: f64, row: &mut Vec<f64>) {
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|s| (t - s).max(0.0)));
    }

    /// Evaluate the trend with offset `m`, slope `k` and changepoint deltas
    pub fn evaluate(&self, t: f64, m: f64, k: f64, deltas: &[f64]) -> f64 {
        let hinge: f64 = self
            .changepoints
            .iter()
            .zip(deltas)
            .map(|(s, d)| d * (t - s).max(0.0))
            .sum();
        m + k * t + hinge
    }
}
