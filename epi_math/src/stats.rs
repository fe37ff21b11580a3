//! Summary statistics over samples

use crate::{MathError, Result};
use statrs::statistics::{Data, OrderStatistics, Statistics};

/// Sample quantile (`tau` in `[0, 1]`) of the finite values in `samples`
pub fn quantile(samples: &[f64], tau: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&tau) {
        return Err(MathError::InvalidInput(format!(
            "Quantile level must be in [0, 1], got {}",
            tau
        )));
    }
    let finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take a quantile of an empty sample".to_string(),
        ));
    }

    let mut data = Data::new(finite);
    Ok(data.quantile(tau))
}

/// Two-sided interval covering `width` of the sample mass
pub fn central_interval(samples: &[f64], width: f64) -> Result<(f64, f64)> {
    if !(width > 0.0 && width < 1.0) {
        return Err(MathError::InvalidInput(format!(
            "Interval width must be in (0, 1), got {}",
            width
        )));
    }
    let tail = (1.0 - width) / 2.0;
    Ok((quantile(samples, tail)?, quantile(samples, 1.0 - tail)?))
}

/// Mean absolute value, zero for an empty slice
pub fn mean_abs(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| v.abs()).mean()
}
