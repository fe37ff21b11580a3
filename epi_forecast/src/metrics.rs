//! Metrics for evaluating forecast accuracy

use crate::error::{ForecastError, Result};

/// Calculate accuracy metrics for predicted vs actual values
pub fn forecast_accuracy(predicted: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if predicted.len() != actual.len() || predicted.is_empty() {
        return Err(ForecastError::DataError(
            "Predicted and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = predicted.len() as f64;

    let errors: Vec<f64> = predicted
        .iter()
        .zip(actual.iter())
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    // Days with zero cases carry no percentage error
    let nonzero: Vec<f64> = actual
        .iter()
        .zip(errors.iter())
        .filter(|(&a, _)| a != 0.0)
        .map(|(&a, &e)| (e.abs() / a.abs()) * 100.0)
        .collect();
    let mape = if nonzero.is_empty() {
        0.0
    } else {
        nonzero.iter().sum::<f64>() / nonzero.len() as f64
    };

    let smape = actual
        .iter()
        .zip(predicted.iter())
        .map(|(&a, &f)| {
            let abs_a = a.abs();
            let abs_f = f.abs();
            if abs_a + abs_f == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / (abs_a + abs_f)
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse,
        mape,
        smape,
    })
}

/// Forecast accuracy metrics
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error over non-zero days
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "In-sample accuracy:")?;
        writeln!(f, "  MAE:   {:.2}", self.mae)?;
        writeln!(f, "  RMSE:  {:.2}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.2}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.2}%", self.smape)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_accuracy_values() {
        let predicted = [105.0, 106.0, 107.0];
        let actual = [106.0, 107.0, 108.0];
        let accuracy = forecast_accuracy(&predicted, &actual).unwrap();

        assert_relative_eq!(accuracy.mae, 1.0);
        assert_relative_eq!(accuracy.mse, 1.0);
        assert_relative_eq!(accuracy.rmse, 1.0);
        assert!(accuracy.mape > 0.9 && accuracy.mape < 1.0);
    }

    #[test]
    fn test_zero_days_skip_percentage_error() {
        let accuracy = forecast_accuracy(&[0.0, 5.0], &[0.0, 10.0]).unwrap();
        assert_relative_eq!(accuracy.mape, 50.0);
        // 0/0 contributes zero; 200 * 5 / 15 for the other day, averaged
        assert_relative_eq!(accuracy.smape, 200.0 * 5.0 / 15.0 / 2.0);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(forecast_accuracy(&[1.0], &[1.0, 2.0]).is_err());
        assert!(forecast_accuracy(&[], &[]).is_err());
    }

    #[test]
    fn test_display() {
        let accuracy = forecast_accuracy(&[1.0], &[2.0]).unwrap();
        let text = accuracy.to_string();
        assert!(text.contains("MAE:   1.00"));
        assert!(text.contains("MAPE:  50.00%"));
    }
}
