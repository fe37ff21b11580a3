//! # EpiSight
//!
//! Workspace facade over the EpiSight forecast core.
//!
//! ## Example
//!
//! ```
//! use episight_workspace::epi_forecast::ForecastRow;
//! use chrono::NaiveDate;
//!
//! let day = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();
//! let row = ForecastRow::from_raw(day, -3.2, -10.0, 4.6);
//! assert_eq!(row.prediction, 0.0);
//! assert_eq!(row.upper_bound, 5.0);
//! ```

pub use epi_forecast;
pub use epi_math;

pub use epi_forecast::{forecast, prepare, DataLoader, ForecastError, ForecastTable, ObservedSeries};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_facade_reaches_both_crates() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let series = ObservedSeries::from_daily_values(start, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.len(), 3);

        let smoothed = epi_math::rolling_mean(&[Some(1.0), Some(3.0)], 7, 1).unwrap();
        assert_eq!(smoothed, vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_short_history_is_a_data_error() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let series = ObservedSeries::from_daily_values(start, &[1.0; 10]).unwrap();
        assert!(matches!(
            forecast(&series, 7),
            Err(ForecastError::DataError(_))
        ));
    }
}
