use chrono::{Duration, NaiveDate};
use epi_forecast::data::{ObservedSeries, SeriesPoint};
use epi_forecast::engine::{forecast, forecast_default, forecast_with};
use epi_forecast::{AdditiveDecomposition, DecompositionConfig, ForecastError};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::f64::consts::PI;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Epidemic-like daily series: slow trend, yearly wave, weekend dip
fn epidemic_series(end: NaiveDate, days: usize) -> ObservedSeries {
    let start = end - Duration::days(days as i64 - 1);
    let values: Vec<f64> = (0..days)
        .map(|i| {
            let t = i as f64;
            let weekly = if i % 7 >= 5 { -300.0 } else { 100.0 };
            5000.0 + 0.8 * t + 3500.0 * (2.0 * PI * t / 365.25).sin() + weekly
        })
        .collect();
    ObservedSeries::from_daily_values(start, &values).unwrap()
}

#[test]
fn test_scenario_1141_days_ending_june_2023() {
    let end = date(2023, 6, 30);
    let series = epidemic_series(end, 1141);
    assert_eq!(series.len(), 1141);

    let (fit, table) = forecast(&series, 7).unwrap();

    let expected: Vec<NaiveDate> = (1..=7).map(|d| date(2023, 7, d)).collect();
    assert_eq!(table.dates(), expected);
    assert_eq!(fit.len(), 1141 + 7);
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(30)]
fn test_row_count_matches_horizon(#[case] horizon: usize) {
    let series = epidemic_series(date(2022, 12, 31), 800);
    let (_, table) = forecast(&series, horizon).unwrap();

    assert_eq!(table.len(), horizon);
    let last = series.last_date().unwrap();
    for (i, row) in table.rows().iter().enumerate() {
        assert_eq!(row.date, last + Duration::days(i as i64 + 1));
    }
}

#[test]
fn test_bounds_are_ordered_and_non_negative() {
    let series = epidemic_series(date(2022, 12, 31), 900);
    let (_, table) = forecast_default(&series).unwrap();

    assert_eq!(table.len(), 7);
    for row in table.rows() {
        assert!(row.lower_bound >= 0.0);
        assert!(row.lower_bound <= row.prediction);
        assert!(row.prediction <= row.upper_bound);
        assert_eq!(row.prediction, row.prediction.round());
        assert_eq!(row.lower_bound, row.lower_bound.round());
        assert_eq!(row.upper_bound, row.upper_bound.round());
    }
}

#[test]
fn test_declining_to_zero_is_clamped() {
    // Cases fall linearly and sit at zero for the last months; the raw
    // linear trend points below zero
    let values: Vec<f64> = (0..800).map(|i| (2000.0 - 3.0 * i as f64).max(0.0)).collect();
    let series = ObservedSeries::from_daily_values(date(2021, 1, 1), &values).unwrap();

    let (_, table) = forecast(&series, 14).unwrap();
    assert_eq!(table.len(), 14);
    for row in table.rows() {
        assert!(row.prediction >= 0.0);
        assert!(row.lower_bound >= 0.0);
        assert!(row.upper_bound >= row.prediction);
    }
}

#[test]
fn test_all_zero_series() {
    let series = ObservedSeries::from_daily_values(date(2021, 1, 1), &[0.0; 760]).unwrap();
    let (_, table) = forecast(&series, 7).unwrap();

    for row in table.rows() {
        assert_eq!(row.prediction, 0.0);
        assert_eq!(row.lower_bound, 0.0);
    }
}

#[test]
fn test_forecast_is_idempotent() {
    let series = epidemic_series(date(2022, 12, 31), 800);

    let (fit_a, table_a) = forecast(&series, 7).unwrap();
    let (fit_b, table_b) = forecast(&series, 7).unwrap();

    assert_eq!(table_a, table_b);
    assert_eq!(fit_a, fit_b);
}

#[test]
fn test_series_with_gaps() {
    let full = epidemic_series(date(2022, 12, 31), 900);
    let points: Vec<SeriesPoint> = full
        .points()
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 10 != 3)
        .map(|(_, p)| *p)
        .collect();
    let series = ObservedSeries::new(points);

    let (fit, table) = forecast(&series, 7).unwrap();
    assert_eq!(table.dates()[0], date(2023, 1, 1));
    // the fit covers observed dates only, plus the horizon
    assert_eq!(fit.len(), series.len() + 7);
}

#[test]
fn test_empty_series_raises_data_error() {
    let result = forecast(&ObservedSeries::default(), 7);
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_too_short_history_raises_data_error() {
    let series = epidemic_series(date(2022, 12, 31), 400);
    let err = forecast(&series, 7).unwrap_err();

    match err {
        ForecastError::DataError(msg) => assert!(msg.contains("730")),
        other => panic!("Expected DataError, got {:?}", other),
    }
}

#[test]
fn test_duplicate_dates_raise_data_error() {
    let series = epidemic_series(date(2022, 12, 31), 800);
    let mut points = series.points().to_vec();
    points.push(points[100]);

    let result = forecast(&ObservedSeries::new(points), 7);
    assert!(matches!(result, Err(ForecastError::DataError(_))));
}

#[test]
fn test_custom_model_configuration() {
    let series = epidemic_series(date(2022, 12, 31), 120);
    let model = AdditiveDecomposition::new(DecompositionConfig {
        yearly_seasonality: false,
        interval_width: 0.8,
        ..Default::default()
    })
    .unwrap();

    let (_, table) = forecast_with(&model, &series, 7).unwrap();
    assert_eq!(table.len(), 7);
}
