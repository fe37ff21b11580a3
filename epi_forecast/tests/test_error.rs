use epi_forecast::error::ForecastError;
use epi_math::MathError;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let forecast_error = ForecastError::from(io_error);
    assert!(matches!(forecast_error, ForecastError::IoError(_)));

    let parse_error = chrono::NaiveDate::parse_from_str("invalid", "%Y-%m-%d").unwrap_err();
    let forecast_error = ForecastError::from(parse_error);
    assert!(matches!(forecast_error, ForecastError::ParseError(_)));
}

#[test]
fn test_math_errors_map_to_forecast_taxonomy() {
    let err = ForecastError::from(MathError::InsufficientData("empty".to_string()));
    assert!(matches!(err, ForecastError::DataError(_)));

    let err = ForecastError::from(MathError::CalculationError("singular".to_string()));
    assert!(matches!(err, ForecastError::FittingError(_)));

    let err = ForecastError::from(MathError::InvalidInput("period".to_string()));
    assert!(matches!(err, ForecastError::InvalidParameter(_)));
}

#[test]
fn test_error_display() {
    let error = ForecastError::DataError("Cannot forecast from an empty series".to_string());
    assert_eq!(
        error.to_string(),
        "Data error: Cannot forecast from an empty series"
    );

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error_string = ForecastError::from(io_error).to_string();
    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));
}
