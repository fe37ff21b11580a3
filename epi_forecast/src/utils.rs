//! Utility functions for the epi_forecast crate

use chrono::{Days, NaiveDate};

use crate::error::{ForecastError, Result};

/// Create the `horizon` consecutive calendar days following `last_date`
pub fn future_dates(last_date: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon as u64)
        .map(|offset| {
            last_date.checked_add_days(Days::new(offset)).ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "Horizon of {} days overflows the calendar after {}",
                    horizon, last_date
                ))
            })
        })
        .collect()
}

/// Date parsing for indicator tables
pub mod date_parser {
    use super::*;

    const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

    /// Parse a calendar date.
    ///
    /// Accepts ISO-8601 (`2023-06-30`), day-first (`30/06/2023`), and
    /// datetimes whose date part is ISO-8601 (`2023-06-30 00:00:00`,
    /// `2023-06-30T00:00:00`).
    pub fn parse_date(s: &str) -> Result<NaiveDate> {
        let s = s.trim();
        let mut last_err = None;
        for format in DATE_FORMATS {
            match NaiveDate::parse_from_str(s, format) {
                Ok(date) => return Ok(date),
                Err(e) => last_err = Some(e),
            }
        }

        if let Some(date_part) = s.get(..10) {
            if s.len() > 10 && matches!(s.as_bytes()[10], b' ' | b'T') {
                return Ok(NaiveDate::parse_from_str(date_part, "%Y-%m-%d")?);
            }
        }

        match last_err {
            Some(e) => Err(ForecastError::ParseError(e)),
            None => Err(ForecastError::DataError(format!("Unparseable date: {}", s))),
        }
    }
}
