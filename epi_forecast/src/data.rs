//! Indicator tables and the observed series fed to the forecast model

use crate::config::DEFAULT_DATE_COLUMN;
use crate::error::{ForecastError, Result};
use crate::utils::date_parser;
use chrono::{Days, NaiveDate};
use epi_math::rolling_mean;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// One day's observation of the forecast indicator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Cleaned daily series, sorted ascending by date.
///
/// Gaps are allowed. Duplicate dates are kept here and rejected when a
/// model is trained on the series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservedSeries {
    points: Vec<SeriesPoint>,
}

impl ObservedSeries {
    /// Create a series from points in any order
    pub fn new(mut points: Vec<SeriesPoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    /// Consecutive daily values starting at `start`
    pub fn from_daily_values(start: NaiveDate, values: &[f64]) -> Result<Self> {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                start
                    .checked_add_days(Days::new(i as u64))
                    .map(|date| SeriesPoint { date, value })
                    .ok_or_else(|| {
                        ForecastError::DataError(format!(
                            "{} daily values overflow the calendar after {}",
                            values.len(),
                            start
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(points))
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Fail with a `DataError` on the first repeated date
    pub fn ensure_unique_dates(&self) -> Result<()> {
        match self.points.windows(2).find(|w| w[0].date >= w[1].date) {
            Some(w) => Err(ForecastError::DataError(format!(
                "Duplicate observation for {}",
                w[1].date
            ))),
            None => Ok(()),
        }
    }
}

/// A daily indicator table keyed by a date column
#[derive(Debug, Clone)]
pub struct IndicatorTable {
    df: DataFrame,
    date_column: String,
}

/// Data loader for indicator tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load an indicator table from a CSV file with a header row
    pub fn from_csv<P: AsRef<Path>>(path: P, date_column: &str) -> Result<IndicatorTable> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df, date_column)
    }

    /// Load a table keyed by the default `jour` column
    pub fn from_csv_default<P: AsRef<Path>>(path: P) -> Result<IndicatorTable> {
        Self::from_csv(path, DEFAULT_DATE_COLUMN)
    }

    /// Wrap an existing DataFrame
    pub fn from_dataframe(df: DataFrame, date_column: &str) -> Result<IndicatorTable> {
        if !df.get_column_names().contains(&date_column) {
            return Err(ForecastError::DataError(format!(
                "No date column '{}' in table (columns: {})",
                date_column,
                df.get_column_names().join(", ")
            )));
        }

        Ok(IndicatorTable {
            df,
            date_column: date_column.to_string(),
        })
    }
}

impl IndicatorTable {
    /// Get the DataFrame
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// Get the date column name
    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.get_column_names().contains(&name)
    }

    /// Dates of every row; `None` where the cell is empty or unparseable
    pub fn dates(&self) -> Result<Vec<Option<NaiveDate>>> {
        let as_text = self.df.column(&self.date_column)?.cast(&DataType::Utf8)?;
        let dates = as_text
            .utf8()?
            .into_iter()
            .map(|cell| cell.and_then(|s| date_parser::parse_date(s).ok()))
            .collect();
        Ok(dates)
    }

    /// Numeric values of a column; `None` where the cell is empty or NaN
    pub fn values(&self, column: &str) -> Result<Vec<Option<f64>>> {
        if !self.has_column(column) {
            return Err(ForecastError::DataError(format!(
                "No value column '{}' in table",
                column
            )));
        }
        let as_float = self.df.column(column)?.cast(&DataType::Float64)?;
        let values = as_float
            .f64()?
            .into_iter()
            .map(|cell| cell.filter(|v| !v.is_nan()))
            .collect();
        Ok(values)
    }

    /// Add `target` as the trailing rolling mean of `source`.
    ///
    /// Rows are taken in table order, which must be chronological. Every
    /// row with at least one observation in its window gets a value.
    pub fn with_rolling_mean(mut self, source: &str, target: &str, window: usize) -> Result<Self> {
        let smoothed = rolling_mean(&self.values(source)?, window, 1)?;
        self.df.with_column(Series::new(target, smoothed))?;
        Ok(self)
    }
}

/// Reduce a raw indicator table to the observed series of `value_column`.
///
/// Rows with a missing or negative value, or without a readable date, are
/// dropped; the rest are sorted ascending by date. An empty result is not an
/// error here.
pub fn prepare(table: &IndicatorTable, value_column: &str) -> Result<ObservedSeries> {
    let dates = table.dates()?;
    let values = table.values(value_column)?;
    Ok(prepare_rows(dates.into_iter().zip(values)))
}

/// Row-level cleaning behind [`prepare`]
pub fn prepare_rows<I>(rows: I) -> ObservedSeries
where
    I: IntoIterator<Item = (Option<NaiveDate>, Option<f64>)>,
{
    let mut missing = 0usize;
    let mut negative = 0usize;
    let mut points = Vec::new();

    for (date, value) in rows {
        match (date, value.filter(|v| v.is_finite())) {
            (Some(date), Some(value)) if value >= 0.0 => points.push(SeriesPoint { date, value }),
            (Some(_), Some(_)) => negative += 1,
            _ => missing += 1,
        }
    }

    debug!(
        kept = points.len(),
        missing, negative, "prepared observed series"
    );
    ObservedSeries::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    #[test]
    fn test_prepare_rows_drops_negative_and_missing() {
        let rows = vec![
            (Some(day(1)), Some(10.0)),
            (Some(day(2)), Some(-5.0)),
            (Some(day(3)), None),
            (Some(day(4)), Some(12.5)),
            (None, Some(3.0)),
            (Some(day(5)), Some(f64::NAN)),
        ];
        let series = prepare_rows(rows);

        assert_eq!(series.dates(), vec![day(1), day(4)]);
        assert_eq!(series.values(), vec![10.0, 12.5]);
    }

    #[test]
    fn test_prepare_rows_keeps_zero() {
        let series = prepare_rows(vec![(Some(day(1)), Some(0.0))]);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_series_sorts_but_keeps_duplicates() {
        let series = prepare_rows(vec![
            (Some(day(3)), Some(3.0)),
            (Some(day(1)), Some(1.0)),
            (Some(day(3)), Some(4.0)),
        ]);

        assert_eq!(series.dates(), vec![day(1), day(3), day(3)]);
        // stable sort keeps input order among equal dates
        assert_eq!(series.values(), vec![1.0, 3.0, 4.0]);
        assert!(series.ensure_unique_dates().is_err());
    }

    #[test]
    fn test_from_daily_values() {
        let series = ObservedSeries::from_daily_values(day(30), &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.first_date(), Some(day(30)));
        assert_eq!(
            series.last_date(),
            Some(NaiveDate::from_ymd_opt(2023, 2, 1).unwrap())
        );
        assert!(series.ensure_unique_dates().is_ok());
    }

    #[test]
    fn test_table_accessors() {
        let df = DataFrame::new(vec![
            Series::new("jour", &["2023-01-01", "2023-01-02", "bad"]),
            Series::new("cas_mm7", &[Some(1.0), None, Some(3.0)]),
        ])
        .unwrap();
        let table = DataLoader::from_dataframe(df, "jour").unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.dates().unwrap(), vec![Some(day(1)), Some(day(2)), None]);
        assert_eq!(table.values("cas_mm7").unwrap(), vec![Some(1.0), None, Some(3.0)]);
        assert!(table.values("missing").is_err());
    }

    #[test]
    fn test_missing_date_column() {
        let df = DataFrame::new(vec![Series::new("cas_mm7", &[1.0])]).unwrap();
        let err = DataLoader::from_dataframe(df, "jour").unwrap_err();
        assert!(matches!(err, ForecastError::DataError(_)));
    }

    #[test]
    fn test_with_rolling_mean() {
        let df = DataFrame::new(vec![
            Series::new("jour", &["2023-01-01", "2023-01-02", "2023-01-03"]),
            Series::new("cas", &[7.0, 14.0, 21.0]),
        ])
        .unwrap();
        let table = DataLoader::from_dataframe(df, "jour")
            .unwrap()
            .with_rolling_mean("cas", "cas_mm7", 7)
            .unwrap();

        assert_eq!(
            table.values("cas_mm7").unwrap(),
            vec![Some(7.0), Some(10.5), Some(14.0)]
        );
    }
}
