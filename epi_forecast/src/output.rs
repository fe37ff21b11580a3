//! Persistence of forecast tables for the visualization layer
//!
//! The table is written as UTF-8 CSV with a header row
//! `date,prediction,lower_bound,upper_bound` and ISO-8601 dates. Readers
//! treat a missing file as "no forecast available".

use crate::engine::{ForecastRow, ForecastTable};
use crate::error::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name of a persisted forecast, e.g. `predictions_7j.csv`
pub fn forecast_file_name(horizon_days: usize) -> String {
    format!("predictions_{}j.csv", horizon_days)
}

/// Write a forecast table as CSV to any writer
pub fn write_forecast<W: io::Write>(table: &ForecastTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in table.rows() {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save a forecast table into `dir`, returning the written path
pub fn save_forecast<P: AsRef<Path>>(table: &ForecastTable, dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(forecast_file_name(table.len()));

    write_forecast(table, fs::File::create(&path)?)?;
    info!("Forecast saved: {}", path.display());
    Ok(path)
}

/// Read a forecast table from any reader
pub fn read_forecast<R: io::Read>(reader: R) -> Result<ForecastTable> {
    let mut rdr = csv::Reader::from_reader(reader);
    let rows = rdr
        .deserialize::<ForecastRow>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    ForecastTable::new(rows)
}

/// Load a persisted forecast; `Ok(None)` when no forecast has been written
pub fn load_forecast<P: AsRef<Path>>(path: P) -> Result<Option<ForecastTable>> {
    let path = path.as_ref();
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("No forecast available at {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };
    read_forecast(file).map(Some)
}
