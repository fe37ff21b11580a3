//! Train the forecast model on the national test indicators and save the
//! predicted days next to the processed data.

use anyhow::{Context, Result};
use clap::Parser;
use epi_forecast::config::{DEFAULT_DATE_COLUMN, DEFAULT_HORIZON_DAYS, DEFAULT_VALUE_COLUMN};
use epi_forecast::engine::forecast_table;
use epi_forecast::output::save_forecast;
use epi_forecast::{DataLoader, ForecastSettings};
use epi_math::moving_averages::MM7_WINDOW;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "episight-forecast", version, about = "Forecast daily COVID-19 cases")]
struct Args {
    /// Indicator table (CSV with a header row)
    #[arg(long, default_value = "data/processed/indicateurs_tests.csv")]
    input: PathBuf,

    /// Directory receiving predictions_<N>j.csv
    #[arg(long, default_value = "data/processed")]
    output_dir: PathBuf,

    #[arg(long, default_value = DEFAULT_DATE_COLUMN)]
    date_column: String,

    /// Column to forecast
    #[arg(long, default_value = DEFAULT_VALUE_COLUMN)]
    value_column: String,

    /// Number of days to forecast
    #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS)]
    horizon: usize,

    /// Derive the value column as the 7-day rolling mean of this raw column
    #[arg(long)]
    smooth_from: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut table = DataLoader::from_csv(&args.input, &args.date_column)
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    if let Some(source) = &args.smooth_from {
        info!("Deriving {} from {}", args.value_column, source);
        table = table
            .with_rolling_mean(source, &args.value_column, MM7_WINDOW)
            .context("failed to smooth the raw column")?;
    }

    let settings = ForecastSettings {
        value_column: args.value_column.clone(),
        horizon_days: args.horizon,
    };
    let (series, fit, forecast) =
        forecast_table(&table, &settings).context("forecast unavailable")?;

    match fit.in_sample_accuracy(&series) {
        Ok(accuracy) => info!("{}", accuracy),
        Err(e) => info!("In-sample accuracy unavailable: {}", e),
    }

    println!("{}", forecast);
    let path = save_forecast(&forecast, &args.output_dir)
        .with_context(|| format!("failed to save forecast into {}", args.output_dir.display()))?;
    println!("Forecast saved: {}", path.display());

    Ok(())
}
