use chrono::NaiveDate;
use epi_forecast::data::ObservedSeries;
use epi_forecast::engine::forecast;
use std::f64::consts::PI;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("EpiSight: Basic Forecasting Example");
    println!("===================================\n");

    // Create sample data
    println!("Creating sample data...");
    let series = create_sample_case_data()?;
    let first = series.first_date().ok_or("empty series")?;
    let last = series.last_date().ok_or("empty series")?;
    println!(
        "Sample data created: {} daily points ({} -> {})\n",
        series.len(),
        first,
        last
    );

    // Fit on the whole history and project one week
    println!("Training model and forecasting...");
    let (fit, table) = forecast(&series, 7)?;
    println!("{}", table);

    // Decomposition of the first forecast day
    if let Some(row) = fit.rows_after(last).first() {
        println!("Components for {}:", row.date);
        println!("  trend:  {:.1}", row.trend);
        for (name, value) in &row.seasonal {
            println!("  {:<7} {:.1}", format!("{}:", name), value);
        }
    }

    println!("\n{}", fit.in_sample_accuracy(&series)?);
    Ok(())
}

/// Three winters of a seasonal epidemic with fewer tests on weekends
fn create_sample_case_data() -> Result<ObservedSeries, Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2020, 5, 13).ok_or("invalid start date")?;
    let values: Vec<f64> = (0..1141)
        .map(|i| {
            let t = i as f64;
            let winter_wave = 9000.0 * (1.0 + (2.0 * PI * (t - 230.0) / 365.25).cos()) / 2.0;
            let weekend = if i % 7 == 4 || i % 7 == 5 { 0.7 } else { 1.0 };
            (1500.0 + winter_wave) * weekend
        })
        .collect();
    Ok(ObservedSeries::from_daily_values(start, &values)?)
}
