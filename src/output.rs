//! Output formatting and persistence for analysis results.
//!
//! Supports pretty-printing, JSON serialization, and CSV export of the
//! enriched series for charting.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::stats::EnrichedReading;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Flat CSV row of an [`EnrichedReading`]. Undefined statistics are written
/// as empty fields.
#[derive(Serialize)]
struct EnrichedRow<'a> {
    city: &'a str,
    timestamp: String,
    temperature: f64,
    season: &'static str,
    mean_temp: Option<f64>,
    std_temp: Option<f64>,
    lower_limit: Option<f64>,
    upper_limit: Option<f64>,
    is_anomaly: bool,
}

impl<'a> From<&'a EnrichedReading> for EnrichedRow<'a> {
    fn from(e: &'a EnrichedReading) -> Self {
        Self {
            city: &e.reading.city,
            timestamp: e.reading.timestamp.format("%Y-%m-%d").to_string(),
            temperature: e.reading.temperature,
            season: e.reading.season.as_str(),
            mean_temp: e.mean_temp,
            std_temp: e.std_temp,
            lower_limit: e.lower_limit,
            upper_limit: e.upper_limit,
            is_anomaly: e.is_anomaly,
        }
    }
}

/// Logs any value using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(value: &T) {
    info!("{:#?}", value);
}

/// Logs any value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends enriched readings as rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records(path: &str, rows: &[EnrichedReading]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = rows.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for row in rows {
        writer.serialize(EnrichedRow::from(row))?;
    }
    writer.flush()?;

    Ok(())
}
