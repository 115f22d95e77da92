//! CSV parser for historical temperature datasets.
//!
//! Expected header: `city,timestamp,temperature,season`. The `season` column
//! may be absent or empty, in which case it is derived from the date.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::reading::Reading;
use crate::season::Season;

#[derive(Debug, Deserialize)]
struct ReadingRow {
    city: String,
    timestamp: NaiveDate,
    temperature: f64,
    #[serde(default)]
    season: Option<Season>,
}

/// Decodes readings from any CSV source.
///
/// # Errors
///
/// Returns an error on malformed rows, unknown season labels, an empty
/// city name, or a non-finite temperature.
pub fn parse_readings<R: Read>(reader: R) -> Result<Vec<Reading>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut readings = Vec::new();

    for (line, result) in rdr.deserialize().enumerate() {
        let row: ReadingRow = result.with_context(|| format!("bad CSV record {}", line + 1))?;
        if row.city.is_empty() {
            bail!("CSV record {} has an empty city", line + 1);
        }
        if !row.temperature.is_finite() {
            bail!(
                "CSV record {} has a non-finite temperature {}",
                line + 1,
                row.temperature
            );
        }
        let season = row.season.unwrap_or_else(|| Season::of(row.timestamp));
        readings.push(Reading {
            city: row.city,
            timestamp: row.timestamp,
            temperature: row.temperature,
            season,
        });
    }

    debug!(rows = readings.len(), "Parsed temperature CSV");
    Ok(readings)
}

/// Opens and parses a CSV file from disk.
pub fn load_readings(path: impl AsRef<Path>) -> Result<Vec<Reading>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    parse_readings(file)
}
