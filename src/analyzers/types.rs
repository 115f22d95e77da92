//! Data types produced by the analysis pipeline.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::fmt;

use crate::season::Season;
use crate::stats::EnrichedReading;

/// Descriptive statistics for one (city, season) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalStats {
    pub city: String,
    pub season: Season,
    pub count: usize,
    pub average: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl SeasonalStats {
    /// The ±2σ band around the seasonal average.
    pub fn band(&self) -> (f64, f64) {
        (self.average - 2.0 * self.std, self.average + 2.0 * self.std)
    }
}

/// Summary of a temperature sample, quartiles included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

/// Where a live temperature falls relative to its seasonal band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    AnomalouslyLow,
    WithinHistoricalRange,
    AnomalouslyHigh,
}

impl Verdict {
    pub fn is_anomalous(&self) -> bool {
        !matches!(self, Verdict::WithinHistoricalRange)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::AnomalouslyLow => "anomalously low",
            Verdict::WithinHistoricalRange => "within historical range",
            Verdict::AnomalouslyHigh => "anomalously high",
        })
    }
}

/// A classified live reading with the band it was judged against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Judgement {
    pub season: Season,
    pub lower: f64,
    pub upper: f64,
    pub verdict: Verdict,
}

/// Everything computed from one city's history.
#[derive(Debug, Clone, Serialize)]
pub struct CityReport {
    pub city: String,
    pub summary: Option<Summary>,
    pub seasonal: Vec<SeasonalStats>,
    pub enriched: Vec<EnrichedReading>,
    pub anomalies: usize,
}

/// A live observation judged against a city's seasonal history.
#[derive(Debug, Clone, Serialize)]
pub struct LiveVerdict {
    pub city: String,
    pub city_display_name: String,
    pub timestamp: DateTime<FixedOffset>,
    pub temperature: f64,
    #[serde(flatten)]
    pub judgement: Judgement,
}
