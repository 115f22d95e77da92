//! Historical and live temperature records.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::season::Season;

/// One daily mean temperature for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub city: String,
    pub timestamp: NaiveDate,
    pub temperature: f64,
    pub season: Season,
}

impl Reading {
    /// Builds a reading whose season is derived from the date.
    pub fn new(city: &str, timestamp: NaiveDate, temperature: f64) -> Self {
        Self {
            city: city.to_string(),
            timestamp,
            temperature,
            season: Season::of(timestamp),
        }
    }
}

/// Current conditions for a city as reported by a weather provider.
///
/// `timestamp` carries the city's own UTC offset so its calendar date is the
/// local one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveObservation {
    pub city_display_name: String,
    pub timestamp: DateTime<FixedOffset>,
    pub temperature: f64,
}

/// Distinct city names in first-seen order.
pub fn cities(readings: &[Reading]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for r in readings {
        if !seen.contains(&r.city.as_str()) {
            seen.push(&r.city);
        }
    }
    seen
}
