use std::collections::BTreeMap;

use crate::analyzers::types::SeasonalStats;
use crate::analyzers::utility::{mean, stddev};
use crate::reading::Reading;
use crate::season::Season;

/// Groups readings by (city, season) and computes average, sample standard
/// deviation, minimum and maximum per group.
///
/// Only observed groups produce a row. Rows are ordered by city, then by
/// season label (`autumn`, `spring`, `summer`, `winter`). Groups with a
/// single reading get a NaN `std`.
pub fn seasonal_stats(readings: &[Reading]) -> Vec<SeasonalStats> {
    let mut groups: BTreeMap<(&str, &str), (Season, Vec<f64>)> = BTreeMap::new();

    for r in readings {
        groups
            .entry((r.city.as_str(), r.season.as_str()))
            .or_insert_with(|| (r.season, Vec::new()))
            .1
            .push(r.temperature);
    }

    groups
        .into_iter()
        .map(|((city, _), (season, temps))| {
            let average = mean(&temps);
            SeasonalStats {
                city: city.to_string(),
                season,
                count: temps.len(),
                average,
                std: stddev(&temps, average),
                min: temps.iter().copied().fold(f64::INFINITY, f64::min),
                max: temps.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            }
        })
        .collect()
}

/// [`seasonal_stats`] restricted to one city.
pub fn seasonal_stats_for_city(readings: &[Reading], city: &str) -> Vec<SeasonalStats> {
    let subset: Vec<Reading> = readings.iter().filter(|r| r.city == city).cloned().collect();
    seasonal_stats(&subset)
}
