use chrono::{DateTime, FixedOffset};

use crate::analyzers::types::{Judgement, SeasonalStats, Verdict};
use crate::error::{AnalysisError, Result};
use crate::season::Season;

/// Places `temperature` relative to the band `[lower, upper]`.
///
/// Values equal to a bound count as within range.
pub fn classify(temperature: f64, lower: f64, upper: f64) -> Verdict {
    match temperature {
        t if t < lower => Verdict::AnomalouslyLow,
        t if t > upper => Verdict::AnomalouslyHigh,
        _ => Verdict::WithinHistoricalRange,
    }
}

/// Judges a live temperature against the seasonal row matching the season
/// of `timestamp`. The season follows the local calendar date of
/// `timestamp`, i.e. the date in its own offset.
///
/// `seasonal` is the table for `city`; rows for other cities are ignored.
///
/// # Errors
///
/// - [`AnalysisError::MissingSeasonalData`] if the city has no history in
///   that season.
/// - [`AnalysisError::UndefinedBaseline`] if the matching group is too small
///   to have a standard deviation.
pub fn judge(
    city: &str,
    temperature: f64,
    timestamp: DateTime<FixedOffset>,
    seasonal: &[SeasonalStats],
) -> Result<Judgement> {
    let season = Season::of(timestamp.date_naive());

    let row = seasonal
        .iter()
        .find(|s| s.city == city && s.season == season)
        .ok_or_else(|| AnalysisError::MissingSeasonalData {
            city: city.to_string(),
            season,
        })?;

    if !row.average.is_finite() || !row.std.is_finite() {
        return Err(AnalysisError::UndefinedBaseline {
            city: city.to_string(),
            season,
            count: row.count,
        });
    }

    let (lower, upper) = row.band();

    Ok(Judgement {
        season,
        lower,
        upper,
        verdict: classify(temperature, lower, upper),
    })
}
