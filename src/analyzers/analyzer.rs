use tracing::{debug, info};

use crate::analyzers::aggregate::seasonal_stats_for_city;
use crate::analyzers::describe::describe;
use crate::analyzers::judge::judge;
use crate::analyzers::types::{CityReport, LiveVerdict};
use crate::error::{AnalysisError, Result};
use crate::reading::{LiveObservation, Reading};
use crate::stats::enrich_city;

/// Runs the rolling statistics, seasonal aggregation and summary for one
/// city of a dataset.
///
/// # Errors
///
/// [`AnalysisError::InvalidInput`] if the city has no readings or its
/// readings are malformed.
pub fn analyze_city(readings: &[Reading], city: &str) -> Result<CityReport> {
    let enriched = enrich_city(readings, city)?;
    if enriched.is_empty() {
        return Err(AnalysisError::InvalidInput(format!(
            "no readings for city {city}"
        )));
    }

    let temps: Vec<f64> = enriched.iter().map(|e| e.reading.temperature).collect();
    let seasonal = seasonal_stats_for_city(readings, city);
    let anomalies = enriched.iter().filter(|e| e.is_anomaly).count();

    debug!(city, rows = enriched.len(), groups = seasonal.len(), "City analyzed");
    info!(city, anomalies, "Rolling anomalies detected");

    Ok(CityReport {
        city: city.to_string(),
        summary: describe(&temps),
        seasonal,
        enriched,
        anomalies,
    })
}

/// Judges a live observation against a report's seasonal table.
pub fn judge_live(report: &CityReport, observation: &LiveObservation) -> Result<LiveVerdict> {
    let judgement = judge(
        &report.city,
        observation.temperature,
        observation.timestamp,
        &report.seasonal,
    )?;

    Ok(LiveVerdict {
        city: report.city.clone(),
        city_display_name: observation.city_display_name.clone(),
        timestamp: observation.timestamp,
        temperature: observation.temperature,
        judgement,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::Verdict;
    use crate::season::Season;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    fn winter_history() -> Vec<Reading> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let mut readings: Vec<Reading> = [0.0, 2.0, 4.0]
            .iter()
            .enumerate()
            .map(|(i, t)| Reading::new("Oslo", start + Duration::days(i as i64), *t))
            .collect();
        readings.push(Reading::new("Lima", start, 25.0));
        readings
    }

    fn observation(temperature: f64) -> LiveObservation {
        LiveObservation {
            city_display_name: "Осло".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 2, 3, 7, 0, 0).unwrap().fixed_offset(),
            temperature,
        }
    }

    #[test]
    fn test_analyze_city_report() {
        let report = analyze_city(&winter_history(), "Oslo").unwrap();
        assert_eq!(report.enriched.len(), 3);
        assert_eq!(report.anomalies, 0);
        assert_eq!(report.seasonal.len(), 1);
        assert_eq!(report.seasonal[0].average, 2.0);
        assert_eq!(report.summary.as_ref().unwrap().count, 3);
    }

    #[test]
    fn test_analyze_unknown_city() {
        let err = analyze_city(&winter_history(), "Paris").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_judge_live_boundary() {
        let report = analyze_city(&winter_history(), "Oslo").unwrap();
        let verdict = judge_live(&report, &observation(6.0)).unwrap();
        assert_eq!(verdict.city_display_name, "Осло");
        assert_eq!(verdict.judgement.season, Season::Winter);
        assert_eq!(verdict.judgement.verdict, Verdict::WithinHistoricalRange);
    }

    #[test]
    fn test_judge_live_missing_season() {
        let report = analyze_city(&winter_history(), "Oslo").unwrap();
        let mut obs = observation(6.0);
        obs.timestamp = Utc.with_ymd_and_hms(2025, 9, 3, 7, 0, 0).unwrap().fixed_offset();
        assert!(matches!(
            judge_live(&report, &obs),
            Err(AnalysisError::MissingSeasonalData { .. })
        ));
    }
}
