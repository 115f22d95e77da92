//! Rolling per-city statistics and ±2σ anomaly flags.

use serde::Serialize;
use std::collections::{HashMap, VecDeque};

use crate::error::{AnalysisError, Result};
use crate::reading::Reading;

/// Trailing window length in days, current point included.
pub const WINDOW: usize = 30;

/// A reading plus its rolling baseline. All derived fields are `None` until
/// the city has `WINDOW` readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedReading {
    #[serde(flatten)]
    pub reading: Reading,
    pub mean_temp: Option<f64>,
    pub std_temp: Option<f64>,
    pub lower_limit: Option<f64>,
    pub upper_limit: Option<f64>,
    pub is_anomaly: bool,
}

/// Sliding sum and sum of squares over the last `capacity` values.
///
/// Sums are taken over values shifted by an anchor so large offsets do not
/// swamp the squares. Every `capacity` evictions the anchor moves to the
/// oldest value and both sums are rebuilt from the deque, which bounds the
/// rounding carried over from values that already left the window. A run of
/// `capacity` equal values is reported as exactly that value with zero
/// deviation.
struct RollingWindow {
    capacity: usize,
    values: VecDeque<f64>,
    shift: f64,
    sum: f64,
    sum_sq: f64,
    evictions: usize,
    run: usize,
}

impl RollingWindow {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity + 1),
            shift: 0.0,
            sum: 0.0,
            sum_sq: 0.0,
            evictions: 0,
            run: 0,
        }
    }

    fn push(&mut self, value: f64) {
        match self.values.back() {
            Some(&last) if last == value => self.run += 1,
            Some(_) => self.run = 1,
            None => {
                self.shift = value;
                self.run = 1;
            }
        }

        let d = value - self.shift;
        self.values.push_back(value);
        self.sum += d;
        self.sum_sq += d * d;

        if self.values.len() > self.capacity {
            if let Some(old) = self.values.pop_front() {
                let d = old - self.shift;
                self.sum -= d;
                self.sum_sq -= d * d;
                self.evictions += 1;
            }
            if self.evictions >= self.capacity {
                self.resync();
            }
        }
    }

    fn resync(&mut self) {
        self.shift = self.values.front().copied().unwrap_or(0.0);
        self.sum = 0.0;
        self.sum_sq = 0.0;
        for v in &self.values {
            let d = v - self.shift;
            self.sum += d;
            self.sum_sq += d * d;
        }
        self.evictions = 0;
    }

    fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// Mean and sample standard deviation, once the window is full.
    fn mean_std(&self) -> Option<(f64, f64)> {
        if !self.is_full() || self.capacity < 2 {
            return None;
        }
        if self.run >= self.capacity {
            return self.values.back().map(|&v| (v, 0.0));
        }
        let n = self.capacity as f64;
        let shifted_mean = self.sum / n;
        let variance = ((self.sum_sq - self.sum * shifted_mean) / (n - 1.0)).max(0.0);
        Some((shifted_mean + self.shift, variance.sqrt()))
    }
}

/// Computes rolling statistics for every reading, resetting the window at
/// each city.
///
/// Cities may be interleaved; output keeps the input order. Each city's own
/// subsequence must be strictly increasing by date.
///
/// # Errors
///
/// [`AnalysisError::InvalidInput`] for an empty city, a non-finite
/// temperature, or a city whose dates are not strictly increasing.
pub fn enrich(readings: &[Reading]) -> Result<Vec<EnrichedReading>> {
    let mut partitions: Vec<(&str, Vec<usize>)> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();

    for (i, r) in readings.iter().enumerate() {
        validate(r)?;
        let idx = *slot.entry(r.city.as_str()).or_insert_with(|| {
            partitions.push((r.city.as_str(), Vec::new()));
            partitions.len() - 1
        });
        partitions[idx].1.push(i);
    }

    let mut out: Vec<Option<EnrichedReading>> = vec![None; readings.len()];

    for (city, indices) in &partitions {
        let mut window = RollingWindow::new(WINDOW);
        let mut previous = None;

        for &i in indices {
            let r = &readings[i];
            if let Some(prev) = previous {
                if r.timestamp <= prev {
                    return Err(AnalysisError::InvalidInput(format!(
                        "readings for {city} are not chronological at {} (after {prev})",
                        r.timestamp
                    )));
                }
            }
            previous = Some(r.timestamp);

            window.push(r.temperature);
            out[i] = Some(enriched(r, window.mean_std()));
        }
    }

    Ok(out.into_iter().flatten().collect())
}

/// Convenience wrapper: [`enrich`] restricted to one city.
pub fn enrich_city(readings: &[Reading], city: &str) -> Result<Vec<EnrichedReading>> {
    let subset: Vec<Reading> = readings.iter().filter(|r| r.city == city).cloned().collect();
    enrich(&subset)
}

fn validate(r: &Reading) -> Result<()> {
    if r.city.is_empty() {
        return Err(AnalysisError::InvalidInput(format!(
            "reading on {} has no city",
            r.timestamp
        )));
    }
    if !r.temperature.is_finite() {
        return Err(AnalysisError::InvalidInput(format!(
            "non-finite temperature for {} on {}",
            r.city, r.timestamp
        )));
    }
    Ok(())
}

fn enriched(r: &Reading, baseline: Option<(f64, f64)>) -> EnrichedReading {
    match baseline {
        Some((mean, std)) => {
            let lower = mean - 2.0 * std;
            let upper = mean + 2.0 * std;
            EnrichedReading {
                reading: r.clone(),
                mean_temp: Some(mean),
                std_temp: Some(std),
                lower_limit: Some(lower),
                upper_limit: Some(upper),
                is_anomaly: r.temperature < lower || r.temperature > upper,
            }
        }
        None => EnrichedReading {
            reading: r.clone(),
            mean_temp: None,
            std_temp: None,
            lower_limit: None,
            upper_limit: None,
            is_anomaly: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn series(city: &str, temps: &[f64]) -> Vec<Reading> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        temps
            .iter()
            .enumerate()
            .map(|(i, t)| Reading::new(city, start + Duration::days(i as i64), *t))
            .collect()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_undefined_before_full_window() {
        let temps: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let out = enrich(&series("A", &temps)).unwrap();

        for (i, e) in out.iter().enumerate() {
            if i < WINDOW - 1 {
                assert!(e.mean_temp.is_none() && e.std_temp.is_none());
                assert!(e.lower_limit.is_none() && e.upper_limit.is_none());
                assert!(!e.is_anomaly);
            } else {
                assert!(e.mean_temp.is_some() && e.std_temp.is_some());
            }
        }
    }

    #[test]
    fn test_constant_series() {
        let out = enrich(&series("A", &[7.25; 45])).unwrap();
        for e in out.iter().skip(WINDOW - 1) {
            assert_eq!(e.mean_temp, Some(7.25));
            assert_eq!(e.std_temp, Some(0.0));
            assert!(!e.is_anomaly);
        }
    }

    #[test]
    fn test_spike_after_flat_month() {
        let mut temps = vec![10.0; 30];
        temps.push(100.0);
        let out = enrich(&series("A", &temps)).unwrap();

        let last_flat = &out[29];
        assert_eq!(last_flat.mean_temp, Some(10.0));
        assert_eq!(last_flat.std_temp, Some(0.0));
        assert!(!last_flat.is_anomaly);

        let spike = &out[30];
        assert_close(spike.mean_temp.unwrap(), 13.0);
        assert_close(spike.std_temp.unwrap(), 270f64.sqrt());
        assert!(spike.is_anomaly);
    }

    #[test]
    fn test_window_matches_direct_computation() {
        let temps: Vec<f64> = (0..60).map(|i| ((i * 37) % 23) as f64 * 0.7 - 4.0).collect();
        let out = enrich(&series("A", &temps)).unwrap();

        for i in WINDOW - 1..temps.len() {
            let w = &temps[i + 1 - WINDOW..=i];
            let mean = w.iter().sum::<f64>() / WINDOW as f64;
            let var = w.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / (WINDOW as f64 - 1.0);
            assert_close(out[i].mean_temp.unwrap(), mean);
            assert_close(out[i].std_temp.unwrap(), var.sqrt());
            assert_close(out[i].lower_limit.unwrap(), mean - 2.0 * var.sqrt());
            assert_close(out[i].upper_limit.unwrap(), mean + 2.0 * var.sqrt());
        }
    }

    fn noisy(i: usize) -> f64 {
        ((i * 7919) % 97) as f64 * 0.37 - 11.3 + (i as f64 / 10.0).sin() * 13.7
    }

    #[test]
    fn test_flat_tail_after_noise_is_not_anomalous() {
        let mut temps: Vec<f64> = (0..400).map(noisy).collect();
        temps.extend([3.3; 60]);
        let out = enrich(&series("A", &temps)).unwrap();

        assert!(out[400..].iter().all(|e| !e.is_anomaly));
        for e in &out[400 + WINDOW - 1..] {
            assert_eq!(e.mean_temp, Some(3.3));
            assert_eq!(e.std_temp, Some(0.0));
            assert_eq!(e.lower_limit, Some(3.3));
            assert_eq!(e.upper_limit, Some(3.3));
        }
    }

    #[test]
    fn test_long_series_matches_two_pass_reference() {
        // spikes every 211 days so large values keep entering and leaving
        let temps: Vec<f64> = (0..5000)
            .map(|i| noisy(i) + if i % 211 == 0 { 80.0 } else { 0.0 })
            .collect();
        let out = enrich(&series("A", &temps)).unwrap();

        let mut flagged = 0;
        for i in WINDOW - 1..temps.len() {
            let w = &temps[i + 1 - WINDOW..=i];
            let mean = w.iter().sum::<f64>() / WINDOW as f64;
            let std = (w.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / (WINDOW as f64 - 1.0))
                .sqrt();
            let (lower, upper) = (mean - 2.0 * std, mean + 2.0 * std);

            let e = &out[i];
            assert!((e.mean_temp.unwrap() - mean).abs() < 1e-7, "mean at {i}");
            assert!((e.std_temp.unwrap() - std).abs() < 1e-7, "std at {i}");

            let t = temps[i];
            if (t - lower).abs() > 1e-6 && (t - upper).abs() > 1e-6 {
                assert_eq!(e.is_anomaly, t < lower || t > upper, "flag at {i}");
            }
            if e.is_anomaly {
                flagged += 1;
            }
        }
        assert!(flagged > 0);
    }

    #[test]
    fn test_cities_do_not_share_windows() {
        let a = series("A", &[1.0; 29]);
        let b = series("B", &[50.0; 29]);
        let mut all = a.clone();
        all.extend(b);
        let out = enrich(&all).unwrap();

        // 58 rows total, but neither city reaches a full window.
        assert!(out.iter().all(|e| e.mean_temp.is_none()));
        assert!(out.iter().zip(&all).all(|(e, r)| e.reading.city == r.city));
    }

    #[test]
    fn test_interleaved_cities_keep_input_order() {
        let a = series("A", &[1.0; 30]);
        let b = series("B", &[5.0; 30]);
        let all: Vec<Reading> = a.into_iter().zip(b).flat_map(|(x, y)| [x, y]).collect();
        let out = enrich(&all).unwrap();

        assert_eq!(out.len(), 60);
        assert_eq!(out[58].reading.city, "A");
        assert_eq!(out[58].mean_temp, Some(1.0));
        assert_eq!(out[59].reading.city, "B");
        assert_eq!(out[59].mean_temp, Some(5.0));
        assert!(out[57].mean_temp.is_none());
    }

    #[test]
    fn test_non_chronological_rejected() {
        let mut readings = series("A", &[1.0, 2.0, 3.0]);
        readings.swap(1, 2);
        let err = enrich(&readings).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn test_duplicate_date_rejected() {
        let mut readings = series("A", &[1.0, 2.0]);
        readings[1].timestamp = readings[0].timestamp;
        assert!(enrich(&readings).is_err());
    }

    #[test]
    fn test_nan_temperature_rejected() {
        let readings = series("A", &[1.0, f64::NAN]);
        assert!(matches!(
            enrich(&readings),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_enrich_city_filters() {
        let mut all = series("A", &[1.0; 3]);
        all.extend(series("B", &[2.0; 2]));
        let out = enrich_city(&all, "B").unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|e| e.reading.city == "B"));
    }

    #[test]
    fn test_empty_input() {
        assert!(enrich(&[]).unwrap().is_empty());
    }
}
