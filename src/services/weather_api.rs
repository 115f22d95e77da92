//! Trait and types for querying current weather for a city.

use anyhow::Result;
use temp_anomaly_monitor::reading::LiveObservation;

/// Result of a weather query that reached the provider.
///
/// Provider-side refusals are values, not errors, so the caller can report
/// them as-is. Transport and decoding failures surface as `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherOutcome {
    Success(LiveObservation),
    /// The provider rejected the API key.
    AuthError,
    /// The provider does not know the city.
    NotFound,
}

/// Abstraction over a current-weather provider (e.g., OpenWeatherMap).
#[async_trait::async_trait]
pub trait WeatherClient: Send + Sync {
    /// Returns current conditions for `city`.
    async fn query(&self, city: &str) -> Result<WeatherOutcome>;
}
