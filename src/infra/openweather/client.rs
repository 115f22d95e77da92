use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::services::weather_api::{WeatherClient, WeatherOutcome};
use temp_anomaly_monitor::fetch::auth::UrlParam;
use temp_anomaly_monitor::fetch::{BasicClient, HttpClient, fetch_json};
use temp_anomaly_monitor::reading::LiveObservation;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Connection settings for [`OpenWeatherClient`]. Passed explicitly, never
/// read from globals.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key: String,
    /// Language code used to pick the localized city name.
    pub lang: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl WeatherConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            lang: "ru".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, PartialEq)]
enum GeoLookup {
    Found {
        lat: f64,
        lon: f64,
        display_name: String,
    },
    Unauthorized,
    Unknown,
}

/// OpenWeatherMap client: geocodes the city, then fetches current weather
/// for its coordinates.
pub struct OpenWeatherClient<C> {
    http: UrlParam<C>,
    base_url: String,
    lang: String,
}

impl OpenWeatherClient<BasicClient> {
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let http = BasicClient::with_timeouts(config.connect_timeout, config.request_timeout)?;
        Ok(Self::with_http(http, config))
    }
}

impl<C: HttpClient> OpenWeatherClient<C> {
    pub fn with_http(http: C, config: WeatherConfig) -> Self {
        Self {
            http: UrlParam::new(http, "appid", &config.api_key),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            lang: config.lang,
        }
    }

    fn geo_url(&self, city: &str) -> Result<Url> {
        Ok(Url::parse_with_params(
            &format!("{}/geo/1.0/direct", self.base_url),
            &[("q", city), ("limit", "1")],
        )?)
    }

    fn weather_url(&self, lat: f64, lon: f64) -> Result<Url> {
        Ok(Url::parse_with_params(
            &format!("{}/data/2.5/weather", self.base_url),
            &[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", "metric".to_string()),
            ],
        )?)
    }
}

#[async_trait]
impl<C: HttpClient> WeatherClient for OpenWeatherClient<C> {
    #[tracing::instrument(skip(self))]
    async fn query(&self, city: &str) -> Result<WeatherOutcome> {
        let (status, body) = fetch_json(&self.http, self.geo_url(city)?.as_str())
            .await
            .context("geocoding request failed")?;
        debug!(%status, "Geocoding response received");

        let (lat, lon, display_name) = match interpret_geo(status, &body, city, &self.lang)? {
            GeoLookup::Found {
                lat,
                lon,
                display_name,
            } => (lat, lon, display_name),
            GeoLookup::Unauthorized => return Ok(WeatherOutcome::AuthError),
            GeoLookup::Unknown => return Ok(WeatherOutcome::NotFound),
        };

        let (status, body) = fetch_json(&self.http, self.weather_url(lat, lon)?.as_str())
            .await
            .context("current weather request failed")?;
        debug!(%status, lat, lon, "Weather response received");

        interpret_weather(status, &body, display_name)
    }
}

fn is_unauthorized(status: StatusCode, body: &Value) -> bool {
    if status == StatusCode::UNAUTHORIZED {
        return true;
    }
    match &body["cod"] {
        Value::Number(n) => n.as_i64() == Some(401),
        Value::String(s) => s == "401",
        _ => false,
    }
}

fn interpret_geo(status: StatusCode, body: &Value, city: &str, lang: &str) -> Result<GeoLookup> {
    if is_unauthorized(status, body) {
        return Ok(GeoLookup::Unauthorized);
    }
    if !status.is_success() {
        return Err(anyhow!("geocoding returned status {status}: {body}"));
    }

    let Some(first) = body.as_array().and_then(|a| a.first()) else {
        return Ok(GeoLookup::Unknown);
    };

    let lat = first["lat"]
        .as_f64()
        .ok_or_else(|| anyhow!("geocoding result has no lat"))?;
    let lon = first["lon"]
        .as_f64()
        .ok_or_else(|| anyhow!("geocoding result has no lon"))?;
    let display_name = first["local_names"][lang]
        .as_str()
        .unwrap_or(city)
        .to_string();

    Ok(GeoLookup::Found {
        lat,
        lon,
        display_name,
    })
}

/// Maps the current-weather response. The observation time is the sunrise
/// reported by the provider, shifted by the response's `timezone` (seconds
/// east of UTC) so its date is the city's local date.
fn interpret_weather(status: StatusCode, body: &Value, display_name: String) -> Result<WeatherOutcome> {
    if is_unauthorized(status, body) {
        return Ok(WeatherOutcome::AuthError);
    }
    if status == StatusCode::NOT_FOUND {
        return Ok(WeatherOutcome::NotFound);
    }
    if !status.is_success() {
        return Err(anyhow!("weather returned status {status}: {body}"));
    }

    let temperature = body["main"]["temp"]
        .as_f64()
        .ok_or_else(|| anyhow!("weather response has no main.temp"))?;
    let sunrise = body["sys"]["sunrise"]
        .as_i64()
        .ok_or_else(|| anyhow!("weather response has no sys.sunrise"))?;
    let timestamp = DateTime::<Utc>::from_timestamp(sunrise, 0)
        .ok_or_else(|| anyhow!("sunrise {sunrise} is out of range"))?;
    let shift = body["timezone"].as_i64().unwrap_or(0);
    let offset = i32::try_from(shift)
        .ok()
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| anyhow!("timezone offset {shift} is out of range"))?;
    let timestamp = timestamp.with_timezone(&offset);

    Ok(WeatherOutcome::Success(LiveObservation {
        city_display_name: display_name,
        timestamp,
        temperature,
    }))
}
