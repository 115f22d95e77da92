//! CLI entry point for the temperature anomaly monitor.
//!
//! Provides subcommands for analyzing a city's history, printing its seasonal
//! table, and checking the current temperature against that history.

mod infra;
mod services;

use crate::infra::openweather::{OpenWeatherClient, WeatherConfig};
use crate::services::weather_api::{WeatherClient, WeatherOutcome};
use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use temp_anomaly_monitor::analyzers::aggregate::{seasonal_stats, seasonal_stats_for_city};
use temp_anomaly_monitor::analyzers::analyzer::{analyze_city, judge_live};
use temp_anomaly_monitor::analyzers::types::{LiveVerdict, SeasonalStats};
use temp_anomaly_monitor::{
    output::{append_records, print_json, print_pretty},
    parser::load_readings,
    reading::{Reading, cities},
};
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "temp_anomaly_monitor")]
#[command(about = "Detect anomalous city temperatures against historical data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute rolling statistics and anomalies for one city
    Analyze {
        /// Historical CSV (city,timestamp,temperature,season)
        #[arg(value_name = "CSV")]
        data: String,

        /// City to analyze
        #[arg(short, long)]
        city: String,

        /// CSV file to append the enriched series to
        #[arg(short, long)]
        output: Option<String>,

        /// Log the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print seasonal statistics, for one city or all of them
    Seasons {
        #[arg(value_name = "CSV")]
        data: String,

        #[arg(short, long)]
        city: Option<String>,
    },
    /// Fetch the current temperature and judge it against seasonal history
    Check {
        #[arg(value_name = "CSV")]
        data: String,

        #[arg(short, long)]
        city: String,

        /// OpenWeatherMap API key
        #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Language for the localized city name
        #[arg(long, default_value = "ru")]
        lang: String,

        /// Override the provider base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
    /// List the cities present in a dataset
    ListCities {
        #[arg(value_name = "CSV")]
        data: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/temp_anomaly_monitor.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("temp_anomaly_monitor.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            data,
            city,
            output,
            json,
        } => {
            let readings = load_readings(&data)?;
            let report = analyze_city(&readings, &city)?;

            if let Some(summary) = &report.summary {
                info!(
                    city = %report.city,
                    count = summary.count,
                    mean = summary.mean,
                    std = summary.std,
                    min = summary.min,
                    median = summary.median,
                    max = summary.max,
                    "Historical summary"
                );
            }
            log_seasonal(&report.seasonal);

            for e in report.enriched.iter().filter(|e| e.is_anomaly) {
                info!(
                    date = %e.reading.timestamp,
                    temperature = e.reading.temperature,
                    lower = e.lower_limit,
                    upper = e.upper_limit,
                    "Anomalous reading"
                );
            }
            info!(anomalies = report.anomalies, rows = report.enriched.len(), "Analysis done");

            if let Some(path) = output {
                append_records(&path, &report.enriched)?;
                info!(path = %path, "Enriched series written");
            }
            if json {
                print_json(&report)?;
            } else {
                print_pretty(&report.seasonal);
            }
        }
        Commands::Seasons { data, city } => {
            let readings = load_readings(&data)?;
            let table = match &city {
                Some(c) => seasonal_stats_for_city(&readings, c),
                None => seasonal_stats(&readings),
            };
            if table.is_empty() {
                warn!(city = ?city, "No readings matched");
            }
            log_seasonal(&table);
        }
        Commands::Check {
            data,
            city,
            api_key,
            lang,
            base_url,
            timeout,
        } => {
            let mut config = WeatherConfig::new(api_key);
            config.lang = lang;
            config.request_timeout = Duration::from_secs(timeout);
            if let Some(url) = base_url {
                config.base_url = url;
            }

            let readings = load_readings(&data)?;
            let client = OpenWeatherClient::new(config)?;

            let verdict = check_city(&client, &readings, &city).await?;
            print_json(&verdict)?;
        }
        Commands::ListCities { data } => {
            let readings = load_readings(&data)?;
            for city in cities(&readings) {
                let count = readings.iter().filter(|r| r.city == city).count();
                info!(city, readings = count, "City");
            }
        }
    }

    Ok(())
}

fn log_seasonal(table: &[SeasonalStats]) {
    for row in table {
        info!(
            city = %row.city,
            season = %row.season,
            count = row.count,
            average = row.average,
            std = row.std,
            min = row.min,
            max = row.max,
            "Seasonal statistics"
        );
    }
}

/// Queries the weather provider for `city` and judges the live temperature
/// against the city's seasonal history.
///
/// Provider refusals are reported and turned into errors without retrying.
#[tracing::instrument(skip(client, readings), fields(rows = readings.len()))]
async fn check_city<W: WeatherClient>(
    client: &W,
    readings: &[Reading],
    city: &str,
) -> Result<LiveVerdict> {
    let report = analyze_city(readings, city)?;

    let observation = match client.query(city).await? {
        WeatherOutcome::Success(obs) => obs,
        WeatherOutcome::AuthError => {
            error!("Weather provider rejected the API key");
            bail!("invalid API key");
        }
        WeatherOutcome::NotFound => {
            error!("Weather provider does not know this city");
            bail!("city {city} not found by weather provider");
        }
    };

    let verdict = judge_live(&report, &observation)?;
    let j = &verdict.judgement;
    if j.verdict.is_anomalous() {
        warn!(
            city = %verdict.city_display_name,
            time = %verdict.timestamp,
            temperature = verdict.temperature,
            season = %j.season,
            lower = j.lower,
            upper = j.upper,
            verdict = %j.verdict,
            "Live temperature is anomalous"
        );
    } else {
        info!(
            city = %verdict.city_display_name,
            time = %verdict.timestamp,
            temperature = verdict.temperature,
            season = %j.season,
            lower = j.lower,
            upper = j.upper,
            "Live temperature within historical range"
        );
    }

    Ok(verdict)
}
