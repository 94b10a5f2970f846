//! CLI entry point for the coastal risk rater.
//!
//! Provides subcommands for fetching tide-gauge data, computing the risk
//! table, rendering visualizations, and running the whole pipeline in one
//! pass.

mod infra;
mod services;

use crate::infra::coops::CoOpsClient;
use crate::services::tide_api::{StationSource, WaterLevelSource};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use coastal_risk_rater::analyzers::risk::score_risk;
use coastal_risk_rater::analyzers::spatial::attach_nearest_housing;
use coastal_risk_rater::analyzers::table::build_trend_table;
use coastal_risk_rater::config::{self, PipelineConfig, ensure_dir};
use coastal_risk_rater::housing::load_housing_csv;
use coastal_risk_rater::{output, timeseries, viz};
use coastal_risk_rater::stations::fallback_ca_stations;
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use tracing::Instrument;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "coastal_risk_rater")]
#[command(about = "Estimates coastal flood-risk exposure from tide-gauge trends and housing values", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download station metadata and per-station water-level series into the raw data cache
    Fetch {
        /// Root directory for raw and processed data
        #[arg(short, long, default_value = "data")]
        data_dir: String,

        /// Days of water-level history to request per station
        #[arg(long, default_value_t = config::DEFAULT_DAYS_BACK)]
        days_back: u32,

        /// Two-letter state filter for station metadata
        #[arg(long, default_value = config::DEFAULT_STATE)]
        state: String,

        /// Maximum concurrent station fetches
        #[arg(short, long, default_value_t = config::DEFAULT_FETCH_CONCURRENCY)]
        concurrency: usize,

        /// Pause after each station fetch, in milliseconds
        #[arg(long, default_value_t = config::DEFAULT_FETCH_DELAY_MS)]
        delay_ms: u64,
    },
    /// Compute per-station trends, join housing data, and write the risk table
    Analyze {
        /// Root directory for raw and processed data
        #[arg(short, long, default_value = "data")]
        data_dir: String,

        /// CSV with latitude, longitude, median_house_value columns
        #[arg(long, default_value = "data/housing/california_housing.csv")]
        housing_csv: String,

        /// Days-back value recorded on each row for provenance
        #[arg(long, default_value_t = config::DEFAULT_DAYS_BACK)]
        days_back: u32,
    },
    /// Render charts and the interactive map from the risk table
    Visualize {
        /// Root directory for raw and processed data
        #[arg(short, long, default_value = "data")]
        data_dir: String,

        /// Directory for charts and the map
        #[arg(short, long, default_value = "results")]
        results_dir: String,
    },
    /// Run fetch, analyze, and visualize in one pass
    Run {
        #[arg(short, long, default_value = "data")]
        data_dir: String,

        #[arg(short, long, default_value = "results")]
        results_dir: String,

        #[arg(long, default_value = "data/housing/california_housing.csv")]
        housing_csv: String,

        #[arg(long, default_value_t = config::DEFAULT_DAYS_BACK)]
        days_back: u32,

        #[arg(long, default_value = config::DEFAULT_STATE)]
        state: String,

        #[arg(short, long, default_value_t = config::DEFAULT_FETCH_CONCURRENCY)]
        concurrency: usize,

        #[arg(long, default_value_t = config::DEFAULT_FETCH_DELAY_MS)]
        delay_ms: u64,
    },
    /// List water-level stations reported by the metadata API
    ListStations {
        /// Restrict to one two-letter state code
        #[arg(short, long)]
        state: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/coastal_risk_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("coastal_risk_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            data_dir,
            days_back,
            state,
            concurrency,
            delay_ms,
        } => {
            let config = build_config(&data_dir, "results", "", days_back, &state, concurrency, delay_ms);
            fetch_data(&config).await?;
        }
        Commands::Analyze {
            data_dir,
            housing_csv,
            days_back,
        } => {
            let config = build_config(&data_dir, "results", &housing_csv, days_back, config::DEFAULT_STATE, 1, 0);
            analyze_data(&config)?;
        }
        Commands::Visualize {
            data_dir,
            results_dir,
        } => {
            let config = build_config(&data_dir, &results_dir, "", config::DEFAULT_DAYS_BACK, config::DEFAULT_STATE, 1, 0);
            visualize_data(&config)?;
        }
        Commands::Run {
            data_dir,
            results_dir,
            housing_csv,
            days_back,
            state,
            concurrency,
            delay_ms,
        } => {
            let config = build_config(&data_dir, &results_dir, &housing_csv, days_back, &state, concurrency, delay_ms);
            fetch_data(&config).await?;
            analyze_data(&config)?;
            visualize_data(&config)?;
            info!("Pipeline complete");
        }
        Commands::ListStations { state } => {
            list_stations(state.as_deref()).await?;
        }
    }

    Ok(())
}

fn build_config(
    data_dir: &str,
    results_dir: &str,
    housing_csv: &str,
    days_back: u32,
    state: &str,
    concurrency: usize,
    delay_ms: u64,
) -> PipelineConfig {
    let mut config = PipelineConfig::new(data_dir, results_dir, housing_csv);
    config.days_back = days_back;
    config.state = state.to_string();
    config.fetch_concurrency = concurrency;
    config.fetch_delay_ms = delay_ms;
    config
}

/// Downloads station metadata and every station's water-level series into
/// the raw data cache.
#[tracing::instrument(skip(config), fields(days_back = config.days_back, state = %config.state))]
async fn fetch_data(config: &PipelineConfig) -> Result<()> {
    let client = CoOpsClient::new();

    let stations = match client.list_stations(Some(&config.state)).await {
        Ok(stations) if !stations.is_empty() => stations,
        Ok(_) => {
            warn!("Metadata API returned no stations");
            fallback_stations_for(&config.state)?
        }
        Err(e) => {
            warn!(error = %e, "Metadata API unavailable");
            fallback_stations_for(&config.state)?
        }
    };

    ensure_dir(&config.raw_dir())?;
    ensure_dir(&config.timeseries_cache_dir())?;
    output::write_stations(&config.stations_csv(), &stations)?;
    info!(stations = stations.len(), path = %config.stations_csv().display(), "Station metadata saved");

    let client = Arc::new(client);
    let semaphore = Arc::new(tokio::sync::Semaphore::new(config.fetch_concurrency));
    let mut tasks = vec![];

    for station in &stations {
        let sem = semaphore.clone();
        let client = client.clone();
        let station = station.clone();
        let cache_dir = config.timeseries_cache_dir();
        let days_back = config.days_back;
        let delay_ms = config.fetch_delay_ms;

        let station_span = tracing::info_span!(
            "fetch_station",
            station_id = %station.station_id,
            station_name = %station.station_name,
        );

        let task = tokio::spawn(
            async move {
                let _permit = sem.acquire().await.unwrap();

                match client.fetch_series(&station.station_id, days_back).await {
                    Ok(series) if series.is_empty() => {
                        info!("No usable water-level data");
                    }
                    Ok(series) => {
                        if let Err(e) = timeseries::save_series(&cache_dir, &station.station_id, &series) {
                            error!(error = %e, "Failed to cache series");
                        } else {
                            info!(points = series.len(), "Series cached");
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Water-level fetch failed");
                    }
                }

                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
            }
            .instrument(station_span),
        );

        tasks.push(task);
    }

    for task in tasks {
        let _ = task.await;
    }

    info!("Fetch complete");
    Ok(())
}

/// The fallback registry only covers California; for any other state an
/// unreachable metadata API is fatal.
fn fallback_stations_for(state: &str) -> Result<Vec<coastal_risk_rater::stations::Station>> {
    if state == config::DEFAULT_STATE {
        warn!("Falling back to the static California station list");
        Ok(fallback_ca_stations())
    } else {
        bail!("Metadata API unavailable and no fallback station list exists for state {state}")
    }
}

/// Builds the trend table from cached series, joins housing data, scores
/// risk, and writes both processed artifacts.
#[tracing::instrument(skip(config), fields(days_back = config.days_back))]
fn analyze_data(config: &PipelineConfig) -> Result<()> {
    let stations = output::read_stations(&config.stations_csv())
        .context("Station metadata missing; run the fetch step first")?;
    if stations.is_empty() {
        bail!("Station table {} is empty", config.stations_csv().display());
    }

    let series_by_station = timeseries::load_series_cache(&config.timeseries_cache_dir())?;
    info!(stations = stations.len(), cached_series = series_by_station.len(), "Inputs loaded");

    let trend_table = build_trend_table(&stations, &series_by_station, config.days_back);
    if trend_table.is_empty() {
        bail!(
            "No station produced a usable water-level trend; try a longer --days-back window or rerun fetch later"
        );
    }

    ensure_dir(&config.processed_dir())?;
    output::write_trend_table(&config.trend_csv(), &trend_table)?;

    let housing = load_housing_csv(&config.housing_csv)?;
    info!(observations = housing.len(), "Housing dataset loaded");

    let joined = attach_nearest_housing(trend_table, &housing)?;
    let risk_table = score_risk(joined)?;
    output::write_risk_table(&config.risk_csv(), &risk_table)?;

    info!(stations = risk_table.len(), path = %config.risk_csv().display(), "Risk table written");
    Ok(())
}

/// Renders the charts and the map from the persisted risk table.
#[tracing::instrument(skip(config))]
fn visualize_data(config: &PipelineConfig) -> Result<()> {
    let risk_table = output::read_risk_table(&config.risk_csv())
        .context("Risk table missing; run the analyze step first")?;
    if risk_table.is_empty() {
        bail!("Risk table {} is empty", config.risk_csv().display());
    }

    ensure_dir(&config.results_dir)?;
    viz::charts::write_charts(&config.results_dir, &risk_table)?;
    viz::map::write_map(&config.results_dir, &risk_table)?;

    info!(results_dir = %config.results_dir.display(), "Visualization complete");
    Ok(())
}

/// Fetches and logs the station list.
async fn list_stations(state: Option<&str>) -> Result<()> {
    let client = CoOpsClient::new();
    let stations = client.list_stations(state).await?;

    info!(total = stations.len(), "Station list fetched");

    for station in &stations {
        info!(
            station_id = %station.station_id,
            station_name = %station.station_name,
            lat = station.lat,
            lon = station.lon,
            "Station"
        );
    }

    if stations.is_empty() {
        warn!(state = state.unwrap_or("any"), "No stations matched");
    }

    Ok(())
}
