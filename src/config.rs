//! Pipeline configuration.
//!
//! All directory layout and fetch policy lives here and is passed into the
//! components explicitly. Nothing else in the crate hardcodes a path, so the
//! whole pipeline can be pointed at a temp directory in tests.

use std::path::{Path, PathBuf};

/// Default length of the water-level history window, in days.
pub const DEFAULT_DAYS_BACK: u32 = 30;

/// Default number of station fetches allowed in flight at once.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Default pause after each station fetch, in milliseconds. CO-OPS has no
/// published rate limit but throttles aggressive clients.
pub const DEFAULT_FETCH_DELAY_MS: u64 = 200;

/// Default two-letter state filter for station metadata.
pub const DEFAULT_STATE: &str = "CA";

/// Resolved settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root for raw and processed data (`<data_dir>/raw`, `<data_dir>/processed`).
    pub data_dir: PathBuf,
    /// Directory for charts and the map.
    pub results_dir: PathBuf,
    /// Path to the housing-value CSV.
    pub housing_csv: PathBuf,
    /// How many days of water-level history to request per station.
    pub days_back: u32,
    /// Two-letter state filter applied to station metadata.
    pub state: String,
    /// Concurrent station fetches.
    pub fetch_concurrency: usize,
    /// Pause after each station fetch, milliseconds.
    pub fetch_delay_ms: u64,
}

impl PipelineConfig {
    pub fn new(data_dir: impl Into<PathBuf>, results_dir: impl Into<PathBuf>, housing_csv: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            results_dir: results_dir.into(),
            housing_csv: housing_csv.into(),
            days_back: DEFAULT_DAYS_BACK,
            state: DEFAULT_STATE.to_string(),
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            fetch_delay_ms: DEFAULT_FETCH_DELAY_MS,
        }
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.data_dir.join("processed")
    }

    /// Per-station water-level CSV cache.
    pub fn timeseries_cache_dir(&self) -> PathBuf {
        self.raw_dir().join("timeseries_cache")
    }

    /// Station metadata artifact.
    pub fn stations_csv(&self) -> PathBuf {
        self.raw_dir().join("stations.csv")
    }

    /// Trend table artifact.
    pub fn trend_csv(&self) -> PathBuf {
        self.processed_dir().join("combined_water_levels.csv")
    }

    /// Final risk table artifact.
    pub fn risk_csv(&self) -> PathBuf {
        self.processed_dir().join("combined_risk_data.csv")
    }
}

/// Creates a directory and its parents if missing.
pub fn ensure_dir(path: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(path)
        .map_err(|e| anyhow::anyhow!("Failed to create directory {}: {}", path.display(), e))
}
