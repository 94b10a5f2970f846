//! Water-level observations and the on-disk time-series cache.
//!
//! The fetch step writes one CSV per station into the cache directory; the
//! analyze step loads the whole directory back into memory keyed by station
//! ID. Cache files are named `<station_id>_water_level.csv`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// Suffix shared by all cache files.
const CACHE_SUFFIX: &str = "_water_level.csv";

/// One water-level sample at a station.
///
/// `water_level_m` is `None` when the source reported a blank or non-numeric
/// value; cleaning such points is the trend estimator's job, so the cache
/// keeps them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaterLevelObs {
    pub datetime: DateTime<Utc>,
    pub water_level_m: Option<f64>,
}

impl WaterLevelObs {
    pub fn new(datetime: DateTime<Utc>, water_level_m: Option<f64>) -> Self {
        Self {
            datetime,
            water_level_m,
        }
    }
}

/// Writes one station's series to `<dir>/<station_id>_water_level.csv`,
/// replacing any previous file.
pub fn save_series(dir: &Path, station_id: &str, series: &[WaterLevelObs]) -> Result<()> {
    let path = dir.join(format!("{station_id}{CACHE_SUFFIX}"));
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create cache file {}", path.display()))?;

    for obs in series {
        writer.serialize(obs)?;
    }
    writer.flush()?;

    Ok(())
}

/// Loads every cached series under `dir`, keyed by station ID.
///
/// Files not matching the cache naming scheme are ignored. A missing cache
/// directory is an error: analysis cannot proceed without a fetch step
/// having run first.
pub fn load_series_cache(dir: &Path) -> Result<HashMap<String, Vec<WaterLevelObs>>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Time-series cache directory {} is unreadable; run fetch first", dir.display()))?;

    let mut cache = HashMap::new();

    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        let Some(station_id) = name.strip_suffix(CACHE_SUFFIX) else {
            continue;
        };

        let file = File::open(entry.path())
            .with_context(|| format!("Failed to open cache file {}", entry.path().display()))?;
        let mut reader = csv::Reader::from_reader(file);

        let mut series = Vec::new();
        for result in reader.deserialize() {
            let obs: WaterLevelObs = result
                .with_context(|| format!("Malformed row in cache file {}", entry.path().display()))?;
            series.push(obs);
        }

        cache.insert(station_id.to_string(), series);
    }

    Ok(cache)
}
