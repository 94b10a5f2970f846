//! Traits for tide-gauge data providers.

use anyhow::Result;
use async_trait::async_trait;

use coastal_risk_rater::stations::Station;
use coastal_risk_rater::timeseries::WaterLevelObs;

/// Produces the station metadata table.
#[async_trait]
pub trait StationSource {
    /// Lists water-level stations, optionally filtered to one two-letter
    /// state code.
    async fn list_stations(&self, state: Option<&str>) -> Result<Vec<Station>>;
}

/// Produces one station's water-level history.
#[async_trait]
pub trait WaterLevelSource {
    /// Fetches up to `days_back` days of observations for `station_id`.
    ///
    /// "No data available" is an empty vector, never an error; station
    /// outages and coverage gaps are normal.
    async fn fetch_series(&self, station_id: &str, days_back: u32) -> Result<Vec<WaterLevelObs>>;
}
