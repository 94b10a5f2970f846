//! NOAA CO-OPS API client.
//!
//! Two endpoints: the metadata API for the station list and the data API
//! ("datagetter") for water-level series. The data API frequently has no
//! series for a station under a given vertical datum, so the client walks a
//! datum preference list and keeps the first series with enough clean
//! points to be fittable.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::{debug, warn};

use coastal_risk_rater::analyzers::trend::MIN_TREND_POINTS;
use coastal_risk_rater::fetch::{BasicClient, HttpClient, fetch_text};
use coastal_risk_rater::parser::{parse_station_metadata, parse_water_levels};
use coastal_risk_rater::stations::Station;
use coastal_risk_rater::timeseries::WaterLevelObs;

use crate::services::tide_api::{StationSource, WaterLevelSource};

const METADATA_URL: &str = "https://api.tidesandcurrents.noaa.gov/mdapi/prod/webapi/stations.json";
const DATA_URL: &str = "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter";

/// Vertical datums to request, in preference order. Not every station
/// publishes water levels against every datum.
const DATUMS_TO_TRY: &[&str] = &["MSL", "MLLW", "NAVD"];

pub struct CoOpsClient<C = BasicClient> {
    client: C,
    metadata_url: String,
    data_url: String,
}

impl CoOpsClient<BasicClient> {
    pub fn new() -> Self {
        Self::with_client(BasicClient::new())
    }
}

impl Default for CoOpsClient<BasicClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: HttpClient> CoOpsClient<C> {
    pub fn with_client(client: C) -> Self {
        Self {
            client,
            metadata_url: METADATA_URL.to_string(),
            data_url: DATA_URL.to_string(),
        }
    }
}

#[async_trait]
impl<C: HttpClient> StationSource for CoOpsClient<C> {
    async fn list_stations(&self, state: Option<&str>) -> Result<Vec<Station>> {
        let body = fetch_text(
            &self.client,
            &self.metadata_url,
            &[("type", "waterlevels"), ("expand", "details,products,latlon")],
        )
        .await?;

        parse_station_metadata(&body, state)
    }
}

#[async_trait]
impl<C: HttpClient> WaterLevelSource for CoOpsClient<C> {
    async fn fetch_series(&self, station_id: &str, days_back: u32) -> Result<Vec<WaterLevelObs>> {
        let end = Utc::now();
        let start = end - Duration::days(days_back as i64);
        let begin_date = start.format("%Y%m%d").to_string();
        let end_date = end.format("%Y%m%d").to_string();

        for &datum in DATUMS_TO_TRY {
            let params = [
                ("product", "water_level"),
                ("application", "coastal_risk_rater"),
                ("station", station_id),
                ("begin_date", begin_date.as_str()),
                ("end_date", end_date.as_str()),
                ("datum", datum),
                ("time_zone", "gmt"),
                ("units", "metric"),
                ("format", "json"),
            ];

            let body = match fetch_text(&self.client, &self.data_url, &params).await {
                Ok(body) => body,
                Err(e) => {
                    warn!(station_id, datum, error = %e, "Water-level request failed");
                    continue;
                }
            };

            let series = match parse_water_levels(&body) {
                Ok(series) => series,
                Err(e) => {
                    warn!(station_id, datum, error = %e, "Unparseable water-level response");
                    continue;
                }
            };

            let clean = clean_point_count(&series);
            if clean >= MIN_TREND_POINTS {
                debug!(station_id, datum, points = series.len(), clean, "Series accepted");
                return Ok(series);
            }

            debug!(station_id, datum, clean, "Too few clean points under this datum");
        }

        // All datums exhausted: an expected no-data outcome, not an error.
        Ok(Vec::new())
    }
}

/// Number of observations with a usable (present, finite) water level.
/// A datum is only accepted when this reaches the trend estimator's
/// minimum, otherwise the next datum in the preference list is tried.
fn clean_point_count(series: &[WaterLevelObs]) -> usize {
    series
        .iter()
        .filter(|obs| obs.water_level_m.is_some_and(f64::is_finite))
        .count()
}
