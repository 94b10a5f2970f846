//! Parsers for NOAA CO-OPS JSON payloads.
//!
//! Two endpoints matter to this pipeline: the metadata API (station list)
//! and the data API (water-level series). Both render awkward JSON: numeric
//! values arrive as strings, and "no data" is an error object with a 200
//! status. The quirks are normalized here, at the boundary.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::stations::Station;
use crate::timeseries::WaterLevelObs;

/// Timestamp layout used by the data API when `time_zone=gmt` is requested.
const COOPS_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

// ---------------------------------------------------------------------------
// Station metadata (mdapi stations.json)
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct StationsResponse {
    #[serde(default)]
    stations: Vec<RawStation>,
}

#[derive(Deserialize)]
struct RawStation {
    id: Option<String>,
    name: Option<String>,
    #[serde(alias = "latitude")]
    lat: Option<f64>,
    #[serde(alias = "lon", alias = "longitude")]
    lng: Option<f64>,
    state: Option<String>,
}

/// Parses the metadata API response into [`Station`] records.
///
/// Rows missing an ID, name, or either coordinate are dropped. When
/// `state_filter` is given, only stations reporting exactly that state are
/// kept (stations without a state field are excluded).
pub fn parse_station_metadata(json: &str, state_filter: Option<&str>) -> Result<Vec<Station>> {
    let response: StationsResponse =
        serde_json::from_str(json).context("Malformed station metadata response")?;

    let stations = response
        .stations
        .into_iter()
        .filter(|raw| match (state_filter, raw.state.as_deref()) {
            (Some(want), Some(got)) => want == got,
            (Some(_), None) => false,
            (None, _) => true,
        })
        .filter_map(|raw| {
            let lat = raw.lat.filter(|v| v.is_finite())?;
            let lon = raw.lng.filter(|v| v.is_finite())?;
            Some(Station {
                station_id: raw.id?,
                station_name: raw.name?,
                lat,
                lon,
            })
        })
        .collect();

    Ok(stations)
}

// ---------------------------------------------------------------------------
// Water levels (data API datagetter)
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct WaterLevelResponse {
    error: Option<ApiError>,
    data: Option<Vec<RawObservation>>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Deserialize)]
struct RawObservation {
    /// Timestamp, e.g. `"2025-06-01 00:00"`.
    t: String,
    /// Water level in the requested units, as a string. Blank when the
    /// sensor had no reading.
    #[serde(default)]
    v: String,
}

/// Parses a data API response into observations.
///
/// An API error body (the endpoint's way of saying "no data for this
/// station/datum/window") and a missing `data` array both yield an empty
/// series; absence of data is an expected condition, never an error here.
/// Rows with unparseable timestamps are dropped; blank or non-numeric values
/// become `None` so the trend estimator can count what it discards.
///
/// # Errors
/// Only structurally malformed JSON fails.
pub fn parse_water_levels(json: &str) -> Result<Vec<WaterLevelObs>> {
    let response: WaterLevelResponse =
        serde_json::from_str(json).context("Malformed water-level response")?;

    if let Some(error) = response.error {
        tracing::debug!(message = %error.message, "Data API reported no data");
        return Ok(Vec::new());
    }

    let Some(data) = response.data else {
        return Ok(Vec::new());
    };

    let observations = data
        .into_iter()
        .filter_map(|raw| {
            let naive = NaiveDateTime::parse_from_str(&raw.t, COOPS_TIME_FORMAT).ok()?;
            let value = raw.v.trim().parse::<f64>().ok().filter(|v| v.is_finite());
            Some(WaterLevelObs::new(naive.and_utc(), value))
        })
        .collect();

    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parse_station_metadata_filters_state() {
        let json = r#"{
            "count": 3,
            "stations": [
                {"id": "9410170", "name": "San Diego", "lat": 32.7142, "lng": -117.1736, "state": "CA"},
                {"id": "9447130", "name": "Seattle", "lat": 47.6026, "lng": -122.3393, "state": "WA"},
                {"id": "9414290", "name": "San Francisco", "lat": 37.8063, "lng": -122.4659, "state": "CA"}
            ]
        }"#;

        let stations = parse_station_metadata(json, Some("CA")).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].station_id, "9410170");
        assert_eq!(stations[1].station_name, "San Francisco");
    }

    #[test]
    fn test_parse_station_metadata_drops_incomplete_rows() {
        let json = r#"{
            "stations": [
                {"id": "9410170", "name": "San Diego", "lat": 32.7142, "lng": -117.1736, "state": "CA"},
                {"id": "1111111", "name": "No Coordinates", "state": "CA"},
                {"name": "No ID", "lat": 33.0, "lng": -118.0, "state": "CA"}
            ]
        }"#;

        let stations = parse_station_metadata(json, Some("CA")).unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].station_id, "9410170");
    }

    #[test]
    fn test_parse_station_metadata_no_filter_keeps_all_states() {
        let json = r#"{
            "stations": [
                {"id": "9410170", "name": "San Diego", "lat": 32.7, "lng": -117.2, "state": "CA"},
                {"id": "9447130", "name": "Seattle", "lat": 47.6, "lng": -122.3, "state": "WA"}
            ]
        }"#;

        let stations = parse_station_metadata(json, None).unwrap();
        assert_eq!(stations.len(), 2);
    }

    #[test]
    fn test_parse_water_levels_values_and_blanks() {
        let json = r#"{
            "metadata": {"id": "9414290", "name": "San Francisco", "lat": "37.8063", "lon": "-122.4659"},
            "data": [
                {"t": "2025-06-01 00:00", "v": "1.012", "s": "0.003", "f": "0,0,0,0", "q": "p"},
                {"t": "2025-06-01 00:06", "v": "", "s": "", "f": "0,0,0,1", "q": "p"},
                {"t": "2025-06-01 00:12", "v": "1.020", "s": "0.004", "f": "0,0,0,0", "q": "p"}
            ]
        }"#;

        let obs = parse_water_levels(json).unwrap();
        assert_eq!(obs.len(), 3);
        assert_eq!(
            obs[0].datetime,
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(obs[0].water_level_m, Some(1.012));
        assert_eq!(obs[1].water_level_m, None);
        assert_eq!(obs[2].water_level_m, Some(1.020));
    }

    #[test]
    fn test_parse_water_levels_error_body_is_empty_series() {
        let json = r#"{"error": {"message": "No data was found. This product may not be offered at this station at the requested time."}}"#;

        let obs = parse_water_levels(json).unwrap();
        assert!(obs.is_empty());
    }

    #[test]
    fn test_parse_water_levels_drops_bad_timestamps() {
        let json = r#"{
            "data": [
                {"t": "not a time", "v": "1.0"},
                {"t": "2025-06-01 00:06", "v": "1.1"}
            ]
        }"#;

        let obs = parse_water_levels(json).unwrap();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].water_level_m, Some(1.1));
    }

    #[test]
    fn test_parse_water_levels_malformed_json_is_an_error() {
        assert!(parse_water_levels("{not json").is_err());
    }
}
