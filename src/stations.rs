//! Tide station metadata.
//!
//! Defines the [`Station`] record used throughout the pipeline and a static
//! fallback list of California NOAA CO-OPS water-level stations. The fallback
//! keeps the pipeline runnable when the metadata API is down; station IDs and
//! coordinates come from the CO-OPS station catalog.

use serde::{Deserialize, Serialize};

/// A fixed tide/water-level monitoring point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    /// CO-OPS station ID. Kept as a string to preserve leading zeros.
    pub station_id: String,
    /// Official station name.
    pub station_name: String,
    /// WGS84 latitude, decimal degrees.
    pub lat: f64,
    /// WGS84 longitude, decimal degrees.
    pub lon: f64,
}

impl Station {
    pub fn new(station_id: &str, station_name: &str, lat: f64, lon: f64) -> Self {
        Self {
            station_id: station_id.to_string(),
            station_name: station_name.to_string(),
            lat,
            lon,
        }
    }
}

/// California CO-OPS water-level stations used when the metadata API is
/// unavailable, ordered south to north along the coast.
pub fn fallback_ca_stations() -> Vec<Station> {
    vec![
        Station::new("9410170", "San Diego", 32.7142, -117.1736),
        Station::new("9410230", "La Jolla", 32.8669, -117.2571),
        Station::new("9410660", "Los Angeles", 33.7197, -118.2722),
        Station::new("9410840", "Santa Monica", 34.0083, -118.5000),
        Station::new("9411340", "Santa Barbara", 34.4033, -119.6920),
        Station::new("9412110", "Port San Luis", 35.1683, -120.7540),
        Station::new("9413450", "Monterey", 36.6050, -121.8883),
        Station::new("9414290", "San Francisco", 37.8063, -122.4659),
        Station::new("9414523", "Redwood City", 37.5067, -122.2092),
        Station::new("9414750", "Alameda", 37.7717, -122.3000),
        Station::new("9414863", "Richmond", 37.9233, -122.4097),
        Station::new("9415020", "Point Reyes", 37.9967, -122.9750),
        Station::new("9416841", "Arena Cove", 38.9140, -123.7110),
        Station::new("9418767", "North Spit", 40.7667, -124.2167),
        Station::new("9419750", "Crescent City", 41.7456, -124.1839),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_station_ids_are_valid_coops_format() {
        // CO-OPS water-level station IDs are 7-digit numeric strings. A
        // malformed ID would be silently rejected by the data API.
        for station in fallback_ca_stations() {
            assert_eq!(
                station.station_id.len(),
                7,
                "station ID for '{}' should be 7 digits, got '{}'",
                station.station_name,
                station.station_id
            );
            assert!(
                station.station_id.chars().all(|c| c.is_ascii_digit()),
                "station ID for '{}' should be numeric, got '{}'",
                station.station_name,
                station.station_id
            );
        }
    }

    #[test]
    fn test_no_duplicate_fallback_ids() {
        let mut seen = std::collections::HashSet::new();
        for station in fallback_ca_stations() {
            assert!(
                seen.insert(station.station_id.clone()),
                "duplicate station ID '{}' in fallback list",
                station.station_id
            );
        }
    }

    #[test]
    fn test_fallback_coordinates_are_on_the_california_coast() {
        for station in fallback_ca_stations() {
            assert!(
                (32.0..=42.0).contains(&station.lat),
                "latitude {} for '{}' outside California",
                station.lat,
                station.station_name
            );
            assert!(
                (-125.0..=-117.0).contains(&station.lon),
                "longitude {} for '{}' outside California",
                station.lon,
                station.station_name
            );
        }
    }
}
