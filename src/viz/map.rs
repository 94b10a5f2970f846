//! Interactive risk map.
//!
//! Emits a self-contained Leaflet HTML page with one circle marker per
//! station, bounds fitted to the station extent, OpenStreetMap tiles.

use anyhow::{Result, bail};
use std::path::Path;
use tracing::info;

use crate::analyzers::types::RiskRecord;
use crate::viz::escape_xml;

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const OSM_TILES: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Renders the map page for the given risk table.
pub fn render_map(records: &[RiskRecord]) -> Result<String> {
    if records.is_empty() {
        bail!("Cannot render map: the risk table is empty");
    }

    let lat_min = records.iter().map(|r| r.lat).fold(f64::INFINITY, f64::min);
    let lat_max = records.iter().map(|r| r.lat).fold(f64::NEG_INFINITY, f64::max);
    let lon_min = records.iter().map(|r| r.lon).fold(f64::INFINITY, f64::min);
    let lon_max = records.iter().map(|r| r.lon).fold(f64::NEG_INFINITY, f64::max);
    let center_lat = (lat_min + lat_max) / 2.0;
    let center_lon = (lon_min + lon_max) / 2.0;

    let mut markers = String::new();
    for record in records {
        let popup = format!(
            "{}<br>Trend (m/yr): {:.6}<br>Risk score: {:.3}<br>Median house value: {:.3}",
            escape_xml(&record.station_name),
            record.trend_m_per_year,
            record.risk_score,
            record.median_house_value,
        );
        markers.push_str(&format!(
            "L.circleMarker([{lat}, {lon}], {{radius: 5, color: 'red', fill: true, fillOpacity: 0.6}})\n  .bindPopup({popup:?}).addTo(map);\n",
            lat = record.lat,
            lon = record.lon,
        ));
    }

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Coastal risk map</title>
<link rel="stylesheet" href="{LEAFLET_CSS}">
<script src="{LEAFLET_JS}"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map('map').setView([{center_lat}, {center_lon}], 6);
L.tileLayer('{OSM_TILES}', {{attribution: '&copy; OpenStreetMap contributors'}}).addTo(map);
map.fitBounds([[{lat_min}, {lon_min}], [{lat_max}, {lon_max}]]);
{markers}</script>
</body>
</html>
"#
    ))
}

/// Renders the map and writes it into `results_dir`.
pub fn write_map(results_dir: &Path, records: &[RiskRecord]) -> Result<()> {
    let html = render_map(records)?;
    let path = results_dir.join("coastal_risk_map.html");
    std::fs::write(&path, html)?;
    info!(path = %path.display(), markers = records.len(), "Wrote risk map");
    Ok(())
}
