//! Station trend-table assembly.

use std::collections::HashMap;
use tracing::info;

use crate::analyzers::trend::fit_linear_trend;
use crate::analyzers::types::TrendRecord;
use crate::stations::Station;
use crate::timeseries::WaterLevelObs;

/// Builds the per-station trend table.
///
/// For each station, looks up its series in `series_by_station` and fits a
/// trend. Stations with no series, an empty series, or an undefined fit are
/// skipped silently (outages and API gaps are normal, not errors); the skip
/// counts are logged at info level. Output order follows the input station
/// order. `days_back` is recorded on every row for provenance.
pub fn build_trend_table(
    stations: &[Station],
    series_by_station: &HashMap<String, Vec<WaterLevelObs>>,
    days_back: u32,
) -> Vec<TrendRecord> {
    let mut records = Vec::new();
    let mut no_series = 0usize;
    let mut no_fit = 0usize;

    for station in stations {
        let Some(series) = series_by_station.get(&station.station_id) else {
            no_series += 1;
            continue;
        };
        if series.is_empty() {
            no_series += 1;
            continue;
        }

        let Some(fit) = fit_linear_trend(series) else {
            no_fit += 1;
            continue;
        };

        records.push(TrendRecord {
            station_id: station.station_id.clone(),
            station_name: station.station_name.clone(),
            lat: station.lat,
            lon: station.lon,
            trend_m_per_year: fit.slope_m_per_year,
            trend_intercept: fit.intercept,
            n_points: fit.n_points,
            days_back,
        });
    }

    info!(
        usable = records.len(),
        skipped_no_series = no_series,
        skipped_no_fit = no_fit,
        "Trend table built"
    );

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::trend::{MIN_TREND_POINTS, SECONDS_PER_YEAR};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn linear_series(n: usize, a: f64, trend_m_per_year: f64) -> Vec<WaterLevelObs> {
        let b = trend_m_per_year / SECONDS_PER_YEAR;
        (0..n)
            .map(|i| {
                WaterLevelObs::new(
                    t0() + Duration::hours(i as i64),
                    Some(a + b * (i * 3600) as f64),
                )
            })
            .collect()
    }

    fn station(id: &str, name: &str) -> Station {
        Station::new(id, name, 36.0, -122.0)
    }

    #[test]
    fn test_stations_without_series_are_skipped() {
        let stations = vec![station("1", "With Data"), station("2", "Without Data")];
        let mut series = HashMap::new();
        series.insert("1".to_string(), linear_series(40, 1.0, 0.002));

        let table = build_trend_table(&stations, &series, 30);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].station_id, "1");
    }

    #[test]
    fn test_empty_series_is_skipped() {
        let stations = vec![station("1", "Empty")];
        let mut series = HashMap::new();
        series.insert("1".to_string(), Vec::new());

        assert!(build_trend_table(&stations, &series, 30).is_empty());
    }

    #[test]
    fn test_undefined_fit_is_skipped() {
        let stations = vec![station("1", "Short Series")];
        let mut series = HashMap::new();
        series.insert("1".to_string(), linear_series(MIN_TREND_POINTS - 5, 1.0, 0.002));

        assert!(build_trend_table(&stations, &series, 30).is_empty());
    }

    #[test]
    fn test_output_order_follows_station_order() {
        let stations = vec![station("b", "Second"), station("a", "First")];
        let mut series = HashMap::new();
        series.insert("a".to_string(), linear_series(40, 1.0, 0.001));
        series.insert("b".to_string(), linear_series(40, 1.0, 0.002));

        let table = build_trend_table(&stations, &series, 30);
        assert_eq!(table[0].station_id, "b");
        assert_eq!(table[1].station_id, "a");
    }

    #[test]
    fn test_record_carries_fit_and_provenance() {
        let stations = vec![station("9414290", "San Francisco")];
        let mut series = HashMap::new();
        series.insert("9414290".to_string(), linear_series(48, 1.25, 0.002));

        let table = build_trend_table(&stations, &series, 90);
        assert_eq!(table.len(), 1);
        let record = &table[0];
        assert!((record.trend_m_per_year - 0.002).abs() < 1e-9);
        assert!((record.trend_intercept - 1.25).abs() < 1e-9);
        assert_eq!(record.n_points, 48);
        assert_eq!(record.days_back, 90);
        assert_eq!(record.lat, 36.0);
    }
}
