//! Record types flowing between the pipeline stages.
//!
//! Field declaration order matches the column order of the persisted CSV
//! artifacts, so these structs are the artifact schema.

use serde::{Deserialize, Serialize};

/// One trend-table row: a station with a usable trend estimate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendRecord {
    pub station_id: String,
    pub station_name: String,
    pub lat: f64,
    pub lon: f64,
    /// Linear sea-level trend, meters/year.
    pub trend_m_per_year: f64,
    /// Fitted water level at the start of the series, meters.
    pub trend_intercept: f64,
    /// Clean observations behind the fit.
    pub n_points: usize,
    /// History window that was requested when fetching, in days. Provenance
    /// only; the fit uses whatever the series actually contained.
    pub days_back: u32,
}

/// A trend record with its nearest housing observation attached.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    pub trend: TrendRecord,
    /// Median house value of the nearest housing observation.
    pub median_house_value: f64,
    /// Planar Euclidean distance to that observation, decimal degrees.
    pub nearest_housing_distance_deg: f64,
}

/// One final risk-table row. Written once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskRecord {
    pub station_id: String,
    pub station_name: String,
    pub lat: f64,
    pub lon: f64,
    pub trend_m_per_year: f64,
    pub trend_intercept: f64,
    pub n_points: usize,
    pub days_back: u32,
    pub median_house_value: f64,
    pub nearest_housing_distance_deg: f64,
    /// Trend relative to the set's maximum trend.
    pub trend_norm: f64,
    /// House value relative to the set's maximum value.
    pub house_norm: f64,
    /// `trend_norm * house_norm`. Comparable only within one run's set.
    pub risk_score: f64,
}
