//! Per-station linear trend estimation.
//!
//! Fits water level against elapsed time with an ordinary least-squares
//! degree-1 fit and reports the slope in meters/year. Real gauge series are
//! irregular and gappy, so every degenerate shape (short series, missing
//! values, a single distinct instant) is answered with `None` rather than a
//! panic or an error, since an unusable station is an expected condition.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::timeseries::WaterLevelObs;

/// Minimum clean observations required before fitting. Shorter series are
/// dominated by deployment gaps and sensor noise.
pub const MIN_TREND_POINTS: usize = 30;

/// Fixed 365-day year used to convert m/s to m/year.
pub const SECONDS_PER_YEAR: f64 = 60.0 * 60.0 * 24.0 * 365.0;

/// Result of a successful trend fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendFit {
    /// Linear rate of change of water level, meters/year.
    pub slope_m_per_year: f64,
    /// Fitted water level at the earliest clean timestamp, meters.
    pub intercept: f64,
    /// Observations that survived cleaning and entered the fit.
    pub n_points: usize,
}

/// Estimates the linear water-level trend of one station's series.
///
/// Cleaning discards observations whose value is missing or non-finite.
/// Returns `None` when fewer than [`MIN_TREND_POINTS`] clean points remain,
/// or when the cleaned points span fewer than two distinct instants (the
/// slope of a vertical line is undefined). Input order does not matter.
pub fn fit_linear_trend(series: &[WaterLevelObs]) -> Option<TrendFit> {
    let clean: Vec<(DateTime<Utc>, f64)> = series
        .iter()
        .filter_map(|obs| {
            let value = obs.water_level_m.filter(|v| v.is_finite())?;
            Some((obs.datetime, value))
        })
        .collect();

    if clean.len() < MIN_TREND_POINTS {
        return None;
    }

    let t0 = clean.iter().map(|(t, _)| *t).min()?;

    let distinct_instants: HashSet<i64> = clean
        .iter()
        .map(|(t, _)| (*t - t0).num_milliseconds())
        .collect();
    if distinct_instants.len() < 2 {
        return None;
    }

    // Centered sums keep the normal equations stable even though elapsed
    // seconds reach into the millions while levels stay near zero.
    let n = clean.len() as f64;
    let xs: Vec<f64> = clean
        .iter()
        .map(|(t, _)| (*t - t0).num_milliseconds() as f64 / 1000.0)
        .collect();

    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = clean.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, (_, y)) in xs.iter().zip(&clean) {
        let dx = x - x_mean;
        sxx += dx * dx;
        sxy += dx * (y - y_mean);
    }

    // sxx > 0 is guaranteed by the distinct-instant guard.
    let slope_m_per_s = sxy / sxx;
    let intercept = y_mean - slope_m_per_s * x_mean;

    Some(TrendFit {
        slope_m_per_year: slope_m_per_s * SECONDS_PER_YEAR,
        intercept,
        n_points: clean.len(),
    })
}
