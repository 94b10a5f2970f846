//! Set-relative risk scoring.
//!
//! `risk_score = (trend / max trend) * (house value / max house value)`,
//! computed over one run's full station set. The score is a ranking signal
//! within that set only: adding or removing a station changes every score.
//! That coupling is deliberate and must be preserved.

use anyhow::{Result, bail};

use crate::analyzers::types::{JoinedRecord, RiskRecord};

/// Scores every joined record against the set's maxima.
///
/// # Errors
/// Fails fast when scoring cannot mean anything:
/// - the input table is empty, or
/// - the maximum trend or maximum housing value is non-finite or not
///   strictly positive (a zero or negative denominator would put NaN or
///   sign-flipped scores in the artifact).
///
/// Negative individual trends are fine as long as some station's trend is
/// positive; their scores simply fall below zero and rank last.
pub fn score_risk(joined: Vec<JoinedRecord>) -> Result<Vec<RiskRecord>> {
    if joined.is_empty() {
        bail!("Cannot score risk: no stations survived the trend and join stages");
    }

    let max_trend = joined
        .iter()
        .map(|j| j.trend.trend_m_per_year)
        .fold(f64::NEG_INFINITY, f64::max);
    let max_value = joined
        .iter()
        .map(|j| j.median_house_value)
        .fold(f64::NEG_INFINITY, f64::max);

    if !max_trend.is_finite() || max_trend <= 0.0 {
        bail!("Cannot normalize trend_m_per_year: set maximum is {max_trend}, expected a finite positive value");
    }
    if !max_value.is_finite() || max_value <= 0.0 {
        bail!("Cannot normalize median_house_value: set maximum is {max_value}, expected a finite positive value");
    }

    let records = joined
        .into_iter()
        .map(|j| {
            let trend_norm = j.trend.trend_m_per_year / max_trend;
            let house_norm = j.median_house_value / max_value;
            RiskRecord {
                station_id: j.trend.station_id,
                station_name: j.trend.station_name,
                lat: j.trend.lat,
                lon: j.trend.lon,
                trend_m_per_year: j.trend.trend_m_per_year,
                trend_intercept: j.trend.trend_intercept,
                n_points: j.trend.n_points,
                days_back: j.trend.days_back,
                median_house_value: j.median_house_value,
                nearest_housing_distance_deg: j.nearest_housing_distance_deg,
                trend_norm,
                house_norm,
                risk_score: trend_norm * house_norm,
            }
        })
        .collect();

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::TrendRecord;

    fn joined(id: &str, trend: f64, value: f64) -> JoinedRecord {
        JoinedRecord {
            trend: TrendRecord {
                station_id: id.to_string(),
                station_name: format!("Station {id}"),
                lat: 36.0,
                lon: -122.0,
                trend_m_per_year: trend,
                trend_intercept: 1.0,
                n_points: 40,
                days_back: 30,
            },
            median_house_value: value,
            nearest_housing_distance_deg: 0.05,
        }
    }

    #[test]
    fn test_three_station_reference_scenario() {
        let input = vec![
            joined("a", 0.001, 100.0),
            joined("b", 0.002, 200.0),
            joined("c", 0.004, 400.0),
        ];

        let scored = score_risk(input).unwrap();
        let norms: Vec<f64> = scored.iter().map(|r| r.trend_norm).collect();
        assert_eq!(norms, vec![0.25, 0.5, 1.0]);
        let house: Vec<f64> = scored.iter().map(|r| r.house_norm).collect();
        assert_eq!(house, vec![0.25, 0.5, 1.0]);
        let scores: Vec<f64> = scored.iter().map(|r| r.risk_score).collect();
        assert_eq!(scores, vec![0.0625, 0.25, 1.0]);
    }

    #[test]
    fn test_score_is_product_of_norms() {
        let input = vec![
            joined("a", 0.0007, 3.1),
            joined("b", 0.0031, 1.7),
            joined("c", 0.0012, 4.9),
        ];

        for record in score_risk(input).unwrap() {
            assert_eq!(record.risk_score, record.trend_norm * record.house_norm);
        }
    }

    #[test]
    fn test_max_row_scores_exactly_one() {
        let input = vec![joined("low", 0.001, 150.0), joined("max", 0.003, 420.0)];

        let scored = score_risk(input).unwrap();
        assert_eq!(scored[1].risk_score, 1.0);
    }

    #[test]
    fn test_rescoring_scored_output_is_idempotent() {
        let input = vec![
            joined("a", 0.001, 100.0),
            joined("b", 0.002, 200.0),
            joined("c", 0.004, 400.0),
        ];
        let first = score_risk(input).unwrap();

        // Rebuild join-stage records from the scored output, ignoring the
        // previously computed norms and score.
        let rebuilt: Vec<JoinedRecord> = first
            .iter()
            .map(|r| {
                let mut j = joined(&r.station_id, r.trend_m_per_year, r.median_house_value);
                j.nearest_housing_distance_deg = r.nearest_housing_distance_deg;
                j
            })
            .collect();
        let second = score_risk(rebuilt).unwrap();

        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.trend_norm, b.trend_norm);
            assert_eq!(a.house_norm, b.house_norm);
            assert_eq!(a.risk_score, b.risk_score);
        }
    }

    #[test]
    fn test_negative_trend_among_positive_scores_below_zero() {
        let input = vec![joined("falling", -0.002, 300.0), joined("rising", 0.004, 200.0)];

        let scored = score_risk(input).unwrap();
        assert!(scored[0].risk_score < 0.0);
        assert_eq!(scored[1].trend_norm, 1.0);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(score_risk(Vec::new()).is_err());
    }

    #[test]
    fn test_zero_maximum_trend_fails_fast() {
        let input = vec![joined("a", 0.0, 100.0), joined("b", -0.001, 200.0)];

        let err = score_risk(input).unwrap_err();
        assert!(err.to_string().contains("trend_m_per_year"));
    }

    #[test]
    fn test_zero_maximum_house_value_fails_fast() {
        let input = vec![joined("a", 0.001, 0.0)];

        let err = score_risk(input).unwrap_err();
        assert!(err.to_string().contains("median_house_value"));
    }
}
