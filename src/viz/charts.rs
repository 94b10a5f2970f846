//! SVG chart rendering for the risk table.
//!
//! Three artifacts: a scatter of trend vs. housing value, a bar chart of
//! risk scores, and a line chart of trends, each a standalone SVG document.
//! The SVG is assembled as text; chart structure is fixed and small enough
//! that a plotting dependency would outweigh it.

use anyhow::{Result, bail};
use std::path::Path;
use tracing::info;

use crate::analyzers::types::RiskRecord;
use crate::viz::escape_xml;

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 540.0;
const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 110.0;

/// Maps a data interval onto a pixel interval.
struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LinearScale {
    fn new(d0: f64, d1: f64, r0: f64, r1: f64) -> Self {
        Self { d0, d1, r0, r1 }
    }

    fn map(&self, v: f64) -> f64 {
        if self.d1 == self.d0 {
            // Degenerate domain: park everything mid-range.
            return (self.r0 + self.r1) / 2.0;
        }
        self.r0 + (v - self.d0) / (self.d1 - self.d0) * (self.r1 - self.r0)
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn svg_open(title: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">
<rect width="{WIDTH}" height="{HEIGHT}" fill="white"/>
<text x="{x}" y="28" text-anchor="middle" font-size="18">{title}</text>
"#,
        x = WIDTH / 2.0,
        title = escape_xml(title),
    )
}

fn axes(x_label: &str, y_label: &str) -> String {
    let x0 = MARGIN_LEFT;
    let x1 = WIDTH - MARGIN_RIGHT;
    let y0 = HEIGHT - MARGIN_BOTTOM;
    let y1 = MARGIN_TOP;
    format!(
        r#"<line x1="{x0}" y1="{y0}" x2="{x1}" y2="{y0}" stroke="black"/>
<line x1="{x0}" y1="{y0}" x2="{x0}" y2="{y1}" stroke="black"/>
<text x="{xc}" y="{yb}" text-anchor="middle" font-size="13">{x_label}</text>
<text x="18" y="{ym}" text-anchor="middle" font-size="13" transform="rotate(-90 18 {ym})">{y_label}</text>
"#,
        xc = (x0 + x1) / 2.0,
        yb = HEIGHT - 8.0,
        ym = (y0 + y1) / 2.0,
        x_label = escape_xml(x_label),
        y_label = escape_xml(y_label),
    )
}

fn ensure_rows(records: &[RiskRecord]) -> Result<()> {
    if records.is_empty() {
        bail!("Cannot render charts: the risk table is empty");
    }
    Ok(())
}

/// Scatter of sea-level trend against median house value, one labeled point
/// per station.
pub fn scatter_trend_vs_housing(records: &[RiskRecord]) -> Result<String> {
    ensure_rows(records)?;

    let (t_lo, t_hi) = min_max(records.iter().map(|r| r.trend_m_per_year));
    let (v_lo, v_hi) = min_max(records.iter().map(|r| r.median_house_value));
    let x = LinearScale::new(t_lo, t_hi, MARGIN_LEFT + 20.0, WIDTH - MARGIN_RIGHT - 20.0);
    let y = LinearScale::new(v_lo, v_hi, HEIGHT - MARGIN_BOTTOM - 20.0, MARGIN_TOP + 20.0);

    let mut svg = svg_open("Sea-level trend vs median house value");
    svg.push_str(&axes("Sea-level trend (m/year)", "Median house value"));

    for record in records {
        let cx = x.map(record.trend_m_per_year);
        let cy = y.map(record.median_house_value);
        svg.push_str(&format!(
            r#"<circle cx="{cx:.1}" cy="{cy:.1}" r="5" fill="steelblue" fill-opacity="0.8"/>
<text x="{tx:.1}" y="{ty:.1}" font-size="10">{name}</text>
"#,
            tx = cx + 7.0,
            ty = cy - 5.0,
            name = escape_xml(&record.station_name),
        ));
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

/// Bar chart of risk scores, highest first, station names on the x axis.
pub fn bar_risk_scores(records: &[RiskRecord]) -> Result<String> {
    ensure_rows(records)?;

    let mut sorted: Vec<&RiskRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));

    let (lo, hi) = min_max(sorted.iter().map(|r| r.risk_score));
    let baseline = lo.min(0.0);
    let y = LinearScale::new(baseline, hi.max(0.0), HEIGHT - MARGIN_BOTTOM, MARGIN_TOP + 20.0);

    let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let step = plot_width / sorted.len() as f64;
    let bar_width = (step * 0.7).min(60.0);

    let mut svg = svg_open("Coastal risk score by station");
    svg.push_str(&axes("", "Risk score"));

    for (i, record) in sorted.iter().enumerate() {
        let x0 = MARGIN_LEFT + i as f64 * step + (step - bar_width) / 2.0;
        let y_top = y.map(record.risk_score.max(0.0));
        let y_zero = y.map(0.0_f64.max(baseline));
        let height = (y_zero - y_top).abs().max(0.5);
        let label_x = MARGIN_LEFT + i as f64 * step + step / 2.0;
        let label_y = HEIGHT - MARGIN_BOTTOM + 14.0;
        svg.push_str(&format!(
            r#"<rect x="{x0:.1}" y="{y_top:.1}" width="{bar_width:.1}" height="{height:.1}" fill="steelblue"/>
<text x="{label_x:.1}" y="{label_y:.1}" font-size="10" text-anchor="end" transform="rotate(-45 {label_x:.1} {label_y:.1})">{name}</text>
"#,
            name = escape_xml(&record.station_name),
        ));
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

/// Line chart of trends, highest first.
pub fn line_trends(records: &[RiskRecord]) -> Result<String> {
    ensure_rows(records)?;

    let mut sorted: Vec<&RiskRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.trend_m_per_year.total_cmp(&a.trend_m_per_year));

    let (lo, hi) = min_max(sorted.iter().map(|r| r.trend_m_per_year));
    let y = LinearScale::new(lo, hi, HEIGHT - MARGIN_BOTTOM - 20.0, MARGIN_TOP + 20.0);
    let plot_width = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let step = plot_width / sorted.len() as f64;

    let mut svg = svg_open("Sea-level trend by station");
    svg.push_str(&axes("", "Sea-level trend (m/year)"));

    let points: Vec<(f64, f64)> = sorted
        .iter()
        .enumerate()
        .map(|(i, r)| {
            (
                MARGIN_LEFT + i as f64 * step + step / 2.0,
                y.map(r.trend_m_per_year),
            )
        })
        .collect();

    let path: Vec<String> = points.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();
    svg.push_str(&format!(
        r#"<polyline points="{}" fill="none" stroke="steelblue" stroke-width="1.5"/>
"#,
        path.join(" ")
    ));

    for ((x, py), record) in points.iter().zip(&sorted) {
        let label_y = HEIGHT - MARGIN_BOTTOM + 14.0;
        svg.push_str(&format!(
            r#"<circle cx="{x:.1}" cy="{py:.1}" r="4" fill="steelblue"/>
<text x="{x:.1}" y="{label_y:.1}" font-size="10" text-anchor="end" transform="rotate(-45 {x:.1} {label_y:.1})">{name}</text>
"#,
            name = escape_xml(&record.station_name),
        ));
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

/// Renders all three charts into `results_dir`.
pub fn write_charts(results_dir: &Path, records: &[RiskRecord]) -> Result<()> {
    let artifacts = [
        ("scatter_trend_vs_housing.svg", scatter_trend_vs_housing(records)?),
        ("bar_risk_scores.svg", bar_risk_scores(records)?),
        ("line_trends.svg", line_trends(records)?),
    ];

    for (name, svg) in artifacts {
        let path = results_dir.join(name);
        std::fs::write(&path, svg)?;
        info!(path = %path.display(), "Wrote chart");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, trend: f64, value: f64, score: f64) -> RiskRecord {
        RiskRecord {
            station_id: id.to_string(),
            station_name: name.to_string(),
            lat: 36.0,
            lon: -122.0,
            trend_m_per_year: trend,
            trend_intercept: 1.0,
            n_points: 40,
            days_back: 30,
            median_house_value: value,
            nearest_housing_distance_deg: 0.05,
            trend_norm: 0.5,
            house_norm: 0.5,
            risk_score: score,
        }
    }

    fn sample() -> Vec<RiskRecord> {
        vec![
            record("1", "San Diego", 0.001, 100.0, 0.0625),
            record("2", "Monterey", 0.002, 200.0, 0.25),
            record("3", "Crescent City", 0.004, 400.0, 1.0),
        ]
    }

    #[test]
    fn test_scatter_labels_every_station() {
        let svg = scatter_trend_vs_housing(&sample()).unwrap();
        assert_eq!(svg.matches("<circle").count(), 3);
        assert!(svg.contains("San Diego"));
        assert!(svg.contains("Monterey"));
        assert!(svg.contains("Crescent City"));
    }

    #[test]
    fn test_bar_chart_has_one_bar_per_station() {
        let svg = bar_risk_scores(&sample()).unwrap();
        assert_eq!(svg.matches("<rect").count(), 1 + 3); // background + bars
    }

    #[test]
    fn test_line_chart_connects_all_stations() {
        let svg = line_trends(&sample()).unwrap();
        assert!(svg.contains("<polyline"));
        assert_eq!(svg.matches("<circle").count(), 3);
    }

    #[test]
    fn test_station_names_are_escaped() {
        let rows = vec![record("1", "Dana Point & <Harbor>", 0.001, 100.0, 0.5)];
        let svg = bar_risk_scores(&rows).unwrap();
        assert!(svg.contains("Dana Point &amp; &lt;Harbor&gt;"));
        assert!(!svg.contains("<Harbor>"));
    }

    #[test]
    fn test_empty_table_is_an_error() {
        assert!(scatter_trend_vs_housing(&[]).is_err());
        assert!(bar_risk_scores(&[]).is_err());
        assert!(line_trends(&[]).is_err());
    }

    #[test]
    fn test_single_station_degenerate_domain_renders() {
        let rows = vec![record("1", "Alone", 0.002, 250.0, 1.0)];
        let svg = scatter_trend_vs_housing(&rows).unwrap();
        // Degenerate min==max domain must not produce NaN coordinates.
        assert!(!svg.contains("NaN"));
    }
}
