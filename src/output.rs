//! CSV persistence for the pipeline's tabular artifacts.
//!
//! Column names and order come from the record structs in
//! [`crate::analyzers::types`] and [`crate::stations`]; downstream plotting
//! relies on those exact headers, so nothing here renames fields.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::Path;
use tracing::info;

use crate::analyzers::types::{RiskRecord, TrendRecord};
use crate::stations::Station;

fn write_table<T: Serialize>(path: &Path, rows: &[T], what: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {} at {}", what, path.display()))?;

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "Wrote {}", what);
    Ok(())
}

fn read_table<T: DeserializeOwned>(path: &Path, what: &str) -> Result<Vec<T>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} at {}", what, path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: T =
            result.with_context(|| format!("Malformed row in {} at {}", what, path.display()))?;
        rows.push(row);
    }

    Ok(rows)
}

pub fn write_stations(path: &Path, stations: &[Station]) -> Result<()> {
    write_table(path, stations, "station metadata")
}

pub fn read_stations(path: &Path) -> Result<Vec<Station>> {
    read_table(path, "station metadata")
}

pub fn write_trend_table(path: &Path, records: &[TrendRecord]) -> Result<()> {
    write_table(path, records, "trend table")
}

pub fn write_risk_table(path: &Path, records: &[RiskRecord]) -> Result<()> {
    write_table(path, records, "risk table")
}

pub fn read_risk_table(path: &Path) -> Result<Vec<RiskRecord>> {
    read_table(path, "risk table")
}
