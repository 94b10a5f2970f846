//! Housing-value dataset loader.
//!
//! Reads `(latitude, longitude, median_house_value)` rows from a CSV file.
//! The expected shape is the California-housing dataset export, so the
//! loader also accepts that dataset's original headers (`Latitude`,
//! `Longitude`, `MedHouseVal`). Extra columns are ignored.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// One residential observation. Never tied back to a station identity
/// beyond nearest-neighbor matching.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HousingObservation {
    #[serde(alias = "Latitude")]
    pub latitude: f64,
    #[serde(alias = "Longitude")]
    pub longitude: f64,
    #[serde(alias = "MedHouseVal")]
    pub median_house_value: f64,
}

/// Loads the housing table from `path`.
///
/// # Errors
/// Fails if the file is missing or malformed, and fails loudly on an empty
/// table: the spatial join cannot produce a match for any station without
/// housing data, so there is no sensible partial result.
pub fn load_housing_csv(path: &Path) -> Result<Vec<HousingObservation>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open housing dataset {}", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut observations = Vec::new();
    for result in reader.deserialize() {
        let obs: HousingObservation =
            result.with_context(|| format!("Malformed row in housing dataset {}", path.display()))?;
        observations.push(obs);
    }

    if observations.is_empty() {
        bail!("Housing dataset {} contains no rows", path.display());
    }

    Ok(observations)
}
