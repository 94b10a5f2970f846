//! The analytical core of the pipeline.
//!
//! This module turns per-station water-level series into the final risk
//! table: trend estimation, the station trend table, the nearest-neighbor
//! housing join, and set-relative risk scoring. Everything here is pure
//! computation over in-memory tables; I/O stays in the collaborators.

pub mod risk;
pub mod spatial;
pub mod table;
pub mod trend;
pub mod types;
