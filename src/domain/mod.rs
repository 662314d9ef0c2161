//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the shipment record and its derived `total_value`
//! - filter value objects (`FilterSpec`, `ImporterSelection`, `CountryFilter`)
//! - aggregation outputs (`Ranking`, `SeriesPoint`, `TrendRow`, `Metrics`, ...)

pub mod types;

pub use types::*;
