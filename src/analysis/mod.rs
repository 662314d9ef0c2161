//! Filtering and aggregation over shipment relations.
//!
//! Every function here is a pure derivation of a `&[ShipmentRecord]`; nothing
//! is cached and nothing is mutated. All of them accept an empty relation.
//!
//! - `filter`: predicate conjunction + selector options
//! - `rank`: grouped sums and top-K rankings
//! - `series`: monthly totals
//! - `trend`: month-over-month growth per product
//! - `metrics`: KPI scalars
//! - `drilldown`: product / importer scoped views

pub mod drilldown;
pub mod filter;
pub mod metrics;
pub mod rank;
pub mod series;
pub mod trend;

pub use drilldown::*;
pub use filter::{FilterOptions, apply, filter_by_date};
pub use metrics::*;
pub use rank::*;
pub use series::*;
pub use trend::*;
