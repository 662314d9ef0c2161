//! Data access: company catalog, CSV loading, and the per-company cache.

pub mod cache;
pub mod catalog;
pub mod loader;

pub use cache::{CsvDirectory, DatasetCache, ShipmentSource};
pub use catalog::{discover_companies, parse_company_list, resolve_companies};
pub use loader::{Dataset, RowError, load_company};
