//! Output helpers.
//!
//! - filtered shipment table as CSV (`export`)
//! - full dashboard pass as JSON (`snapshot`)

pub mod export;
pub mod snapshot;

pub use export::*;
pub use snapshot::*;
