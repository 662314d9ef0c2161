//! Scalar KPIs over a relation.

use crate::analysis::rank::{GroupKey, distinct_count};
use crate::domain::{Metrics, ShipmentRecord};

/// Total value, shipment count, and distinct importer count.
pub fn summarize(records: &[ShipmentRecord]) -> Metrics {
    Metrics {
        total_value: records.iter().map(ShipmentRecord::total_value).sum(),
        shipments: records.len(),
        importers: distinct_count(records, GroupKey::Importer),
    }
}
