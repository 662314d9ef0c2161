//! Filter engine: a conjunction of predicates over a relation.
//!
//! The input relation is never touched; every call returns a fresh `Vec`.

use std::collections::BTreeSet;

use crate::analysis::rank::{GroupKey, distinct_values};
use crate::domain::{DEFAULT_IMPORTER_PICKS, DateRange, FilterSpec, ImporterSelection, ShipmentRecord};

/// Keep records matching every predicate of `spec`.
pub fn apply(records: &[ShipmentRecord], spec: &FilterSpec) -> Vec<ShipmentRecord> {
    records
        .iter()
        .filter(|r| matches(r, spec))
        .cloned()
        .collect()
}

/// Date stage only. Selector options are derived from this relation.
pub fn filter_by_date(records: &[ShipmentRecord], range: DateRange) -> Vec<ShipmentRecord> {
    records
        .iter()
        .filter(|r| range.contains(r.arrival_day()))
        .cloned()
        .collect()
}

pub fn matches(record: &ShipmentRecord, spec: &FilterSpec) -> bool {
    spec.date_range.contains(record.arrival_day())
        && spec.importers.admits(&record.importer_name)
        && spec.importer_country.matches(&record.importer_country)
        && spec.origin_country.matches(&record.origin_country)
}

/// Choices offered by the importer and country selectors.
///
/// All lists keep first-seen order of the (date-filtered) relation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub importers: Vec<String>,
    pub importer_countries: Vec<String>,
    pub origin_countries: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[ShipmentRecord]) -> Self {
        Self {
            importers: distinct_values(records, GroupKey::Importer),
            importer_countries: distinct_values(records, GroupKey::ImporterCountry),
            origin_countries: distinct_values(records, GroupKey::OriginCountry),
        }
    }

    /// The first few importers, used whenever the importer options change.
    pub fn default_importers(&self) -> ImporterSelection {
        ImporterSelection::Only(
            self.importers
                .iter()
                .take(DEFAULT_IMPORTER_PICKS)
                .cloned()
                .collect::<BTreeSet<_>>(),
        )
    }
}
