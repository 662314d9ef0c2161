//! Grouped sums and top-K rankings.
//!
//! Groups keep first-seen order, and sorting is stable, so ties in the summed
//! metric come out in the order their keys first appeared in the relation.
//! Records whose key is empty are not grouped.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::domain::{QuantityUnit, RankedRow, Ranking, ShipmentRecord, TOP_DRILLDOWN, TOP_RANKING};

/// Field a relation can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Importer,
    Product,
    ImporterCountry,
    OriginCountry,
}

impl GroupKey {
    pub fn of(self, record: &ShipmentRecord) -> &str {
        match self {
            GroupKey::Importer => &record.importer_name,
            GroupKey::Product => &record.product_details,
            GroupKey::ImporterCountry => &record.importer_country,
            GroupKey::OriginCountry => &record.origin_country,
        }
    }
}

/// Value summed per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    TotalValue,
    Quantity,
}

impl Metric {
    pub fn of(self, record: &ShipmentRecord) -> f64 {
        match self {
            Metric::TotalValue => record.total_value(),
            Metric::Quantity => record.quantity_or_zero(),
        }
    }
}

/// Sum `metric` per `key`, in first-seen key order.
pub fn group_sums(records: &[ShipmentRecord], key: GroupKey, metric: Metric) -> Vec<RankedRow> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut rows: Vec<RankedRow> = Vec::new();

    for r in records {
        let k = key.of(r);
        if k.is_empty() {
            continue;
        }
        let v = metric.of(r);
        match index.get(k) {
            Some(&i) => rows[i].value += v,
            None => {
                index.insert(k, rows.len());
                rows.push(RankedRow {
                    key: k.to_string(),
                    value: v,
                });
            }
        }
    }

    rows
}

/// Every group, sorted descending by the summed metric.
pub fn ranked(records: &[ShipmentRecord], key: GroupKey, metric: Metric) -> Ranking {
    let mut rows = group_sums(records, key, metric);
    sort_descending(&mut rows);
    rows
}

/// The `k` largest groups by the summed metric.
pub fn top_k(records: &[ShipmentRecord], key: GroupKey, metric: Metric, k: usize) -> Ranking {
    let mut rows = ranked(records, key, metric);
    rows.truncate(k);
    rows
}

pub fn top_importers(records: &[ShipmentRecord]) -> Ranking {
    top_k(records, GroupKey::Importer, Metric::TotalValue, TOP_RANKING)
}

pub fn top_products(records: &[ShipmentRecord]) -> Ranking {
    top_k(records, GroupKey::Product, Metric::TotalValue, TOP_RANKING)
}

/// Products ranked by quantity among records measured in `unit`.
pub fn top_products_for_unit(records: &[ShipmentRecord], unit: QuantityUnit) -> Ranking {
    let scoped: Vec<ShipmentRecord> = records
        .iter()
        .filter(|r| r.quantity_unit == unit.as_str())
        .cloned()
        .collect();
    top_k(&scoped, GroupKey::Product, Metric::Quantity, TOP_DRILLDOWN)
}

/// Total value per importer country, exact source names, largest first.
pub fn country_totals(records: &[ShipmentRecord]) -> Ranking {
    ranked(records, GroupKey::ImporterCountry, Metric::TotalValue)
}

/// Distinct non-empty values of `key` in first-seen order.
pub fn distinct_values(records: &[ShipmentRecord], key: GroupKey) -> Vec<String> {
    group_sums(records, key, Metric::TotalValue)
        .into_iter()
        .map(|row| row.key)
        .collect()
}

/// Number of distinct non-empty values of `key`.
pub fn distinct_count(records: &[ShipmentRecord], key: GroupKey) -> usize {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .map(|r| key.of(r))
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(*k))
        .count()
}

pub(crate) fn sort_descending(rows: &mut [RankedRow]) {
    rows.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(importer: &str, product: &str, country: &str, cif: Option<f64>, fob: Option<f64>) -> ShipmentRecord {
        ShipmentRecord {
            arrival_date: NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            importer_name: importer.to_string(),
            importer_country: country.to_string(),
            origin_country: "China".to_string(),
            product_details: product.to_string(),
            import_value_cif: cif,
            import_value_fob: fob,
            quantity: None,
            quantity_unit: "PCS".to_string(),
        }
    }

    fn with_quantity(mut r: ShipmentRecord, qty: f64, unit: &str) -> ShipmentRecord {
        r.quantity = Some(qty);
        r.quantity_unit = unit.to_string();
        r
    }

    #[test]
    fn top_k_on_short_input_returns_everything_sorted() {
        let records = vec![
            rec("A", "p", "India", Some(10.0), None),
            rec("B", "p", "India", Some(30.0), Some(5.0)),
            rec("C", "p", "India", None, Some(20.0)),
        ];
        let top = top_importers(&records);
        assert_eq!(top.len(), 3);
        let keys: Vec<_> = top.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["B", "C", "A"]);
        assert!(top.windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn top_k_truncates_and_sums_per_group() {
        let mut records = Vec::new();
        for i in 0..15 {
            records.push(rec(&format!("Imp{i:02}"), "p", "India", Some(i as f64), None));
            records.push(rec(&format!("Imp{i:02}"), "p", "India", None, Some(1.0)));
        }
        let top = top_importers(&records);
        assert_eq!(top.len(), TOP_RANKING);
        assert_eq!(top[0].key, "Imp14");
        assert_eq!(top[0].value, 15.0);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let records = vec![
            rec("Zeta", "p", "India", Some(5.0), None),
            rec("Alpha", "p", "India", Some(5.0), None),
        ];
        let keys: Vec<_> = top_importers(&records).into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn empty_input_gives_empty_rankings() {
        assert!(top_importers(&[]).is_empty());
        assert!(top_products(&[]).is_empty());
        assert!(country_totals(&[]).is_empty());
        assert!(top_products_for_unit(&[], QuantityUnit::Kgs).is_empty());
    }

    #[test]
    fn unit_scoped_ranking_sums_quantity() {
        let records = vec![
            with_quantity(rec("A", "Bolts", "India", Some(1.0), None), 5.0, "KGS"),
            with_quantity(rec("B", "Bolts", "India", Some(1.0), None), 7.0, "KGS"),
            with_quantity(rec("A", "Nuts", "India", Some(999.0), None), 3.0, "KGS"),
            with_quantity(rec("A", "Gears", "India", Some(1.0), None), 100.0, "PCS"),
        ];
        let top = top_products_for_unit(&records, QuantityUnit::Kgs);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].key, "Bolts");
        assert_eq!(top[0].value, 12.0);
        assert!(top_products_for_unit(&records, QuantityUnit::Meter).is_empty());
    }

    #[test]
    fn country_totals_keep_exact_names() {
        let records = vec![
            rec("A", "p", "United States", Some(1.0), None),
            rec("B", "p", "united states", Some(2.0), None),
            rec("C", "p", "United States", Some(4.0), None),
        ];
        let geo = country_totals(&records);
        assert_eq!(geo.len(), 2);
        assert_eq!(geo[0].key, "United States");
        assert_eq!(geo[0].value, 5.0);
        assert_eq!(geo[1].key, "united states");
    }

    #[test]
    fn empty_keys_are_not_grouped() {
        let records = vec![
            rec("A", "", "India", Some(1.0), None),
            rec("A", "Valves", "", Some(2.0), None),
        ];
        assert_eq!(top_products(&records).len(), 1);
        assert_eq!(country_totals(&records).len(), 1);
        assert_eq!(distinct_count(&records, GroupKey::Product), 1);
    }
}
