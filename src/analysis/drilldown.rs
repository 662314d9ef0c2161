//! Views scoped to a single product or importer.

use crate::analysis::rank::{GroupKey, Metric, top_k};
use crate::domain::{Drilldown, ShipmentRecord, TOP_DRILLDOWN};

/// Totals for one product plus its top importers by value.
pub fn product_drilldown(records: &[ShipmentRecord], product: &str) -> Drilldown {
    drilldown(records, GroupKey::Product, product, GroupKey::Importer)
}

/// Totals for one importer plus its top products by value.
pub fn importer_drilldown(records: &[ShipmentRecord], importer: &str) -> Drilldown {
    drilldown(records, GroupKey::Importer, importer, GroupKey::Product)
}

fn drilldown(records: &[ShipmentRecord], scope: GroupKey, key: &str, rank_by: GroupKey) -> Drilldown {
    let scoped: Vec<ShipmentRecord> = records
        .iter()
        .filter(|r| scope.of(r) == key)
        .cloned()
        .collect();

    Drilldown {
        key: key.to_string(),
        total_value: scoped.iter().map(ShipmentRecord::total_value).sum(),
        total_quantity: scoped.iter().map(ShipmentRecord::quantity_or_zero).sum(),
        ranking: top_k(&scoped, rank_by, Metric::TotalValue, TOP_DRILLDOWN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(importer: &str, product: &str, value: f64, qty: Option<f64>) -> ShipmentRecord {
        ShipmentRecord {
            arrival_date: NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            importer_name: importer.to_string(),
            importer_country: "India".to_string(),
            origin_country: "China".to_string(),
            product_details: product.to_string(),
            import_value_cif: Some(value),
            import_value_fob: None,
            quantity: qty,
            quantity_unit: "PCS".to_string(),
        }
    }

    fn sample() -> Vec<ShipmentRecord> {
        vec![
            rec("Acme", "Valves", 100.0, Some(2.0)),
            rec("Beta", "Valves", 300.0, Some(1.0)),
            rec("Acme", "Pipes", 50.0, None),
            rec("Acme", "Valves", 25.0, Some(4.0)),
        ]
    }

    #[test]
    fn product_drilldown_ranks_importers() {
        let d = product_drilldown(&sample(), "Valves");
        assert_eq!(d.total_value, 425.0);
        assert_eq!(d.total_quantity, 7.0);
        let keys: Vec<_> = d.ranking.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Beta", "Acme"]);
        assert_eq!(d.ranking[1].value, 125.0);
    }

    #[test]
    fn importer_drilldown_ranks_products() {
        let d = importer_drilldown(&sample(), "Acme");
        assert_eq!(d.total_value, 175.0);
        assert_eq!(d.total_quantity, 6.0);
        assert_eq!(d.ranking[0].key, "Valves");
        assert_eq!(d.ranking[1].key, "Pipes");
    }

    #[test]
    fn unknown_key_is_empty_not_an_error() {
        let d = importer_drilldown(&sample(), "Nobody");
        assert_eq!(d.total_value, 0.0);
        assert_eq!(d.total_quantity, 0.0);
        assert!(d.ranking.is_empty());
    }
}
