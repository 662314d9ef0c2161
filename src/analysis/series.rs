//! Monthly time series of total value.

use std::collections::BTreeMap;

use crate::domain::{MonthBucket, SeriesPoint, ShipmentRecord};

/// Total value per populated calendar month, oldest first.
///
/// Months without records do not appear (no zero-filling).
pub fn monthly_totals(records: &[ShipmentRecord]) -> Vec<SeriesPoint> {
    let mut buckets: BTreeMap<MonthBucket, f64> = BTreeMap::new();
    for r in records {
        *buckets.entry(MonthBucket::of(r.arrival_day())).or_insert(0.0) += r.total_value();
    }

    buckets
        .into_iter()
        .map(|(bucket, total_value)| SeriesPoint {
            bucket,
            month_end: bucket.last_day(),
            total_value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(y: i32, m: u32, d: u32, value: f64) -> ShipmentRecord {
        ShipmentRecord {
            arrival_date: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            importer_name: "Acme".to_string(),
            importer_country: "India".to_string(),
            origin_country: "China".to_string(),
            product_details: "Valves".to_string(),
            import_value_cif: Some(value),
            import_value_fob: None,
            quantity: None,
            quantity_unit: "PCS".to_string(),
        }
    }

    #[test]
    fn records_in_one_month_share_a_bucket() {
        let series = monthly_totals(&[rec(2024, 1, 5, 100.0), rec(2024, 1, 28, 50.0), rec(2024, 2, 1, 10.0)]);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].bucket, MonthBucket { year: 2024, month: 1 });
        assert_eq!(series[0].total_value, 150.0);
        assert_eq!(series[0].month_end, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(series[1].bucket, MonthBucket { year: 2024, month: 2 });
        assert_eq!(series[1].total_value, 10.0);
    }

    #[test]
    fn gaps_are_not_zero_filled_and_order_is_chronological() {
        let series = monthly_totals(&[rec(2024, 5, 1, 1.0), rec(2023, 12, 31, 2.0), rec(2024, 2, 10, 3.0)]);
        let labels: Vec<_> = series.iter().map(|p| p.bucket.to_string()).collect();
        assert_eq!(labels, vec!["2023-12", "2024-02", "2024-05"]);
    }

    #[test]
    fn empty_input_gives_empty_series() {
        assert!(monthly_totals(&[]).is_empty());
    }
}
