//! Month-over-month growth per product.
//!
//! For each product, every populated month is compared with the product's
//! previous *populated* month (not necessarily the calendar-adjacent one):
//!
//! `growth = (current - previous) / previous * 100`
//!
//! A product's first month has nothing to compare against and yields no row.
//! When the previous month's total is exactly zero the rate is undefined; such
//! rows are excluded and counted in `TrendOutcome::excluded_zero_base`. The
//! zero-valued month still serves as "previous" for the month after it.

use std::collections::{BTreeMap, HashMap};

use crate::domain::{GrowthRow, MonthBucket, ShipmentRecord, TOP_GROWTH, TrendRow};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendOutcome {
    /// Rows ordered by month, then product.
    pub rows: Vec<TrendRow>,
    pub excluded_zero_base: usize,
}

/// Per-(month, product) growth rows.
pub fn growth_trend(records: &[ShipmentRecord]) -> TrendOutcome {
    let mut cells: BTreeMap<(MonthBucket, &str), f64> = BTreeMap::new();
    for r in records {
        if r.product_details.is_empty() {
            continue;
        }
        let key = (MonthBucket::of(r.arrival_day()), r.product_details.as_str());
        *cells.entry(key).or_insert(0.0) += r.total_value();
    }

    let mut previous: HashMap<&str, f64> = HashMap::new();
    let mut outcome = TrendOutcome::default();

    for ((bucket, product), total_value) in cells {
        let Some(prev) = previous.insert(product, total_value) else {
            continue;
        };
        if prev == 0.0 {
            outcome.excluded_zero_base += 1;
            continue;
        }
        outcome.rows.push(TrendRow {
            bucket,
            product: product.to_string(),
            total_value,
            previous_value: prev,
            growth_rate: (total_value - prev) / prev * 100.0,
        });
    }

    outcome
}

/// Mean growth per product, the `n` highest first.
///
/// Ties keep the order in which products first appear in `rows`.
pub fn top_growth_products(rows: &[TrendRow], n: usize) -> Vec<GrowthRow> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut acc: Vec<(&str, f64, usize)> = Vec::new();

    for row in rows {
        match index.get(row.product.as_str()) {
            Some(&i) => {
                acc[i].1 += row.growth_rate;
                acc[i].2 += 1;
            }
            None => {
                index.insert(row.product.as_str(), acc.len());
                acc.push((row.product.as_str(), row.growth_rate, 1));
            }
        }
    }

    let mut out: Vec<GrowthRow> = acc
        .into_iter()
        .map(|(product, sum, periods)| GrowthRow {
            product: product.to_string(),
            mean_growth_rate: sum / periods as f64,
            periods,
        })
        .collect();

    out.sort_by(|a, b| {
        b.mean_growth_rate
            .partial_cmp(&a.mean_growth_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    out.truncate(n);
    out
}

/// The dashboard's growth chart: top products by mean growth.
pub fn growth_products(records: &[ShipmentRecord]) -> Vec<GrowthRow> {
    top_growth_products(&growth_trend(records).rows, TOP_GROWTH)
}
