//! Shared "dashboard pass" logic used by both the report and the TUI.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! cache lookup -> filter -> rankings / series / trend / metrics / drill-downs
//!
//! The report and the TUI can then focus on presentation (printing vs widgets).
//! Every pass recomputes everything from the cached dataset.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::analysis::{self, FilterOptions, GroupKey};
use crate::data::{Dataset, DatasetCache, ShipmentSource};
use crate::domain::{
    DashboardConfig, DateRange, Drilldown, FilterSpec, GrowthRow, ImporterSelection, Metrics, QuantityUnit,
    Ranking, SeriesPoint, ShipmentRecord, TrendRow,
};
use crate::error::AppError;

/// Selections that shape the view but not the filtered relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSelections {
    pub unit: QuantityUnit,
    pub product: Option<String>,
    pub importer: Option<String>,
}

impl Default for ViewSelections {
    fn default() -> Self {
        Self {
            unit: QuantityUnit::Pcs,
            product: None,
            importer: None,
        }
    }
}

/// All computed outputs of a single dashboard pass.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub company: String,
    pub filter: FilterSpec,
    /// The filtered relation (the shipment table).
    pub records: Vec<ShipmentRecord>,
    pub top_importers: Ranking,
    pub top_products: Ranking,
    pub monthly: Vec<SeriesPoint>,
    pub countries: Ranking,
    pub unit: QuantityUnit,
    pub unit_products: Ranking,
    pub metrics: Metrics,
    pub trend: Vec<TrendRow>,
    pub trend_excluded_zero_base: usize,
    pub growth: Vec<GrowthRow>,
    /// `None` when the filtered relation has no products to choose from.
    pub product_drilldown: Option<Drilldown>,
    pub importer_drilldown: Option<Drilldown>,
}

impl DashboardView {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Run one full pass over `dataset`.
pub fn build_view(dataset: &Dataset, filter: &FilterSpec, selections: &ViewSelections) -> DashboardView {
    let records = analysis::apply(&dataset.records, filter);

    let product = pick(&records, GroupKey::Product, selections.product.as_deref());
    let importer = pick(&records, GroupKey::Importer, selections.importer.as_deref());
    let trend = analysis::growth_trend(&records);

    let view = DashboardView {
        company: dataset.company.clone(),
        filter: filter.clone(),
        top_importers: analysis::top_importers(&records),
        top_products: analysis::top_products(&records),
        monthly: analysis::monthly_totals(&records),
        countries: analysis::country_totals(&records),
        unit: selections.unit,
        unit_products: analysis::top_products_for_unit(&records, selections.unit),
        metrics: analysis::summarize(&records),
        growth: analysis::top_growth_products(&trend.rows, crate::domain::TOP_GROWTH),
        trend: trend.rows,
        trend_excluded_zero_base: trend.excluded_zero_base,
        product_drilldown: product.map(|p| analysis::product_drilldown(&records, &p)),
        importer_drilldown: importer.map(|i| analysis::importer_drilldown(&records, &i)),
        records,
    };

    debug!(
        company = %view.company,
        rows = view.records.len(),
        of = dataset.records.len(),
        excluded_zero_base = view.trend_excluded_zero_base,
        "dashboard pass"
    );
    view
}

/// Keep `wanted` if it is still selectable, otherwise fall back to the first choice.
fn pick(records: &[ShipmentRecord], key: GroupKey, wanted: Option<&str>) -> Option<String> {
    let choices = analysis::distinct_values(records, key);
    match wanted {
        Some(w) if choices.iter().any(|c| c == w) => Some(w.to_string()),
        _ => choices.into_iter().next(),
    }
}

/// Resolve the filter a config asks for, against the dataset's bounds.
///
/// Returns `None` for a dataset without records (no date bounds exist).
pub fn filter_from_config(dataset: &Dataset, config: &DashboardConfig) -> Option<FilterSpec> {
    let bounds = dataset.date_bounds()?;
    let range = DateRange::new(
        config.start.unwrap_or(bounds.start),
        config.end.unwrap_or(bounds.end),
    )
    .clamped_to(bounds);

    let importers = if config.all_importers {
        ImporterSelection::All
    } else if let Some(names) = &config.importers {
        ImporterSelection::only(names.iter().cloned())
    } else {
        let dated = analysis::filter_by_date(&dataset.records, range);
        FilterOptions::from_records(&dated).default_importers()
    };

    Some(
        FilterSpec::for_range(range)
            .with_importers(importers)
            .with_importer_country(config.importer_country.clone())
            .with_origin_country(config.origin_country.clone()),
    )
}

/// Outputs of a report run.
#[derive(Debug, Clone)]
pub struct ReportRun {
    pub dataset: Arc<Dataset>,
    pub view: DashboardView,
}

/// Load `company` through the cache and run one pass with the config's filters.
pub fn run_report<S: ShipmentSource>(
    cache: &DatasetCache<S>,
    company: &str,
    config: &DashboardConfig,
) -> Result<ReportRun, AppError> {
    let dataset = cache.get_or_load(company)?;

    let filter = filter_from_config(&dataset, config).ok_or_else(|| {
        AppError::new(
            3,
            format!("No readable shipment rows for company '{company}'."),
        )
    })?;

    let selections = ViewSelections {
        unit: config.unit,
        product: config.product.clone(),
        importer: config.drill_importer.clone(),
    };

    let view = build_view(&dataset, &filter, &selections);
    Ok(ReportRun { dataset, view })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use crate::domain::CountryFilter;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(date: NaiveDate, importer: &str, product: &str, value: f64) -> ShipmentRecord {
        ShipmentRecord {
            arrival_date: date.and_hms_opt(0, 0, 0).unwrap(),
            importer_name: importer.to_string(),
            importer_country: "India".to_string(),
            origin_country: "China".to_string(),
            product_details: product.to_string(),
            import_value_cif: Some(value),
            import_value_fob: None,
            quantity: Some(1.0),
            quantity_unit: "PCS".to_string(),
        }
    }

    fn dataset() -> Dataset {
        let mut records = Vec::new();
        for i in 0..7 {
            records.push(rec(day(2024, 1, 1 + i), &format!("Imp{i}"), "Valves", 100.0));
        }
        records.push(rec(day(2024, 2, 10), "Imp0", "Valves", 150.0));
        records.push(rec(day(2024, 2, 11), "Imp1", "Pipes", 10.0));
        Dataset {
            company: "WOM".to_string(),
            source: PathBuf::from("WOM.csv"),
            records,
            row_errors: Vec::new(),
            rows_read: 9,
        }
    }

    fn config() -> DashboardConfig {
        DashboardConfig {
            data_dir: PathBuf::from("data"),
            companies: Vec::new(),
            company: None,
            start: None,
            end: None,
            importers: None,
            all_importers: false,
            importer_country: CountryFilter::All,
            origin_country: CountryFilter::All,
            unit: QuantityUnit::Pcs,
            product: None,
            drill_importer: None,
            bar_width: 40,
            export_csv: None,
            export_json: None,
        }
    }

    #[test]
    fn default_filter_spans_bounds_and_picks_five_importers() {
        let ds = dataset();
        let filter = filter_from_config(&ds, &config()).unwrap();
        assert_eq!(filter.date_range, DateRange::new(day(2024, 1, 1), day(2024, 2, 11)));
        match &filter.importers {
            ImporterSelection::Only(set) => assert_eq!(set.len(), 5),
            ImporterSelection::All => panic!("expected default picks"),
        }
    }

    #[test]
    fn requested_dates_are_clamped_to_bounds() {
        let ds = dataset();
        let mut cfg = config();
        cfg.start = Some(day(2020, 1, 1));
        cfg.end = Some(day(2030, 1, 1));
        let filter = filter_from_config(&ds, &cfg).unwrap();
        assert_eq!(filter.date_range, DateRange::new(day(2024, 1, 1), day(2024, 2, 11)));
    }

    #[test]
    fn view_is_consistent_with_filter() {
        let ds = dataset();
        let mut cfg = config();
        cfg.all_importers = true;
        let filter = filter_from_config(&ds, &cfg).unwrap();
        let view = build_view(&ds, &filter, &ViewSelections::default());

        assert_eq!(view.metrics.shipments, 9);
        assert_eq!(view.metrics.importers, 7);
        assert_eq!(view.monthly.len(), 2);
        assert_eq!(view.top_importers[0].key, "Imp0");
        assert_eq!(view.unit_products[0].key, "Valves");
        assert_eq!(view.growth.len(), 1);
        assert_eq!(view.growth[0].product, "Valves");

        let product = view.product_drilldown.as_ref().unwrap();
        assert_eq!(product.key, "Valves");
        assert_eq!(product.total_value, 850.0);
    }

    #[test]
    fn stale_drilldown_selection_falls_back_to_first_choice() {
        let ds = dataset();
        let mut cfg = config();
        cfg.all_importers = true;
        let filter = filter_from_config(&ds, &cfg).unwrap();
        let selections = ViewSelections {
            unit: QuantityUnit::Kgs,
            product: Some("Pipes".to_string()),
            importer: Some("Ghost".to_string()),
        };
        let view = build_view(&ds, &filter, &selections);
        assert_eq!(view.product_drilldown.unwrap().key, "Pipes");
        assert_eq!(view.importer_drilldown.unwrap().key, "Imp0");
        assert!(view.unit_products.is_empty());
    }

    #[test]
    fn empty_selection_degrades_to_empty_view() {
        let ds = dataset();
        let mut cfg = config();
        cfg.importers = Some(Vec::new());
        let filter = filter_from_config(&ds, &cfg).unwrap();
        let view = build_view(&ds, &filter, &ViewSelections::default());

        assert!(view.is_empty());
        assert_eq!(view.metrics, Metrics::default());
        assert!(view.top_importers.is_empty());
        assert!(view.monthly.is_empty());
        assert!(view.growth.is_empty());
        assert!(view.product_drilldown.is_none());
        assert!(view.importer_drilldown.is_none());
    }
}
