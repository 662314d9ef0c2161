//! Formatted terminal output for `shipdash report`.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use crate::app::pipeline::DashboardView;
use crate::data::Dataset;
use crate::domain::{Drilldown, GrowthRow, ImporterSelection, RankedRow, ShipmentRecord};
use crate::plot::{render_bar_chart, render_series_plot};

/// Number of shipment rows printed in the table section.
const TABLE_PREVIEW_ROWS: usize = 20;

/// Format every dashboard section as plain text.
pub fn format_report(dataset: &Dataset, view: &DashboardView, bar_width: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== shipdash - {} ===\n", view.company));
    out.push_str(&format_filter_summary(dataset, view));
    out.push('\n');

    out.push_str("Metrics and KPIs:\n");
    out.push_str(&format!("- Total Value: {}\n", fmt_amount(view.metrics.total_value)));
    out.push_str(&format!("- Number of Shipments: {}\n", view.metrics.shipments));
    out.push_str(&format!("- Number of Importers: {}\n", view.metrics.importers));
    out.push('\n');

    if view.is_empty() {
        out.push_str("No shipments match the current filters.\n");
        return out;
    }

    section(&mut out, "Top Importers by Value", &render_bar_chart(&view.top_importers, bar_width, fmt_amount));
    section(&mut out, "Top Products by Value", &render_bar_chart(&view.top_products, bar_width, fmt_amount));
    section(&mut out, "Total Value Over Time", &render_series_plot(&view.monthly, bar_width + 30, 12));
    section(&mut out, "Total Value by Importer Country", &render_bar_chart(&view.countries, bar_width, fmt_amount));

    let unit_title = format!("Quantity Analysis by Unit ({})", view.unit);
    if view.unit_products.is_empty() {
        section(
            &mut out,
            &unit_title,
            &format!("No data available for the selected unit: {}\n", view.unit),
        );
    } else {
        section(&mut out, &unit_title, &render_bar_chart(&view.unit_products, bar_width, fmt_quantity));
    }

    let mut trend = render_bar_chart(&growth_rows(&view.growth), bar_width, fmt_percent);
    if view.trend_excluded_zero_base > 0 {
        trend.push_str(&format!(
            "({} month(s) skipped: previous month total was zero)\n",
            view.trend_excluded_zero_base
        ));
    }
    section(&mut out, "Trend Analysis (average growth rate)", &trend);

    if let Some(d) = &view.product_drilldown {
        section(&mut out, "Product Details", &format_drilldown(d, "importers", bar_width));
    }
    if let Some(d) = &view.importer_drilldown {
        section(&mut out, "Importer Details", &format_drilldown(d, "products", bar_width));
    }

    section(&mut out, "Shipment Details", &format_table(&view.records, TABLE_PREVIEW_ROWS));
    out
}

fn section(out: &mut String, title: &str, body: &str) {
    out.push_str(&format!("{title}:\n"));
    out.push_str(body);
    out.push('\n');
}

fn format_filter_summary(dataset: &Dataset, view: &DashboardView) -> String {
    let mut out = String::new();
    let f = &view.filter;
    out.push_str(&format!("Source: {}\n", dataset.source.display()));
    out.push_str(&format!(
        "Rows: read={} | usable={} | skipped={}\n",
        dataset.rows_read,
        dataset.records.len(),
        dataset.row_errors.len()
    ));
    out.push_str(&format!("Dates: {}\n", f.date_range));
    let importers = match &f.importers {
        ImporterSelection::All => "all".to_string(),
        ImporterSelection::Only(set) if set.is_empty() => "(none selected)".to_string(),
        ImporterSelection::Only(set) => set.iter().cloned().collect::<Vec<_>>().join(", "),
    };
    out.push_str(&format!("Importers: {importers}\n"));
    out.push_str(&format!(
        "Importer country: {} | Exporter country: {}\n",
        f.importer_country.label(),
        f.origin_country.label()
    ));
    out
}

fn format_drilldown(d: &Drilldown, ranked: &str, bar_width: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total Value for {}: {}\n", d.key, fmt_amount(d.total_value)));
    out.push_str(&format!("Total Quantity for {}: {}\n", d.key, fmt_amount(d.total_quantity)));
    out.push_str(&format!("Top {ranked}:\n"));
    out.push_str(&render_bar_chart(&d.ranking, bar_width, fmt_amount));
    out
}

/// Fixed-width preview of the shipment table.
pub fn format_table(records: &[ShipmentRecord], max_rows: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<10} {:<24} {:<14} {:<14} {:<24} {:>14} {:>10} {:<6}",
            "date", "importer", "imp. country", "origin", "product", "total value", "quantity", "unit"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<10} {:-<24} {:-<14} {:-<14} {:-<24} {:->14} {:->10} {:-<6}",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in records.iter().take(max_rows) {
        out.push_str(
            format!(
                "{:<10} {:<24} {:<14} {:<14} {:<24} {:>14} {:>10} {:<6}",
                r.arrival_day(),
                truncate(&r.importer_name, 24),
                truncate(&r.importer_country, 14),
                truncate(&r.origin_country, 14),
                truncate(&r.product_details, 24),
                fmt_amount(r.total_value()),
                r.quantity.map(fmt_quantity).unwrap_or_default(),
                truncate(&r.quantity_unit, 6),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    if records.len() > max_rows {
        out.push_str(&format!("... {} more row(s)\n", records.len() - max_rows));
    }
    out
}

/// Growth rows as a ranking (product, mean growth) for the bar renderers.
pub fn growth_rows(growth: &[GrowthRow]) -> Vec<RankedRow> {
    growth
        .iter()
        .map(|g| RankedRow {
            key: g.product.clone(),
            value: g.mean_growth_rate,
        })
        .collect()
}

/// `1234567.891` -> `1,234,567.89`.
pub fn fmt_amount(v: f64) -> String {
    let raw = format!("{:.2}", v.abs());
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 && raw != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

pub fn fmt_quantity(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

pub fn fmt_percent(v: f64) -> String {
    format!("{v:+.1}%")
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use crate::app::pipeline::{ViewSelections, build_view};
    use crate::domain::{DateRange, FilterSpec};

    fn dataset() -> Dataset {
        let rec = |d: u32, importer: &str, value: f64| ShipmentRecord {
            arrival_date: NaiveDate::from_ymd_opt(2024, 1, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            importer_name: importer.to_string(),
            importer_country: "India".to_string(),
            origin_country: "China".to_string(),
            product_details: "Valves".to_string(),
            import_value_cif: Some(value),
            import_value_fob: None,
            quantity: Some(2.0),
            quantity_unit: "KGS".to_string(),
        };
        Dataset {
            company: "WOM".to_string(),
            source: PathBuf::from("data/WOM.csv"),
            records: vec![rec(1, "Acme", 1500.0), rec(2, "Beta", 250.5)],
            row_errors: Vec::new(),
            rows_read: 2,
        }
    }

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[test]
    fn amounts_use_thousands_separators() {
        assert_eq!(fmt_amount(0.0), "0.00");
        assert_eq!(fmt_amount(999.5), "999.50");
        assert_eq!(fmt_amount(1234567.891), "1,234,567.89");
        assert_eq!(fmt_amount(-1000.0), "-1,000.00");
    }

    #[test]
    fn percent_and_quantity_formats() {
        assert_eq!(fmt_percent(50.0), "+50.0%");
        assert_eq!(fmt_percent(-12.34), "-12.3%");
        assert_eq!(fmt_quantity(3.0), "3");
        assert_eq!(fmt_quantity(2.5), "2.50");
    }

    #[test]
    fn report_contains_every_section() {
        let ds = dataset();
        let view = build_view(&ds, &FilterSpec::for_range(range()), &ViewSelections::default());
        let txt = format_report(&ds, &view, 20);

        for title in [
            "Metrics and KPIs:",
            "Top Importers by Value:",
            "Top Products by Value:",
            "Total Value Over Time:",
            "Total Value by Importer Country:",
            "Quantity Analysis by Unit (PCS):",
            "Trend Analysis (average growth rate):",
            "Product Details:",
            "Importer Details:",
            "Shipment Details:",
        ] {
            assert!(txt.contains(title), "missing section {title}");
        }
        assert!(txt.contains("- Total Value: 1,750.50"));
        assert!(txt.contains("No data available for the selected unit: PCS"));
    }

    #[test]
    fn empty_view_says_so() {
        let ds = dataset();
        let filter = FilterSpec::for_range(range()).with_importers(ImporterSelection::only(Vec::<String>::new()));
        let view = build_view(&ds, &filter, &ViewSelections::default());
        let txt = format_report(&ds, &view, 20);
        assert!(txt.contains("Importers: (none selected)"));
        assert!(txt.contains("- Number of Shipments: 0"));
        assert!(txt.contains("No shipments match the current filters."));
        assert!(!txt.contains("Top Importers by Value:"));
    }

    #[test]
    fn table_preview_is_capped() {
        let ds = dataset();
        let txt = format_table(&ds.records, 1);
        assert_eq!(txt.lines().count(), 4);
        assert!(txt.ends_with("... 1 more row(s)\n"));
    }
}
