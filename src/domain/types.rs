//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during filtering and aggregation
//! - exported to JSON/CSV
//! - rendered by the TUI and the text report without extra conversion

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Companies offered when no explicit list is configured and the data
/// directory contains no CSV files to discover.
pub const DEFAULT_COMPANIES: [&str; 5] = ["Sayatva", "Sri Energy", "WOM", "Parveen", "JVS"];

/// Length of the importer and product rankings.
pub const TOP_RANKING: usize = 10;

/// Length of drill-down and unit-scoped rankings.
pub const TOP_DRILLDOWN: usize = 5;

/// Number of products shown in the growth trend.
pub const TOP_GROWTH: usize = 5;

/// Importers pre-selected when the importer options change.
pub const DEFAULT_IMPORTER_PICKS: usize = 5;

/// Quantity units offered by the unit selector.
///
/// Source files carry free-form labels; `canonical_unit_label` maps the legacy
/// `Pieces` label onto `PCS` before any comparison against this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
#[value(rename_all = "UPPER")]
pub enum QuantityUnit {
    Pcs,
    Nos,
    Set,
    Pkg,
    Fts,
    Kgs,
    Inc,
    Meter,
    Wdc,
}

impl QuantityUnit {
    pub const ALL: [QuantityUnit; 9] = [
        QuantityUnit::Pcs,
        QuantityUnit::Nos,
        QuantityUnit::Set,
        QuantityUnit::Pkg,
        QuantityUnit::Fts,
        QuantityUnit::Kgs,
        QuantityUnit::Inc,
        QuantityUnit::Meter,
        QuantityUnit::Wdc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuantityUnit::Pcs => "PCS",
            QuantityUnit::Nos => "NOS",
            QuantityUnit::Set => "SET",
            QuantityUnit::Pkg => "PKG",
            QuantityUnit::Fts => "FTS",
            QuantityUnit::Kgs => "KGS",
            QuantityUnit::Inc => "INC",
            QuantityUnit::Meter => "METER",
            QuantityUnit::Wdc => "WDC",
        }
    }

    /// Resolve a (canonicalized) source label to a selector unit.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = canonical_unit_label(label);
        Self::ALL.into_iter().find(|u| u.as_str() == label)
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|u| *u == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|u| *u == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for QuantityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical form of a quantity-unit label (`Pieces` becomes `PCS`).
pub fn canonical_unit_label(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("pieces") {
        return QuantityUnit::Pcs.as_str().to_string();
    }
    trimmed.to_string()
}

/// One shipment row of a company's dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    /// Arrival timestamp. Sources usually carry a plain date (midnight).
    pub arrival_date: NaiveDateTime,
    pub importer_name: String,
    pub importer_country: String,
    pub origin_country: String,
    pub product_details: String,
    pub import_value_cif: Option<f64>,
    pub import_value_fob: Option<f64>,
    pub quantity: Option<f64>,
    /// Canonicalized unit label (see `canonical_unit_label`).
    pub quantity_unit: String,
}

impl ShipmentRecord {
    /// `coalesce(cif, 0) + coalesce(fob, 0)`; always defined.
    pub fn total_value(&self) -> f64 {
        self.import_value_cif.unwrap_or(0.0) + self.import_value_fob.unwrap_or(0.0)
    }

    /// Date-only part of the arrival timestamp.
    pub fn arrival_day(&self) -> NaiveDate {
        self.arrival_date.date()
    }

    pub fn quantity_or_zero(&self) -> f64 {
        self.quantity.unwrap_or(0.0)
    }
}

/// Inclusive date range on arrival days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Inclusive on both ends. A reversed range contains nothing.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Clamp both ends into `bounds` (the dataset's observed min/max).
    pub fn clamped_to(self, bounds: DateRange) -> Self {
        Self {
            start: self.start.clamp(bounds.start, bounds.end),
            end: self.end.clamp(bounds.start, bounds.end),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// Importer predicate.
///
/// `Only` uses plain membership: an empty set admits no importer at all.
/// `All` disables the predicate and is only produced on explicit request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImporterSelection {
    All,
    Only(BTreeSet<String>),
}

impl ImporterSelection {
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ImporterSelection::Only(names.into_iter().map(Into::into).collect())
    }

    pub fn admits(&self, importer: &str) -> bool {
        match self {
            ImporterSelection::All => true,
            ImporterSelection::Only(names) => names.contains(importer),
        }
    }
}

/// Exact-match country filter with an "All" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountryFilter {
    #[default]
    All,
    Only(String),
}

impl CountryFilter {
    pub const ALL_LABEL: &'static str = "All";

    /// `"All"` maps to the sentinel; anything else is an exact match.
    pub fn from_label(label: &str) -> Self {
        if label == Self::ALL_LABEL {
            CountryFilter::All
        } else {
            CountryFilter::Only(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            CountryFilter::All => Self::ALL_LABEL,
            CountryFilter::Only(name) => name,
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            CountryFilter::All => true,
            CountryFilter::Only(name) => name == value,
        }
    }
}

/// Immutable conjunction of filter predicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub date_range: DateRange,
    pub importers: ImporterSelection,
    pub importer_country: CountryFilter,
    pub origin_country: CountryFilter,
}

impl FilterSpec {
    /// Only a date predicate; every other field passes everything.
    pub fn for_range(date_range: DateRange) -> Self {
        Self {
            date_range,
            importers: ImporterSelection::All,
            importer_country: CountryFilter::All,
            origin_country: CountryFilter::All,
        }
    }

    pub fn with_importers(mut self, importers: ImporterSelection) -> Self {
        self.importers = importers;
        self
    }

    pub fn with_importer_country(mut self, country: CountryFilter) -> Self {
        self.importer_country = country;
        self
    }

    pub fn with_origin_country(mut self, country: CountryFilter) -> Self {
        self.origin_country = country;
        self
    }
}

/// One `(key, value)` row of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    pub key: String,
    pub value: f64,
}

/// Rows sorted descending by value, truncated to the requested length.
pub type Ranking = Vec<RankedRow>;

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
}

impl MonthBucket {
    pub fn of(day: NaiveDate) -> Self {
        Self {
            year: day.year(),
            month: day.month(),
        }
    }

    /// Last calendar day of the month (the bucket's label).
    pub fn last_day(self) -> NaiveDate {
        let (y, m) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(y, m, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or_default()
    }
}

impl fmt::Display for MonthBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Total value for one populated month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub bucket: MonthBucket,
    pub month_end: NaiveDate,
    pub total_value: f64,
}

/// Growth of one product between two consecutive populated months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRow {
    pub bucket: MonthBucket,
    pub product: String,
    pub total_value: f64,
    pub previous_value: f64,
    /// Percent change against `previous_value`.
    pub growth_rate: f64,
}

/// Mean growth of one product across its trend rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRow {
    pub product: String,
    pub mean_growth_rate: f64,
    pub periods: usize,
}

/// Scalar KPIs over a relation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    pub total_value: f64,
    pub shipments: usize,
    pub importers: usize,
}

/// A view scoped to one product or one importer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drilldown {
    pub key: String,
    pub total_value: f64,
    pub total_quantity: f64,
    pub ranking: Ranking,
}

/// Resolved runtime configuration (CLI flags + environment + defaults).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    /// Explicit company list; empty means "discover from `data_dir`".
    pub companies: Vec<String>,
    pub company: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Explicit importer picks; `None` means the default first five.
    pub importers: Option<Vec<String>>,
    pub all_importers: bool,
    pub importer_country: CountryFilter,
    pub origin_country: CountryFilter,
    pub unit: QuantityUnit,
    pub product: Option<String>,
    pub drill_importer: Option<String>,
    pub bar_width: usize,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}
