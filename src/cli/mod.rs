//! Command-line parsing for the shipment dashboard.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! loading and aggregation code. Everything parsed here is resolved into a
//! `DashboardConfig` by `app::config_from_args`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::QuantityUnit;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "shipdash", version, about = "Shipment data dashboard (per-company CSV files)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard (default).
    Tui(TuiArgs),
    /// Print every dashboard section as text, and optionally export.
    Report(ReportArgs),
    /// List the companies found in the data directory.
    Companies(CommonArgs),
}

/// Where the data lives.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Directory holding one `<company>.csv` per company.
    #[arg(long, env = "SHIPDASH_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Comma-separated company list (skips discovery).
    #[arg(long, env = "SHIPDASH_COMPANIES", value_name = "A,B,...")]
    pub companies: Option<String>,

    /// Append logs to this file.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Filters and selections shared by the TUI and the report.
#[derive(Debug, Args, Clone)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Company to open.
    #[arg(short = 'c', long)]
    pub company: Option<String>,

    /// First arrival day (YYYY-MM-DD); defaults to the earliest in the data.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: Option<NaiveDate>,

    /// Last arrival day (YYYY-MM-DD); defaults to the latest in the data.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: Option<NaiveDate>,

    /// Importer to include (repeatable). Without it the first five are used.
    #[arg(long = "importer", value_name = "NAME")]
    pub importers: Vec<String>,

    /// Do not filter on importer at all.
    #[arg(long, conflicts_with = "importers")]
    pub all_importers: bool,

    /// Importer country, or "All".
    #[arg(long, default_value = "All")]
    pub importer_country: String,

    /// Country of origin, or "All".
    #[arg(long, default_value = "All")]
    pub origin_country: String,

    /// Quantity unit for the unit analysis.
    #[arg(long, value_enum, ignore_case = true, default_value_t = QuantityUnit::Pcs)]
    pub unit: QuantityUnit,

    /// Product for the product drill-down.
    #[arg(long)]
    pub product: Option<String>,

    /// Importer for the importer drill-down.
    #[arg(long)]
    pub drill_importer: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub dashboard: DashboardArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub dashboard: DashboardArgs,

    /// Bar chart width (columns).
    #[arg(long, default_value_t = 40)]
    pub width: usize,

    /// Export the filtered shipments to CSV.
    #[arg(long, value_name = "PATH")]
    pub export_csv: Option<PathBuf>,

    /// Export the whole dashboard pass to JSON.
    #[arg(long, value_name = "PATH")]
    pub export_json: Option<PathBuf>,
}
