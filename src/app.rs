//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - resolves the company catalog
//! - runs the report or launches the TUI

use clap::Parser;
use tracing::info;

use crate::cli::{Command, CommonArgs, DashboardArgs, ReportArgs, TuiArgs};
use crate::data::{CsvDirectory, DatasetCache, loader::company_path, parse_company_list, resolve_companies};
use crate::domain::{CountryFilter, DashboardConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `shipdash` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is normal.
    dotenvy::dotenv().ok();

    // We want `shipdash` and `shipdash -c WOM` to behave like `shipdash tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Report(args) => handle_report(args),
        Command::Companies(args) => handle_companies(args),
    }
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    // The TUI owns the terminal; logging only happens when a file is given.
    if let Some(path) = &args.dashboard.common.log_file {
        crate::logging::init("warn", Some(path))?;
    }
    let config = config_from_args(&args.dashboard);
    crate::tui::run(config)
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    crate::logging::init("info", args.dashboard.common.log_file.as_deref())?;

    let mut config = config_from_args(&args.dashboard);
    config.bar_width = args.width;
    config.export_csv = args.export_csv.clone();
    config.export_json = args.export_json.clone();

    let company = match &config.company {
        Some(company) => company.clone(),
        None => {
            let companies = resolve_companies(&config.companies, &config.data_dir);
            crate::cli::picker::prompt_for_company(&companies)?
        }
    };

    let cache = DatasetCache::new(CsvDirectory::new(config.data_dir.clone()));
    let run = pipeline::run_report(&cache, &company, &config)?;

    println!(
        "{}",
        crate::report::format_report(&run.dataset, &run.view, config.bar_width)
    );

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::write_records_csv(path, &run.view.records)?;
    }
    if let Some(path) = &config.export_json {
        crate::io::write_view_json(path, &run.view)?;
    }

    Ok(())
}

fn handle_companies(args: CommonArgs) -> Result<(), AppError> {
    crate::logging::init("info", args.log_file.as_deref())?;

    let explicit = args
        .companies
        .as_deref()
        .map(parse_company_list)
        .unwrap_or_default();
    let companies = resolve_companies(&explicit, &args.data_dir);
    info!(count = companies.len(), data_dir = %args.data_dir.display(), "resolved companies");

    for company in &companies {
        let path = company_path(&args.data_dir, company);
        if path.is_file() {
            println!("{company}");
        } else {
            println!("{company} (missing: {})", path.display());
        }
    }
    Ok(())
}

pub fn config_from_args(args: &DashboardArgs) -> DashboardConfig {
    DashboardConfig {
        data_dir: args.common.data_dir.clone(),
        companies: args
            .common
            .companies
            .as_deref()
            .map(parse_company_list)
            .unwrap_or_default(),
        company: args.company.clone(),
        start: args.start,
        end: args.end,
        importers: if args.importers.is_empty() {
            None
        } else {
            Some(args.importers.clone())
        },
        all_importers: args.all_importers,
        importer_country: CountryFilter::from_label(&args.importer_country),
        origin_country: CountryFilter::from_label(&args.origin_country),
        unit: args.unit,
        product: args.product.clone(),
        drill_importer: args.drill_importer.clone(),
        bar_width: 40,
        export_csv: None,
        export_json: None,
    }
}

/// Rewrite argv so `shipdash` defaults to `shipdash tui`.
///
/// Rules:
/// - `shipdash`                      -> `shipdash tui`
/// - `shipdash -c WOM ...`           -> `shipdash tui -c WOM ...`
/// - `shipdash --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "report" | "companies");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
