//! Company catalog: which companies the selector offers.
//!
//! Resolution order:
//! - an explicit list (`--companies` / `SHIPDASH_COMPANIES`)
//! - `*.csv` file stems found directly in the data directory (sorted)
//! - the built-in default list

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::domain::DEFAULT_COMPANIES;

/// Resolve the company list for a data directory.
pub fn resolve_companies(explicit: &[String], data_dir: &Path) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }

    let discovered = discover_companies(data_dir);
    if !discovered.is_empty() {
        debug!(count = discovered.len(), "discovered companies in {}", data_dir.display());
        return discovered;
    }

    DEFAULT_COMPANIES.iter().map(|s| s.to_string()).collect()
}

/// Split a comma-separated company list, dropping empty entries.
pub fn parse_company_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Company names derived from `*.csv` files in `data_dir` (deterministic order).
pub fn discover_companies(data_dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(data_dir) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let is_file = entry.file_type().map(|ft| ft.is_file()).unwrap_or(false);
        if !is_file || !has_csv_extension(&path) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            out.push(stem.to_string());
        }
    }

    out.sort();
    out
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        == Some(true)
}
