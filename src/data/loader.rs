//! CSV ingest for per-company shipment files.
//!
//! This module turns `<data_dir>/<company>.csv` into a `Dataset` of typed
//! `ShipmentRecord`s.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors, nothing guessed)
//! - **Row-level reporting** (skip rows that cannot be read, but report them)
//! - **No cleaning**: values are taken as given apart from the `Pieces` unit alias

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{DateRange, ShipmentRecord, canonical_unit_label};
use crate::error::LoadError;

pub const COL_ARRIVAL_DATE: &str = "arrival date";
pub const COL_IMPORTER_NAME: &str = "importer name";
pub const COL_IMPORTER_COUNTRY: &str = "importer country";
pub const COL_ORIGIN_COUNTRY: &str = "country of origin";
pub const COL_PRODUCT_DETAILS: &str = "product details";
pub const COL_VALUE_CIF: &str = "import value cif";
pub const COL_VALUE_FOB: &str = "import value fob";
pub const COL_QUANTITY: &str = "quantity";
pub const COL_QUANTITY_UNIT: &str = "quantity unit";

const REQUIRED_COLUMNS: [&str; 9] = [
    COL_ARRIVAL_DATE,
    COL_IMPORTER_NAME,
    COL_IMPORTER_COUNTRY,
    COL_ORIGIN_COUNTRY,
    COL_PRODUCT_DETAILS,
    COL_VALUE_CIF,
    COL_VALUE_FOB,
    COL_QUANTITY,
    COL_QUANTITY_UNIT,
];

/// A row that could not be turned into a record.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// One company's full relation plus ingest bookkeeping.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub company: String,
    pub source: PathBuf,
    pub records: Vec<ShipmentRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl Dataset {
    /// Observed min/max arrival day, `None` when there are no records.
    pub fn date_bounds(&self) -> Option<DateRange> {
        let mut days = self.records.iter().map(ShipmentRecord::arrival_day);
        let first = days.next()?;
        let (min, max) = days.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(DateRange::new(min, max))
    }

    pub fn total_value(&self) -> f64 {
        self.records.iter().map(ShipmentRecord::total_value).sum()
    }
}

/// Path of a company's CSV inside `data_dir`.
pub fn company_path(data_dir: &Path, company: &str) -> PathBuf {
    data_dir.join(format!("{company}.csv"))
}

/// Load `<data_dir>/<company>.csv`.
pub fn load_company(data_dir: &Path, company: &str) -> Result<Dataset, LoadError> {
    let path = company_path(data_dir, company);
    if !path.is_file() {
        return Err(LoadError::DataNotFound {
            company: company.to_string(),
            path,
        });
    }

    let file = File::open(&path).map_err(|source| LoadError::Io {
        path: path.clone(),
        source,
    })?;

    let dataset = read_dataset(company, &path, file)?;
    info!(
        company = %company,
        rows = dataset.records.len(),
        skipped = dataset.row_errors.len(),
        "loaded {}",
        path.display()
    );
    Ok(dataset)
}

/// Parse CSV content from any reader. `path` is only used for messages.
pub fn read_dataset<R: Read>(company: &str, path: &Path, input: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let header_map = build_header_map(&headers);
    for column in REQUIRED_COLUMNS {
        if !header_map.contains_key(column) {
            return Err(LoadError::MissingColumn {
                column,
                path: path.to_path_buf(),
            });
        }
    }

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1 and lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &header_map));

        match parsed {
            Ok(record) => records.push(record),
            Err(message) => {
                warn!(company = %company, line, "skipping row: {message}");
                row_errors.push(RowError { line, message });
            }
        }
    }

    Ok(Dataset {
        company: company.to_string(),
        source: path.to_path_buf(),
        records,
        row_errors,
        rows_read,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<ShipmentRecord, String> {
    let arrival_date = parse_arrival(get_required(record, header_map, COL_ARRIVAL_DATE)?)?;
    let importer_name = get_required(record, header_map, COL_IMPORTER_NAME)?.to_string();

    Ok(ShipmentRecord {
        arrival_date,
        importer_name,
        importer_country: get_text(record, header_map, COL_IMPORTER_COUNTRY),
        origin_country: get_text(record, header_map, COL_ORIGIN_COUNTRY),
        product_details: get_text(record, header_map, COL_PRODUCT_DETAILS),
        import_value_cif: parse_opt_f64(get_optional(record, header_map, COL_VALUE_CIF)),
        import_value_fob: parse_opt_f64(get_optional(record, header_map, COL_VALUE_FOB)),
        quantity: parse_opt_f64(get_optional(record, header_map, COL_QUANTITY)),
        quantity_unit: canonical_unit_label(&get_text(record, header_map, COL_QUANTITY_UNIT)),
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    get_optional(record, header_map, name).ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn get_text(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> String {
    get_optional(record, header_map, name).unwrap_or_default().to_string()
}

/// Parse a day-first arrival date, optionally followed by a time of day.
///
/// `03/04/2024` is 3 April 2024. ISO dates (`2024-04-03`) are also accepted
/// since they are unambiguous. Two-digit years follow chrono's `%y` pivot:
/// `03/04/24` is 3 April 2024, `03/04/85` is 3 April 1985.
pub fn parse_arrival(s: &str) -> Result<NaiveDateTime, String> {
    const DATE_FMTS: [&str; 6] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d-%b-%Y", "%d %b %Y", "%Y-%m-%d"];
    const SHORT_YEAR_FMTS: [&str; 5] = ["%d/%m/%y", "%d-%m-%y", "%d.%m.%y", "%d-%b-%y", "%d %b %y"];
    const TIME_FMTS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

    let s = s.trim();
    let (date_part, time_part) = split_time(s);

    // `%Y` also takes one to three digits (`24` reads as year 24); those are
    // left to the two-digit formats.
    let date = DATE_FMTS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .find(|d| d.year() >= 1000)
        .or_else(|| {
            SHORT_YEAR_FMTS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        })
        .ok_or_else(|| {
            format!("Invalid date '{s}'. Expected a day-first date such as DD/MM/YYYY, DD/MM/YY or YYYY-MM-DD.")
        })?;

    let time = match time_part {
        None => NaiveTime::MIN,
        Some(t) => TIME_FMTS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(t, fmt).ok())
            .ok_or_else(|| format!("Invalid time of day in '{s}'."))?,
    };

    Ok(date.and_time(time))
}

fn split_time(s: &str) -> (&str, Option<&str>) {
    // `DD Mon YYYY` contains spaces itself, so split on the last space only
    // when what follows looks like a clock time.
    if let Some((head, tail)) = s.rsplit_once(|c: char| c == ' ' || c == 'T') {
        if tail.contains(':') {
            return (head.trim(), Some(tail.trim()));
        }
    }
    (s, None)
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let s = s?.replace(',', "");
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}
