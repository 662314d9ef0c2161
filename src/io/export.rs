//! Export the filtered shipment table to CSV.
//!
//! Column names follow the source files so an export can be loaded back as a
//! company dataset; `TOTAL VALUE` is appended. A time of day is written only
//! when it is not midnight.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveTime;
use tracing::info;

use crate::domain::ShipmentRecord;
use crate::error::AppError;

const HEADER: [&str; 10] = [
    "ARRIVAL DATE",
    "IMPORTER NAME",
    "IMPORTER COUNTRY",
    "COUNTRY OF ORIGIN",
    "PRODUCT DETAILS",
    "IMPORT VALUE CIF",
    "IMPORT VALUE FOB",
    "QUANTITY",
    "QUANTITY UNIT",
    "TOTAL VALUE",
];

/// Write the filtered relation to a CSV file.
pub fn write_records_csv(path: &Path, records: &[ShipmentRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_records(file, records)?;
    info!(rows = records.len(), "exported {}", path.display());
    Ok(())
}

pub fn write_records<W: Write>(out: W, records: &[ShipmentRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);

    writer
        .write_record(HEADER)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in records {
        let date = if r.arrival_date.time() == NaiveTime::MIN {
            r.arrival_date.format("%d/%m/%Y").to_string()
        } else {
            r.arrival_date.format("%d/%m/%Y %H:%M:%S").to_string()
        };
        writer
            .write_record([
                date.as_str(),
                &r.importer_name,
                &r.importer_country,
                &r.origin_country,
                &r.product_details,
                &opt_num(r.import_value_cif),
                &opt_num(r.import_value_fob),
                &opt_num(r.quantity),
                &r.quantity_unit,
                &r.total_value().to_string(),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

fn opt_num(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}
