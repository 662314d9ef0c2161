//! Write a dashboard pass to JSON.
//!
//! The snapshot is the "portable" representation of what the dashboard showed:
//! - the filter that produced it
//! - every ranking, series, trend and KPI
//! - the filtered shipment rows

use std::fs::File;
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::info;

use crate::app::pipeline::DashboardView;
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct ViewSnapshot<'a> {
    pub tool: &'static str,
    pub generated: NaiveDateTime,
    #[serde(flatten)]
    pub view: &'a DashboardView,
}

impl<'a> ViewSnapshot<'a> {
    pub fn new(view: &'a DashboardView) -> Self {
        Self {
            tool: "shipdash",
            generated: Local::now().naive_local(),
            view,
        }
    }
}

/// Write a JSON snapshot of `view`.
pub fn write_view_json(path: &Path, view: &DashboardView) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create snapshot JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &ViewSnapshot::new(view))
        .map_err(|e| AppError::new(2, format!("Failed to write snapshot JSON: {e}")))?;

    info!("wrote snapshot {}", path.display());
    Ok(())
}
