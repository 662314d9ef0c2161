//! Reporting utilities: plain-text rendering of a dashboard pass.

pub mod format;

pub use format::{fmt_amount, fmt_percent, fmt_quantity, format_report, format_table, growth_rows, truncate};
