//! `shipdash` library crate.
//!
//! The binary (`shipdash`) is a thin wrapper around this library so that:
//!
//! - loading, filtering and aggregation are testable without spawning processes
//! - the report and the TUI share one dashboard pass (`app::pipeline`)
//! - code stays easy to navigate as the project grows

pub mod analysis;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod tui;
