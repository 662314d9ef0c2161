//! Plain-text charts for the report command.

pub mod ascii;

pub use ascii::*;
