//! Input and output for the U-Floorplan annealer.
//!
//! This crate provides:
//! - Module-file parser (`<name> <area> <aspect_ratio>` per line)
//! - JSON annealing configuration loading
//! - Modules table, plot data file and JSON result writers

mod parser;
mod report;

pub use parser::{ModuleFileParser, ParseError};
pub use report::{
    save_json, save_plot_file, write_modules_table, write_plot_data, REPORT_HEADER,
};
