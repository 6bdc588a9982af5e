//! Placement report writers.
//!
//! Two text formats share the header `Name\tWidth\tHeight\tX\tY`: the
//! modules table (tab separated, printed to stdout) and the plot data file
//! (space separated rows, read by the floorplan plotter).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use u_floorplan_core::{FloorplanSummary, Placement};

/// Header shared by the modules table and the plot file.
pub const REPORT_HEADER: &str = "Name\tWidth\tHeight\tX\tY";

/// Writes the tab-separated modules table.
pub fn write_modules_table<W: Write>(out: &mut W, placements: &[Placement]) -> io::Result<()> {
    writeln!(out, "{}", REPORT_HEADER)?;
    for p in placements {
        writeln!(out, "{}\t{}\t{}\t{}\t{}", p.name, p.width, p.height, p.x, p.y)?;
    }
    Ok(())
}

/// Writes plot data: the header, then `name width height x y` per module.
pub fn write_plot_data<W: Write>(out: &mut W, placements: &[Placement]) -> io::Result<()> {
    writeln!(out, "{}", REPORT_HEADER)?;
    for p in placements {
        writeln!(out, "{} {} {} {} {}", p.name, p.width, p.height, p.x, p.y)?;
    }
    Ok(())
}

/// Saves plot data to a file, replacing any previous contents.
pub fn save_plot_file(path: impl AsRef<Path>, placements: &[Placement]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_plot_data(&mut out, placements)?;
    out.flush()
}

/// Saves a result summary as pretty-printed JSON.
pub fn save_json(
    path: impl AsRef<Path>,
    summary: &FloorplanSummary,
) -> Result<(), crate::ParseError> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    Ok(())
}
