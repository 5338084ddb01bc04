//! CSV table writing.
//!
//! Values are rounded to three decimals; missing values become empty cells.

use std::fs;
use std::io::Write;
use std::path::Path;

use verify_common::VerifyResult;

/// Format one numeric cell. NaN is written as an empty cell.
pub fn fmt_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{value:.3}")
    }
}

/// A labelled row: the first column is a string, the rest are numeric.
pub fn row(label: &str, values: &[f64]) -> Vec<String> {
    let mut cells = Vec::with_capacity(values.len() + 1);
    cells.push(label.to_string());
    cells.extend(values.iter().map(|&v| fmt_cell(v)));
    cells
}

/// Write a table to `path`, creating parent directories on demand.
pub fn write_table(path: &Path, header: &[String], rows: &[Vec<String>]) -> VerifyResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = fs::File::create(path)?;
    writeln!(out, "{}", header.join(","))?;
    for r in rows {
        writeln!(out, "{}", r.join(","))?;
    }
    Ok(())
}
