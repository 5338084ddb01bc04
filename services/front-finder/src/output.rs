//! CSV output for detection runs.
//!
//! The per-run front table has one row per sub-domain row (south to north)
//! with the row latitude and one longitude column per time step; missing
//! front points are empty cells. Field dumps mirror the grid row-major with
//! `nan` for erased cells.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use front_detect::FieldSlice;
use verify_common::{case_dir_name, VerifyResult};

/// `SBF_<case>_<configuration>.csv` under the output directory.
pub fn front_table_path(output_dir: &Path, case: &str, configuration: &str) -> PathBuf {
    output_dir.join(format!(
        "SBF_{}_{configuration}.csv",
        case_dir_name(case)
    ))
}

/// Path of a per-step 2-D field dump, `kind` being `front` or `theta`.
pub fn field_dump_path(
    output_dir: &Path,
    kind: &str,
    case: &str,
    configuration: &str,
    step: usize,
) -> PathBuf {
    output_dir.join(format!(
        "2D_{kind}_{}_{configuration}_{step}.csv",
        case_dir_name(case)
    ))
}

fn fmt_lon(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{value:.6}")
    }
}

/// Write the front table: `LATITUDE` plus one labelled column per step.
/// `columns[k][r]` is step `k`'s front longitude on sub-domain row `r`.
pub fn write_front_table(
    path: &Path,
    labels: &[String],
    lats: &[f64],
    columns: &[Vec<f64>],
) -> VerifyResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = fs::File::create(path)?;
    writeln!(out, "LATITUDE,{}", labels.join(","))?;
    for (r, &lat) in lats.iter().enumerate() {
        let cells: Vec<String> = columns.iter().map(|col| fmt_lon(col[r])).collect();
        writeln!(out, "{lat:.6},{}", cells.join(","))?;
    }
    Ok(())
}

/// Dump one 2-D field row-major, `nan` for missing cells.
pub fn dump_field(path: &Path, field: &FieldSlice) -> VerifyResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = fs::File::create(path)?;
    for j in 0..field.ny {
        let cells: Vec<String> = (0..field.nx)
            .map(|i| {
                let v = field.at(j, i);
                if v.is_nan() {
                    "nan".to_string()
                } else {
                    format!("{v:.6}")
                }
            })
            .collect();
        writeln!(out, "{}", cells.join(","))?;
    }
    Ok(())
}
