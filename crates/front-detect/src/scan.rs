//! Per-row leading-edge scan.

use crate::{DetectGrid, FieldSlice};

/// Front position candidates for every sub-domain row.
///
/// Scans east to west, inset by half the gradient distance so the neighbor
/// check stays inside the computed region. A cell wins when it beats the
/// running maximum, exceeds the threshold, and one of its neighbors at half
/// the gradient distance also exceeds it (a lone strong column is noise).
/// Rows with no winner get a NaN longitude and the latitude of the row's
/// first column. NaN cells never qualify.
pub fn scan_rows(
    filtered: &FieldSlice,
    lats: &[f64],
    lons: &[f64],
    grid: &DetectGrid,
) -> (Vec<f64>, Vec<f64>) {
    let nx = filtered.nx;
    let spacer = grid.gradient_distance / 2;
    let eastern = (grid.east - grid.gradient_distance).saturating_sub(spacer);
    let western = grid.west + spacer;

    let mut front_lons = Vec::with_capacity(grid.north - grid.south);
    let mut front_lats = Vec::with_capacity(grid.north - grid.south);

    for row in grid.south..grid.north {
        let mut max_change = 0.0;
        let mut found_col = None;
        let mut col = eastern;
        while col > western {
            let v = filtered.at(row, col);
            if v > max_change
                && v > grid.threshold
                && (filtered.at(row, col - spacer) > grid.threshold
                    || filtered.at(row, col + spacer) > grid.threshold)
            {
                max_change = v;
                found_col = Some(col);
            }
            col -= 1;
        }
        match found_col {
            Some(c) => {
                front_lons.push(lons[row * nx + c]);
                front_lats.push(lats[row * nx + c]);
            }
            None => {
                front_lons.push(f64::NAN);
                front_lats.push(lats[row * nx]);
            }
        }
    }
    (front_lons, front_lats)
}
