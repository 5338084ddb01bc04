//! Directional potential-temperature gradient.

use crate::{DetectGrid, FieldSlice};

/// West-to-east theta drop per kilometre.
///
/// For each sub-domain cell, `(f[row][col] - f[row][col + gd]) / gd *
/// resolution` with `gd` the gradient distance in cells. Positive where
/// theta falls towards the east, the signature of marine air moving inland
/// from an eastern shore. Cells outside the computable region are NaN.
pub fn gradient(theta: &FieldSlice, grid: &DetectGrid) -> FieldSlice {
    let mut out = FieldSlice::filled(theta.ny, theta.nx, f64::NAN);
    let gd = grid.gradient_distance;
    for row in grid.south..grid.north {
        for col in grid.west..grid.east.saturating_sub(gd) {
            let g = (theta.at(row, col) - theta.at(row, col + gd)) / gd as f64
                * grid.resolution_km;
            out.set(row, col, g);
        }
    }
    out
}

/// Copy of a gradient field with everything below the detection threshold
/// replaced by NaN.
pub fn apply_threshold(gradient: &FieldSlice, threshold: f64) -> FieldSlice {
    let data = gradient
        .data
        .iter()
        .map(|&g| if g >= threshold { g } else { f64::NAN })
        .collect();
    FieldSlice {
        ny: gradient.ny,
        nx: gradient.nx,
        data,
    }
}
