//! Nugget coarsening of a potential-temperature slice.

use crate::{DetectGrid, FieldSlice};

/// Blocky spatial smoothing over the analysis sub-domain.
///
/// Walks the sub-domain on a `cell_size` stride, averages the nugget
/// (the `2*cell_size + 1` square) around each stride point, and splats the
/// average back over the same square. Overlapping splats overwrite west to
/// east, south to north. Cells the stride never touches stay NaN.
///
/// `cell_size == 0` degenerates to the identity over the sub-domain.
pub fn coarsen(theta: &FieldSlice, grid: &DetectGrid) -> FieldSlice {
    let (ny, nx) = (theta.ny, theta.nx);
    let cs = grid.cell_size as i64;
    let mut out = FieldSlice::filled(ny, nx, f64::NAN);

    let mut j = grid.south;
    while j < grid.north {
        let mut i = grid.west;
        while i < grid.east {
            let avg = nugget_average(theta, j, i, cs);
            for dj in -cs..=cs {
                for di in -cs..=cs {
                    let jj = j as i64 + dj;
                    let ii = i as i64 + di;
                    if jj >= 0 && ii >= 0 && (jj as usize) < ny && (ii as usize) < nx {
                        out.set(jj as usize, ii as usize, avg);
                    }
                }
            }
            i += grid.cell_size.max(1);
        }
        j += grid.cell_size.max(1);
    }
    out
}

fn nugget_average(theta: &FieldSlice, j: usize, i: usize, cs: i64) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for dj in -cs..=cs {
        for di in -cs..=cs {
            let jj = j as i64 + dj;
            let ii = i as i64 + di;
            if jj < 0 || ii < 0 || jj as usize >= theta.ny || ii as usize >= theta.nx {
                continue;
            }
            let v = theta.at(jj as usize, ii as usize);
            if v.is_nan() {
                continue;
            }
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}
