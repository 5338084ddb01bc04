//! Connected-component filtering of thresholded gradient fields.

use crate::{DetectGrid, FieldSlice};

/// Erase clusters too small or too degenerate to be a front.
///
/// Non-NaN cells are labeled into 8-connected components. A component is
/// wiped to NaN when its pixel area is below `min_area` or when the major
/// axis of its moment-equivalent ellipse has zero length (an isolated
/// pixel). Everything else passes through untouched.
pub fn filter_clusters(field: &FieldSlice, grid: &DetectGrid) -> FieldSlice {
    let mut out = field.clone();
    let (ny, nx) = (field.ny, field.nx);
    let mut labels = vec![0u32; ny * nx];
    let mut next_label = 1u32;

    for start in 0..ny * nx {
        if field.data[start].is_nan() || labels[start] != 0 {
            continue;
        }
        let component = flood(field, &mut labels, start, next_label);
        next_label += 1;

        let erase = component.len() < grid.min_area || major_axis_length(&component, nx) == 0.0;
        if erase {
            for &idx in &component {
                out.data[idx] = f64::NAN;
            }
        }
    }
    out
}

/// BFS over the 8-neighborhood from `start`, labeling as it goes. Returns
/// the flat indices of the component.
fn flood(field: &FieldSlice, labels: &mut [u32], start: usize, label: u32) -> Vec<usize> {
    let (ny, nx) = (field.ny, field.nx);
    let mut queue = vec![start];
    let mut component = Vec::new();
    labels[start] = label;
    while let Some(idx) = queue.pop() {
        component.push(idx);
        let (j, i) = (idx / nx, idx % nx);
        for dj in -1i64..=1 {
            for di in -1i64..=1 {
                if dj == 0 && di == 0 {
                    continue;
                }
                let jj = j as i64 + dj;
                let ii = i as i64 + di;
                if jj < 0 || ii < 0 || jj as usize >= ny || ii as usize >= nx {
                    continue;
                }
                let nidx = jj as usize * nx + ii as usize;
                if labels[nidx] == 0 && !field.data[nidx].is_nan() {
                    labels[nidx] = label;
                    queue.push(nidx);
                }
            }
        }
    }
    component
}

/// Major axis length of the ellipse with the same second central moments
/// as the pixel set: `sqrt(8 * (a + c + sqrt(4b^2 + (a - c)^2)))` over the
/// normalized moments. Zero for a single pixel.
fn major_axis_length(component: &[usize], nx: usize) -> f64 {
    let n = component.len() as f64;
    let (mut cj, mut ci) = (0.0, 0.0);
    for &idx in component {
        cj += (idx / nx) as f64;
        ci += (idx % nx) as f64;
    }
    cj /= n;
    ci /= n;

    let (mut a, mut b, mut c) = (0.0, 0.0, 0.0);
    for &idx in component {
        let dj = (idx / nx) as f64 - cj;
        let di = (idx % nx) as f64 - ci;
        a += di * di;
        b += di * dj;
        c += dj * dj;
    }
    a /= n;
    b /= n;
    c /= n;

    (8.0 * (a + c + (4.0 * b * b + (a - c) * (a - c)).sqrt())).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(min_area: usize) -> DetectGrid {
        DetectGrid {
            level: 0,
            resolution_km: 1.0,
            cell_size: 0,
            gradient_distance: 2,
            west: 0,
            east: 8,
            south: 0,
            north: 8,
            threshold: 1.0,
            min_area,
        }
    }

    fn field_from(cells: &[(usize, usize)], ny: usize, nx: usize) -> FieldSlice {
        let mut f = FieldSlice::filled(ny, nx, f64::NAN);
        for &(j, i) in cells {
            f.set(j, i, 2.0);
        }
        f
    }

    #[test]
    fn isolated_pixel_is_erased() {
        let f = field_from(&[(3, 3)], 8, 8);
        let out = filter_clusters(&f, &grid(1));
        assert!(out.at(3, 3).is_nan());
    }

    #[test]
    fn small_cluster_below_min_area_is_erased() {
        let f = field_from(&[(1, 1), (1, 2), (2, 1)], 8, 8);
        let out = filter_clusters(&f, &grid(5));
        assert!(out.data.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn elongated_cluster_survives() {
        let cells: Vec<_> = (0..6).map(|j| (j, 4)).collect();
        let f = field_from(&cells, 8, 8);
        let out = filter_clusters(&f, &grid(5));
        for (j, i) in cells {
            assert_eq!(out.at(j, i), 2.0);
        }
    }

    #[test]
    fn diagonal_cells_are_one_component() {
        // Diagonal chain of 4: connected under 8-connectivity, so it meets
        // min_area 4 as one component.
        let cells: Vec<_> = (0..4).map(|k| (k, k)).collect();
        let f = field_from(&cells, 8, 8);
        let out = filter_clusters(&f, &grid(4));
        assert_eq!(out.at(0, 0), 2.0);
        assert_eq!(out.at(3, 3), 2.0);
    }

    #[test]
    fn independent_clusters_filter_independently() {
        let mut cells: Vec<_> = (0..6).map(|j| (j, 1)).collect();
        cells.push((7, 7));
        let f = field_from(&cells, 8, 8);
        let out = filter_clusters(&f, &grid(3));
        assert_eq!(out.at(0, 1), 2.0);
        assert!(out.at(7, 7).is_nan());
    }
}
