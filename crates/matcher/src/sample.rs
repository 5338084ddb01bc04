//! Model-side value extraction at a matched grid cell.

use verify_common::ModelSeries;

/// Sample the model field at time step `t` for the cell `(j, i)`.
///
/// In single-point mode the cell value is taken directly. Otherwise the 3x3
/// neighborhood centered on the cell is averaged over cells whose mask
/// matches the resolved land type; cells of the other type and NaN cells are
/// excluded. `None` when nothing usable remains.
pub fn sample_value(
    model: &ModelSeries,
    t: usize,
    j: usize,
    i: usize,
    resolved_land: f64,
    single_point: bool,
) -> Option<f64> {
    if single_point {
        let v = model.value(t, j, i);
        return if v.is_nan() { None } else { Some(v) };
    }

    let mut sum = 0.0;
    let mut count = 0usize;
    for dj in -1i64..=1 {
        for di in -1i64..=1 {
            let jj = j as i64 + dj;
            let ii = i as i64 + di;
            if jj < 0 || ii < 0 || jj >= model.ny as i64 || ii >= model.nx as i64 {
                continue;
            }
            let (jj, ii) = (jj as usize, ii as usize);
            if model.land(t, jj, ii) != resolved_land {
                continue;
            }
            let v = model.value(t, jj, ii);
            if v.is_nan() {
                continue;
            }
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn grid(field: Vec<f64>, mask: Vec<f64>) -> ModelSeries {
        // 3x3, one step
        let lats = vec![38.0, 38.0, 38.0, 38.5, 38.5, 38.5, 39.0, 39.0, 39.0];
        let lons = vec![-76.0, -75.5, -75.0, -76.0, -75.5, -75.0, -76.0, -75.5, -75.0];
        let t0 = Utc.with_ymd_and_hms(2014, 6, 4, 12, 0, 0).unwrap();
        ModelSeries::new(vec![t0], 3, 3, lats, lons, field, mask).unwrap()
    }

    #[test]
    fn single_point_reads_the_cell() {
        let m = grid((0..9).map(|v| v as f64).collect(), vec![1.0; 9]);
        assert_eq!(sample_value(&m, 0, 1, 1, 1.0, true), Some(4.0));
    }

    #[test]
    fn single_point_nan_is_missing() {
        let mut field: Vec<f64> = (0..9).map(|v| v as f64).collect();
        field[4] = f64::NAN;
        let m = grid(field, vec![1.0; 9]);
        assert_eq!(sample_value(&m, 0, 1, 1, 1.0, true), None);
    }

    #[test]
    fn neighborhood_averages_same_land_only() {
        // Water down the middle column; land cells hold 10, water cells 99.
        let field = vec![10.0, 99.0, 10.0, 10.0, 99.0, 10.0, 10.0, 99.0, 10.0];
        let mask = vec![1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
        let m = grid(field, mask);
        // Center cell is water but resolved land says land: the three water
        // cells drop out and the six land cells average to 10.
        assert_eq!(sample_value(&m, 0, 1, 1, 1.0, false), Some(10.0));
        assert_eq!(sample_value(&m, 0, 1, 1, 0.0, false), Some(99.0));
    }

    #[test]
    fn neighborhood_clamps_at_corners() {
        let m = grid((0..9).map(|v| v as f64).collect(), vec![1.0; 9]);
        // Corner (0,0): cells 0,1,3,4 => mean 2.0
        assert_eq!(sample_value(&m, 0, 0, 0, 1.0, false), Some(2.0));
    }

    #[test]
    fn empty_neighborhood_is_missing() {
        let m = grid((0..9).map(|v| v as f64).collect(), vec![0.0; 9]);
        assert_eq!(sample_value(&m, 0, 1, 1, 1.0, false), None);
    }
}
