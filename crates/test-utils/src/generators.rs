//! Generators for synthetic verification data.
//!
//! These build predictable, verifiable model series, observation sets and
//! potential-temperature fields for use across the test suite.

use chrono::{DateTime, Duration, TimeZone, Utc};
use verify_common::{ModelSeries, ObsRecord, ObsSet};

/// Reference start time shared by the generators: 2014-06-04 12:00 UTC.
pub fn case_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2014, 6, 4, 12, 0, 0).unwrap()
}

/// `n` timestamps at a fixed interval starting from [`case_start`].
pub fn times(n: usize, interval_min: i64) -> Vec<DateTime<Utc>> {
    (0..n)
        .map(|k| case_start() + Duration::minutes(interval_min * k as i64))
        .collect()
}

/// Regular lat/lon coordinate arrays for an `ny` x `nx` grid.
///
/// Latitude runs 38.0 northward in 0.1-degree rows, longitude -76.0
/// eastward in 0.1-degree columns, covering a Delaware-bay-sized box.
pub fn grid_coords(ny: usize, nx: usize) -> (Vec<f64>, Vec<f64>) {
    let mut lats = Vec::with_capacity(ny * nx);
    let mut lons = Vec::with_capacity(ny * nx);
    for j in 0..ny {
        for i in 0..nx {
            lats.push(38.0 + 0.1 * j as f64);
            lons.push(-76.0 + 0.1 * i as f64);
        }
    }
    (lats, lons)
}

/// A model series with a constant field value and an all-land mask.
///
/// # Arguments
///
/// * `ny`, `nx` - Grid shape
/// * `steps` - Number of hourly time steps
/// * `value` - Field value at every cell and step
pub fn constant_series(ny: usize, nx: usize, steps: usize, value: f64) -> ModelSeries {
    let (lats, lons) = grid_coords(ny, nx);
    ModelSeries::new(
        times(steps, 60),
        ny,
        nx,
        lats,
        lons,
        vec![value; steps * ny * nx],
        vec![1.0; steps * ny * nx],
    )
    .unwrap()
}

/// A model series whose value at every cell equals its time-step index,
/// with an all-land mask. Lets a test read the matched step off the value.
pub fn stepped_series(ny: usize, nx: usize, steps: usize) -> ModelSeries {
    let (lats, lons) = grid_coords(ny, nx);
    let field: Vec<f64> = (0..steps)
        .flat_map(|k| vec![k as f64; ny * nx])
        .collect();
    ModelSeries::new(
        times(steps, 60),
        ny,
        nx,
        lats,
        lons,
        field,
        vec![1.0; steps * ny * nx],
    )
    .unwrap()
}

/// A model series from explicit per-step field and mask grids.
pub fn series_from_grids(
    ny: usize,
    nx: usize,
    field_steps: &[Vec<f64>],
    mask: &[f64],
) -> ModelSeries {
    let (lats, lons) = grid_coords(ny, nx);
    let field: Vec<f64> = field_steps.iter().flatten().copied().collect();
    let mask_all: Vec<f64> = field_steps.iter().flat_map(|_| mask.to_vec()).collect();
    ModelSeries::new(
        times(field_steps.len(), 60),
        ny,
        nx,
        lats,
        lons,
        field,
        mask_all,
    )
    .unwrap()
}

/// One land-station observation record (FM-12).
pub fn obs(id: &str, lat: f64, lon: f64, hours_after_start: i64, value: f64) -> ObsRecord {
    ObsRecord {
        station_id: id.to_string(),
        fm_code: "FM-12".to_string(),
        lat,
        lon,
        time: case_start() + Duration::hours(hours_after_start),
        value,
    }
}

/// An observation set with one station reporting hourly for `hours` steps.
///
/// Values are `base + k` at hour `k`, so tests can read the hour off the
/// value.
pub fn hourly_station(id: &str, lat: f64, lon: f64, hours: usize, base: f64) -> ObsSet {
    ObsSet::new(
        (0..hours)
            .map(|k| obs(id, lat, lon, k as i64, base + k as f64))
            .collect(),
    )
}

/// A potential-temperature grid with a sharp north-south front.
///
/// Cells west of `front_col` hold `warm`, cells at and east of it hold
/// `cool`, mimicking marine air behind a sea-breeze front.
pub fn step_theta(ny: usize, nx: usize, front_col: usize, warm: f64, cool: f64) -> Vec<f64> {
    let mut field = Vec::with_capacity(ny * nx);
    for _j in 0..ny {
        for i in 0..nx {
            field.push(if i < front_col { warm } else { cool });
        }
    }
    field
}

/// A flat potential-temperature grid with no gradient anywhere.
pub fn flat_theta(ny: usize, nx: usize, value: f64) -> Vec<f64> {
    vec![value; ny * nx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepped_series_encodes_the_step() {
        let m = stepped_series(2, 2, 3);
        assert_eq!(m.value(0, 1, 1), 0.0);
        assert_eq!(m.value(2, 0, 0), 2.0);
    }

    #[test]
    fn grid_coords_are_row_major() {
        let (lats, lons) = grid_coords(2, 3);
        assert_eq!(lats[0], 38.0);
        assert_eq!(lats[3], 38.1);
        assert_eq!(lons[0], -76.0);
        assert_eq!(lons[2], -75.8);
    }

    #[test]
    fn hourly_station_values_follow_the_hour() {
        let set = hourly_station("KILG", 39.0, -75.6, 3, 20.0);
        assert_eq!(set.len(), 3);
        assert_eq!(set.records[2].value, 22.0);
        assert_eq!(
            set.records[2].time,
            case_start() + Duration::hours(2)
        );
    }

    #[test]
    fn step_theta_is_warm_then_cool() {
        let f = step_theta(2, 4, 2, 300.0, 295.0);
        assert_eq!(&f[0..4], &[300.0, 300.0, 295.0, 295.0]);
    }
}
