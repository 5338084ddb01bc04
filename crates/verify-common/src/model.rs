//! Gridded model output for one (case, configuration, variable).

use chrono::{DateTime, Utc};

use crate::error::{VerifyError, VerifyResult};

/// Lat/lon bounding box of a model domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl DomainBounds {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }
}

/// A model field as a time series of 2-D grids, with parallel latitude,
/// longitude and land-mask arrays.
///
/// Spatial arrays are row-major `[j * nx + i]` with `j` the north-south and
/// `i` the west-east index; `field` and `landmask` carry one grid per time
/// step, `[t * ny * nx + j * nx + i]`. Land mask convention: 0 = water,
/// 1 = land.
#[derive(Debug, Clone)]
pub struct ModelSeries {
    pub times: Vec<DateTime<Utc>>,
    pub ny: usize,
    pub nx: usize,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    field: Vec<f64>,
    landmask: Vec<f64>,
}

impl ModelSeries {
    /// Assemble and validate a series. Time steps must be evenly spaced and
    /// every array must match the declared shape.
    pub fn new(
        times: Vec<DateTime<Utc>>,
        ny: usize,
        nx: usize,
        lats: Vec<f64>,
        lons: Vec<f64>,
        field: Vec<f64>,
        landmask: Vec<f64>,
    ) -> VerifyResult<Self> {
        let cells = ny * nx;
        if lats.len() != cells || lons.len() != cells {
            return Err(VerifyError::ShapeMismatch(format!(
                "lat/lon arrays hold {}/{} cells, grid is {ny}x{nx}",
                lats.len(),
                lons.len()
            )));
        }
        if field.len() != times.len() * cells || landmask.len() != times.len() * cells {
            return Err(VerifyError::ShapeMismatch(format!(
                "field/landmask hold {}/{} values, expected {} steps x {cells} cells",
                field.len(),
                landmask.len(),
                times.len()
            )));
        }
        if times.len() >= 3 {
            let step = times[1] - times[0];
            for pair in times.windows(2) {
                if pair[1] - pair[0] != step {
                    return Err(VerifyError::UnevenTimeSteps(format!(
                        "{} -> {}",
                        pair[0], pair[1]
                    )));
                }
            }
        }
        Ok(Self {
            times,
            ny,
            nx,
            lats,
            lons,
            field,
            landmask,
        })
    }

    pub fn len_times(&self) -> usize {
        self.times.len()
    }

    pub fn value(&self, t: usize, j: usize, i: usize) -> f64 {
        self.field[t * self.ny * self.nx + j * self.nx + i]
    }

    pub fn land(&self, t: usize, j: usize, i: usize) -> f64 {
        self.landmask[t * self.ny * self.nx + j * self.nx + i]
    }

    pub fn lat(&self, j: usize, i: usize) -> f64 {
        self.lats[j * self.nx + i]
    }

    pub fn lon(&self, j: usize, i: usize) -> f64 {
        self.lons[j * self.nx + i]
    }

    /// One time step of the field as a contiguous slice.
    pub fn field_slice(&self, t: usize) -> &[f64] {
        let cells = self.ny * self.nx;
        &self.field[t * cells..(t + 1) * cells]
    }

    pub fn bounds(&self) -> DomainBounds {
        let mut b = DomainBounds {
            lat_min: f64::INFINITY,
            lat_max: f64::NEG_INFINITY,
            lon_min: f64::INFINITY,
            lon_max: f64::NEG_INFINITY,
        };
        for (&lat, &lon) in self.lats.iter().zip(&self.lons) {
            b.lat_min = b.lat_min.min(lat);
            b.lat_max = b.lat_max.max(lat);
            b.lon_min = b.lon_min.min(lon);
            b.lon_max = b.lon_max.max(lon);
        }
        b
    }

    /// Nearest grid cell to a lat/lon position, or `None` when the position
    /// falls outside the domain bounding box.
    ///
    /// The grid is curvilinear so this scans for the minimum squared
    /// coordinate distance rather than inverting a projection.
    pub fn nearest_cell(&self, lat: f64, lon: f64) -> Option<(usize, usize)> {
        if lat.is_nan() || lon.is_nan() || !self.bounds().contains(lat, lon) {
            return None;
        }
        let mut best = (0usize, 0usize);
        let mut best_d2 = f64::INFINITY;
        for j in 0..self.ny {
            for i in 0..self.nx {
                let dlat = self.lat(j, i) - lat;
                let dlon = self.lon(j, i) - lon;
                let d2 = dlat * dlat + dlon * dlon;
                if d2 < best_d2 {
                    best_d2 = d2;
                    best = (j, i);
                }
            }
        }
        Some(best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn times(n: usize, step_min: i64) -> Vec<DateTime<Utc>> {
        let t0 = Utc.with_ymd_and_hms(2014, 6, 4, 12, 0, 0).unwrap();
        (0..n)
            .map(|k| t0 + chrono::Duration::minutes(step_min * k as i64))
            .collect()
    }

    fn small_series() -> ModelSeries {
        // 2x3 grid, 2 steps; lats 38..39, lons -76..-74
        let lats = vec![38.0, 38.0, 38.0, 39.0, 39.0, 39.0];
        let lons = vec![-76.0, -75.0, -74.0, -76.0, -75.0, -74.0];
        let field = (0..12).map(|v| v as f64).collect();
        let mask = vec![1.0; 12];
        ModelSeries::new(times(2, 60), 2, 3, lats, lons, field, mask).unwrap()
    }

    #[test]
    fn nearest_cell_lookup() {
        let m = small_series();
        assert_eq!(m.nearest_cell(38.1, -75.9), Some((0, 0)));
        assert_eq!(m.nearest_cell(38.9, -74.2), Some((1, 2)));
        assert_eq!(m.nearest_cell(45.0, -75.0), None);
        assert_eq!(m.nearest_cell(f64::NAN, -75.0), None);
    }

    #[test]
    fn indexing_is_row_major_per_step() {
        let m = small_series();
        assert_eq!(m.value(0, 0, 0), 0.0);
        assert_eq!(m.value(0, 1, 2), 5.0);
        assert_eq!(m.value(1, 0, 0), 6.0);
    }

    #[test]
    fn uneven_steps_rejected() {
        let mut ts = times(3, 60);
        ts[2] = ts[2] + chrono::Duration::minutes(30);
        let err = ModelSeries::new(
            ts,
            1,
            1,
            vec![38.0],
            vec![-75.0],
            vec![0.0; 3],
            vec![1.0; 3],
        )
        .unwrap_err();
        assert!(matches!(err, VerifyError::UnevenTimeSteps(_)));
    }

    #[test]
    fn shape_mismatch_rejected() {
        let err = ModelSeries::new(
            times(1, 60),
            2,
            2,
            vec![38.0; 4],
            vec![-75.0; 4],
            vec![0.0; 3],
            vec![1.0; 4],
        )
        .unwrap_err();
        assert!(matches!(err, VerifyError::ShapeMismatch(_)));
    }
}
