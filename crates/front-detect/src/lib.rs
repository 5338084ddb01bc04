//! Sea-breeze front detection over potential-temperature fields.
//!
//! The pipeline runs per model time step on one vertical level: coarsen the
//! theta slice into nugget averages, take the west-east directional
//! gradient, erase weak cells and small clusters, scan each row east to
//! west for the leading edge, then classify the whole step as a found or
//! not-found front from row coverage and the longest contiguous run.

pub mod cluster;
pub mod coarsen;
pub mod gradient;
pub mod scan;

use serde::Deserialize;
use tracing::debug;
use verify_common::{VerifyError, VerifyResult};

/// Analysis sub-domain and tuning knobs for one detection run.
///
/// Indices are grid-cell offsets into the model domain: rows `south..north`
/// and columns `west..east`, with columns increasing eastward.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectGrid {
    /// Vertical model level the theta slice is taken from.
    pub level: usize,
    /// Grid spacing in kilometres, scaling the gradient to per-km units.
    pub resolution_km: f64,
    /// Half-width of the coarsening nugget; 0 disables coarsening.
    pub cell_size: usize,
    /// Cell separation of the directional difference.
    pub gradient_distance: usize,
    pub west: usize,
    pub east: usize,
    pub south: usize,
    pub north: usize,
    /// Minimum gradient (K/km) for a cell to count as frontal.
    pub threshold: f64,
    /// Minimum cluster pixel area kept by the component filter.
    pub min_area: usize,
}

impl DetectGrid {
    /// Side length of the coarsening window.
    pub fn nugget(&self) -> usize {
        2 * self.cell_size + 1
    }

    /// Check the sub-domain against an actual grid shape.
    pub fn validate(&self, ny: usize, nx: usize) -> VerifyResult<()> {
        if self.north > ny || self.east > nx {
            return Err(VerifyError::invalid_config(format!(
                "detection sub-domain {}..{} x {}..{} exceeds the {}x{} grid",
                self.south, self.north, self.west, self.east, ny, nx
            )));
        }
        if self.south >= self.north || self.west >= self.east {
            return Err(VerifyError::invalid_config(
                "detection sub-domain is empty",
            ));
        }
        if self.west + self.gradient_distance >= self.east {
            return Err(VerifyError::invalid_config(
                "gradient distance leaves no columns to difference",
            ));
        }
        if self.threshold <= 0.0 {
            return Err(VerifyError::invalid_config(
                "gradient threshold must be positive",
            ));
        }
        Ok(())
    }
}

/// One 2-D grid of values, row-major `[j * nx + i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlice {
    pub ny: usize,
    pub nx: usize,
    pub data: Vec<f64>,
}

impl FieldSlice {
    pub fn new(ny: usize, nx: usize, data: Vec<f64>) -> VerifyResult<Self> {
        if data.len() != ny * nx {
            return Err(VerifyError::ShapeMismatch(format!(
                "slice holds {} values, expected {ny}x{nx}",
                data.len()
            )));
        }
        Ok(Self { ny, nx, data })
    }

    pub fn filled(ny: usize, nx: usize, value: f64) -> Self {
        Self {
            ny,
            nx,
            data: vec![value; ny * nx],
        }
    }

    pub fn at(&self, j: usize, i: usize) -> f64 {
        self.data[j * self.nx + i]
    }

    pub fn set(&mut self, j: usize, i: usize, value: f64) {
        self.data[j * self.nx + i] = value;
    }
}

/// Front positions and classification for one time step.
///
/// `lons`/`lats` hold one entry per sub-domain row, south to north; a NaN
/// longitude marks a row without a front point. When the step is classified
/// as not found, every longitude is NaN while the latitudes keep their
/// row values.
#[derive(Debug, Clone)]
pub struct FrontDetection {
    pub lons: Vec<f64>,
    pub lats: Vec<f64>,
    pub found: bool,
    /// Percent of rows with a front point, rounded to two decimals.
    pub coverage_pct: f64,
    /// Longest run of consecutive rows with a front point.
    pub longest_run: usize,
}

/// Everything one detection step produces: the classification plus the
/// intermediate fields the driver can dump for offline inspection.
#[derive(Debug, Clone)]
pub struct StepDetection {
    pub front: FrontDetection,
    /// Coarsened theta over the sub-domain.
    pub theta: FieldSlice,
    /// Unfiltered directional gradient.
    pub gradient: FieldSlice,
}

/// Run the full detection pipeline on one theta slice.
///
/// `lats`/`lons` are the model's coordinate arrays, row-major over the full
/// `ny * nx` grid.
pub fn detect_step(
    theta: &FieldSlice,
    lats: &[f64],
    lons: &[f64],
    grid: &DetectGrid,
) -> VerifyResult<StepDetection> {
    grid.validate(theta.ny, theta.nx)?;
    if lats.len() != theta.ny * theta.nx || lons.len() != theta.ny * theta.nx {
        return Err(VerifyError::ShapeMismatch(format!(
            "coordinate arrays hold {}/{} values, grid is {}x{}",
            lats.len(),
            lons.len(),
            theta.ny,
            theta.nx
        )));
    }

    let coarse = coarsen::coarsen(theta, grid);
    let grad = gradient::gradient(&coarse, grid);
    let thresholded = gradient::apply_threshold(&grad, grid.threshold);
    let filtered = cluster::filter_clusters(&thresholded, grid);
    let (front_lons, front_lats) = scan::scan_rows(&filtered, lats, lons, grid);
    let front = classify(front_lons, front_lats);
    debug!(
        found = front.found,
        coverage_pct = front.coverage_pct,
        longest_run = front.longest_run,
        "classified detection step"
    );

    Ok(StepDetection {
        front,
        theta: coarse,
        gradient: grad,
    })
}

/// Decide whether the per-row points add up to a front.
///
/// A front is found when more than half the rows carry a point with a run
/// longer than 20 rows, or more than 30% of rows do with a run longer than
/// 45. A step classified as not found keeps its latitudes but discards
/// every longitude.
pub fn classify(mut lons: Vec<f64>, lats: Vec<f64>) -> FrontDetection {
    let total = lons.len();
    let valid = lons.iter().filter(|v| !v.is_nan()).count();
    let coverage_pct = if total == 0 {
        0.0
    } else {
        (valid as f64 / total as f64 * 10000.0).round() / 100.0
    };

    let mut longest_run = 0usize;
    let mut run = 0usize;
    for v in &lons {
        if v.is_nan() {
            run = 0;
        } else {
            run += 1;
            longest_run = longest_run.max(run);
        }
    }

    let found = (coverage_pct > 50.0 && longest_run > 20)
        || (coverage_pct > 30.0 && longest_run > 45);
    if !found {
        for v in &mut lons {
            *v = f64::NAN;
        }
    }

    FrontDetection {
        lons,
        lats,
        found,
        coverage_pct,
        longest_run,
    }
}
