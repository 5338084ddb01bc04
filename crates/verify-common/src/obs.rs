//! Surface and marine observation records.

use chrono::{DateTime, Utc};

use crate::model::DomainBounds;

/// One observation of the variable under analysis.
///
/// `lat`/`lon` may be NaN: mobile platforms (e.g. a ferry) report without a
/// fixed position. `value` is NaN when the reading is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct ObsRecord {
    pub station_id: String,
    /// FM code identifying the observing-system type (e.g. FM-13 SHIP).
    pub fm_code: String,
    pub lat: f64,
    pub lon: f64,
    pub time: DateTime<Utc>,
    pub value: f64,
}

impl ObsRecord {
    pub fn has_position(&self) -> bool {
        !self.lat.is_nan() && !self.lon.is_nan()
    }
}

/// All observation records for one case, in file order.
///
/// Timestamps are monotonic within one station's records but records from
/// different stations interleave; the station id is the grouping key for
/// statistics and hourly rollups.
#[derive(Debug, Clone, Default)]
pub struct ObsSet {
    pub records: Vec<ObsRecord>,
}

impl ObsSet {
    pub fn new(records: Vec<ObsRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted distinct station ids.
    pub fn station_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .records
            .iter()
            .map(|r| r.station_id.clone())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Drop records positioned outside the model domain. Records without a
    /// position are kept; the matcher decides what to do with them.
    pub fn retain_inside(&mut self, bounds: &DomainBounds) {
        let before = self.records.len();
        self.records
            .retain(|r| !r.has_position() || bounds.contains(r.lat, r.lon));
        let dropped = before - self.records.len();
        if dropped > 0 {
            tracing::info!(dropped, "removed observations outside the model domain");
        }
    }
}
