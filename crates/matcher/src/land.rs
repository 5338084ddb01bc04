//! Land-type resolution for station/model disagreements.

use crate::MatchSettings;

/// Stations whose model grid cell carried the wrong land type.
///
/// Scoped to one driver invocation: it accumulates across every case and
/// configuration of that run and is reported once at the end. Never
/// persisted.
#[derive(Debug, Clone, Default)]
pub struct LandCorrections {
    stations: Vec<String>,
}

impl LandCorrections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a station id, keeping first-seen order without duplicates.
    pub fn record(&mut self, station_id: &str) {
        if !self.stations.iter().any(|s| s == station_id) {
            self.stations.push(station_id.to_string());
        }
    }

    pub fn stations(&self) -> &[String] {
        &self.stations
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

/// Resolve the land type to use for one comparison.
///
/// When the model mask disagrees with the station's declared type (marine
/// by FM-code membership), the value is flipped for this comparison only
/// and the station is recorded, unless the configuration is one of the
/// coarse-geography exemptions, which still get the flip but not the
/// record. The underlying mask is never mutated.
pub fn resolve_land(
    mask_value: f64,
    fm_code: &str,
    station_id: &str,
    configuration: &str,
    settings: &MatchSettings,
    corrections: &mut LandCorrections,
) -> f64 {
    let is_marine = settings.marine_codes.iter().any(|c| c == fm_code);
    let exempt = settings
        .mask_exempt_configurations
        .iter()
        .any(|c| c == configuration);

    if mask_value == 0.0 && !is_marine {
        if !exempt {
            corrections.record(station_id);
        }
        1.0
    } else if mask_value == 1.0 && is_marine {
        if !exempt {
            corrections.record(station_id);
        }
        0.0
    } else {
        mask_value
    }
}
