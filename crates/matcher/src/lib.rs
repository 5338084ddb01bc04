//! Matching of station observations against gridded model output.
//!
//! For every model time step inside the analysis window, each observation
//! with the same (lead/lag-adjusted) timestamp is paired with the model
//! value at its nearest grid cell. Station-times the model never covers
//! produce no pair at all; a covered time with an unusable side produces a
//! pair with that side missing.

pub mod land;
pub mod sample;

use tracing::warn;
use verify_common::{MatchedPair, ModelSeries, ObsSet, PairSeries, VerifyResult};
use verify_common::{AnalysisWindow, LeadLag};

pub use land::{resolve_land, LandCorrections};
pub use sample::sample_value;

/// Everything the matching loop needs besides the data itself.
#[derive(Debug, Clone)]
pub struct MatchSettings {
    pub window: AnalysisWindow,
    /// Signed offset between a model step and the observation paired with
    /// it: a lead of +n matches each step to the record stamped n steps
    /// later.
    pub lead_lag: LeadLag,
    /// Stride over model time steps, from [`verify_common::substeps`].
    pub model_substeps: usize,
    pub model_interval_min: u32,
    /// Take the nearest cell's value directly instead of the 3x3
    /// same-land-type average.
    pub single_point: bool,
    /// FM codes that mark a marine observing system.
    pub marine_codes: Vec<String>,
    /// Configurations whose land-mask disagreements are expected (coarse
    /// geography) and therefore not recorded.
    pub mask_exempt_configurations: Vec<String>,
    /// Stations that legitimately report without a position.
    pub mobile_station_ids: Vec<String>,
}

impl MatchSettings {
    /// Upper bound on pairs for one case: every distinct station matched at
    /// every expected model step in the window.
    pub fn expected_pairs(&self, obs: &ObsSet) -> usize {
        let span_min = (self.window.end - self.window.start).num_minutes();
        let interval = self.model_interval_min as i64 * self.model_substeps as i64;
        let steps = (span_min / interval) as usize + 1;
        obs.station_ids().len() * steps
    }
}

/// Match one case's observations against one configuration's model output.
///
/// Pairs are emitted in (model time step, observation file order); rerunning
/// over the same inputs yields the identical sequence. Land-mask
/// disagreements accumulate into `corrections` across calls.
pub fn match_case(
    model: &ModelSeries,
    obs: &ObsSet,
    settings: &MatchSettings,
    configuration: &str,
    corrections: &mut LandCorrections,
) -> VerifyResult<PairSeries> {
    let mut pairs = PairSeries::with_capacity(settings.expected_pairs(obs));
    let offset = settings.lead_lag.offset();

    let mut t = 0usize;
    while t < model.len_times() {
        let model_time = model.times[t];
        if !settings.window.contains(model_time) {
            t += settings.model_substeps;
            continue;
        }
        for record in &obs.records {
            // A lead of +n pairs this step with the observation stamped n
            // steps later, so the offset comes off the observation side.
            let obs_time = record.time - offset;
            if !settings.window.contains(obs_time) {
                continue;
            }
            if obs_time != model_time {
                continue;
            }

            if !record.has_position() {
                if !settings
                    .mobile_station_ids
                    .iter()
                    .any(|s| s == &record.station_id)
                {
                    warn!(
                        station = %record.station_id,
                        time = %record.time,
                        "observation without position from a non-mobile station"
                    );
                }
                pairs.push(MatchedPair::missing(&record.station_id, model_time))?;
                continue;
            }

            let Some((j, i)) = model.nearest_cell(record.lat, record.lon) else {
                pairs.push(MatchedPair::missing(&record.station_id, model_time))?;
                continue;
            };

            let resolved = resolve_land(
                model.land(t, j, i),
                &record.fm_code,
                &record.station_id,
                configuration,
                settings,
                corrections,
            );
            let pred = sample_value(model, t, j, i, resolved, settings.single_point);
            let obs_value = if record.value.is_nan() {
                None
            } else {
                Some(record.value)
            };
            pairs.push(MatchedPair {
                station_id: record.station_id.clone(),
                time: model_time,
                obs: obs_value,
                pred,
            })?;
        }
        t += settings.model_substeps;
    }

    Ok(pairs)
}
