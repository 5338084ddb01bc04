//! End-to-end land-mask handling through the matching loop.

use chrono::Duration;
use matcher::{match_case, LandCorrections, MatchSettings};
use test_utils::{case_start, grid_coords, obs, series_from_grids};
use verify_common::{AnalysisWindow, LeadLag, ModelSeries, ObsSet};

fn settings(single_point: bool) -> MatchSettings {
    MatchSettings {
        window: AnalysisWindow {
            start: case_start(),
            end: case_start() + Duration::hours(1),
        },
        lead_lag: LeadLag::none(),
        model_substeps: 1,
        model_interval_min: 60,
        single_point,
        marine_codes: vec!["FM-13".to_string(), "FM-18".to_string()],
        mask_exempt_configurations: vec!["GEOG".to_string()],
        mobile_station_ids: vec![],
    }
}

/// 3x3 grid, two steps: water in the middle column, land elsewhere.
/// Land cells hold 10, water cells 40.
fn coastal_model() -> ModelSeries {
    let mask = vec![1.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
    let field: Vec<f64> = mask.iter().map(|&m| if m == 1.0 { 10.0 } else { 40.0 }).collect();
    series_from_grids(3, 3, &[field.clone(), field], &mask)
}

fn center_latlon() -> (f64, f64) {
    let (lats, lons) = grid_coords(3, 3);
    (lats[4], lons[4])
}

#[test]
fn land_station_over_water_cell_averages_land_neighbors() {
    // A land station whose nearest cell is water: the land type flips to
    // land, so the 3x3 average only uses the six land neighbors.
    let (lat, lon) = center_latlon();
    let obs_set = ObsSet::new(vec![obs("KILG", lat, lon, 0, 12.0)]);
    let mut corrections = LandCorrections::new();
    let pairs = match_case(
        &coastal_model(),
        &obs_set,
        &settings(false),
        "PLAIN",
        &mut corrections,
    )
    .unwrap();

    assert_eq!(pairs.len(), 1);
    let p = pairs.iter().next().unwrap();
    assert_eq!(p.pred, Some(10.0));
    assert_eq!(corrections.stations(), &["KILG".to_string()]);
}

#[test]
fn marine_station_over_land_cell_averages_water_neighbors() {
    let (lats, lons) = grid_coords(3, 3);
    // Nearest cell (1, 0) is land; a ship there flips to water, picking up
    // the water column cells.
    let mut ship = obs("WDEL1", lats[3], lons[3], 0, 38.0);
    ship.fm_code = "FM-13".to_string();
    let obs_set = ObsSet::new(vec![ship]);
    let mut corrections = LandCorrections::new();
    let pairs = match_case(
        &coastal_model(),
        &obs_set,
        &settings(false),
        "PLAIN",
        &mut corrections,
    )
    .unwrap();

    let p = pairs.iter().next().unwrap();
    assert_eq!(p.pred, Some(40.0));
    assert_eq!(corrections.stations(), &["WDEL1".to_string()]);
}

#[test]
fn exempt_configuration_is_never_recorded() {
    let (lat, lon) = center_latlon();
    let obs_set = ObsSet::new(vec![obs("KILG", lat, lon, 0, 12.0)]);
    let mut corrections = LandCorrections::new();
    let pairs = match_case(
        &coastal_model(),
        &obs_set,
        &settings(false),
        "GEOG",
        &mut corrections,
    )
    .unwrap();

    // Same flip, same sampled value, but the station is not recorded.
    assert_eq!(pairs.iter().next().unwrap().pred, Some(10.0));
    assert!(corrections.is_empty());
}

#[test]
fn corrections_accumulate_across_cases_without_duplicates() {
    let (lat, lon) = center_latlon();
    let model = coastal_model();
    let obs_set = ObsSet::new(vec![obs("KILG", lat, lon, 0, 12.0)]);
    let s = settings(false);
    let mut corrections = LandCorrections::new();
    match_case(&model, &obs_set, &s, "PLAIN", &mut corrections).unwrap();
    match_case(&model, &obs_set, &s, "MORR", &mut corrections).unwrap();
    assert_eq!(corrections.stations(), &["KILG".to_string()]);
}

#[test]
fn single_point_mode_ignores_the_flip_for_sampling() {
    // Single-point mode reads the nearest cell directly even when the land
    // type was corrected; the flip still gets recorded.
    let (lat, lon) = center_latlon();
    let obs_set = ObsSet::new(vec![obs("KILG", lat, lon, 0, 12.0)]);
    let mut corrections = LandCorrections::new();
    let pairs = match_case(
        &coastal_model(),
        &obs_set,
        &settings(true),
        "PLAIN",
        &mut corrections,
    )
    .unwrap();

    assert_eq!(pairs.iter().next().unwrap().pred, Some(40.0));
    assert_eq!(corrections.stations(), &["KILG".to_string()]);
}
