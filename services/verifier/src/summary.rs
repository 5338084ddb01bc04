//! Whole-run summary statistics.
//!
//! For each variable and configuration, matched pairs are concatenated
//! across every case and each configured statistic is computed once over
//! the whole series. The table is printed and, when saving, written as the
//! `WRF_Validate_*` CSV.

use std::path::PathBuf;

use tracing::info;

use matcher::{match_case, LandCorrections};
use metrics::compute_all;
use verify_common::{parse_case_time, ModelProvider, ObsProvider, PairSeries, VerifyResult};

use crate::config::VerifyConfig;
use crate::csvout;

/// Matched pairs for one case plus the station list behind them.
pub struct CaseMatch {
    pub pairs: PairSeries,
    /// Sorted distinct station ids of the case's in-domain observations,
    /// including stations that never produced a pair.
    pub stations: Vec<String>,
}

/// Load, filter and match one (variable, configuration, case).
pub fn pairs_for_case(
    cfg: &VerifyConfig,
    models: &dyn ModelProvider,
    observations: &dyn ObsProvider,
    variable: &str,
    configuration: &str,
    case: &str,
    corrections: &mut LandCorrections,
) -> VerifyResult<CaseMatch> {
    let window = cfg.window_for(parse_case_time(case)?)?;
    let settings = cfg.match_settings(window)?;
    let mut obs_set = observations.load(case, variable)?;
    let model = models.load(case, configuration, variable, &cfg.domain)?;
    obs_set.retain_inside(&model.bounds());
    let pairs = match_case(&model, &obs_set, &settings, configuration, corrections)?;
    info!(
        case,
        configuration,
        variable,
        pairs = pairs.len(),
        "matched case"
    );
    Ok(CaseMatch {
        pairs,
        stations: obs_set.station_ids(),
    })
}

/// Output path of the summary table for one variable.
pub fn summary_path(cfg: &VerifyConfig, variable: &str) -> VerifyResult<PathBuf> {
    let suffix = cfg.lead_lag()?.file_suffix();
    Ok(cfg.csv_dir.join(format!(
        "WRF_Validate_{}_nc{}_niv{}{}{}.csv",
        VerifyConfig::var_word(variable),
        cfg.case_tag(),
        cfg.configurations.len(),
        cfg.window_tag(),
        suffix
    )))
}

/// One summary row per configuration for one variable.
pub fn build_rows(
    cfg: &VerifyConfig,
    models: &dyn ModelProvider,
    observations: &dyn ObsProvider,
    variable: &str,
    corrections: &mut LandCorrections,
) -> VerifyResult<Vec<(String, Vec<f64>)>> {
    let mut rows = Vec::with_capacity(cfg.configurations.len());
    for configuration in &cfg.configurations {
        let mut all = PairSeries::unbounded();
        for case in &cfg.cases {
            let matched = pairs_for_case(
                cfg,
                models,
                observations,
                variable,
                configuration,
                case,
                corrections,
            )?;
            all.extend_from(&matched.pairs);
        }
        let values = compute_all(&cfg.statistics, &all.obs_array(), &all.pred_array())?;
        rows.push((configuration.clone(), values));
    }
    Ok(rows)
}

/// Print a summary table to stdout, pandas-style with 3-decimal rounding.
pub fn print_table(variable: &str, statistics: &[String], rows: &[(String, Vec<f64>)]) {
    println!();
    println!("VARIABLE:  {variable}");
    print!("{:<12}", "VAR.");
    for name in statistics {
        print!("{name:>12}");
    }
    println!();
    for (configuration, values) in rows {
        print!("{configuration:<12}");
        for &v in values {
            if v.is_nan() {
                print!("{:>12}", "NaN");
            } else {
                print!("{v:>12.3}");
            }
        }
        println!();
    }
    println!();
}

/// Run the summary driver over every variable.
pub fn run(
    cfg: &VerifyConfig,
    models: &dyn ModelProvider,
    observations: &dyn ObsProvider,
    corrections: &mut LandCorrections,
) -> VerifyResult<()> {
    for variable in &cfg.variables {
        let rows = build_rows(cfg, models, observations, variable, corrections)?;
        print_table(variable, &cfg.statistics, &rows);

        if cfg.save_results {
            let mut header = vec!["VAR.".to_string()];
            header.extend(cfg.statistics.iter().cloned());
            let csv_rows: Vec<Vec<String>> = rows
                .iter()
                .map(|(configuration, values)| csvout::row(configuration, values))
                .collect();
            let path = summary_path(cfg, variable)?;
            csvout::write_table(&path, &header, &csv_rows)?;
            info!(path = %path.display(), "wrote summary table");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LeadLagConfig;
    use crate::sources::{CsvObsProvider, JsonModelProvider};
    use std::io::Write;
    use std::path::Path;

    fn test_config(root: &Path) -> VerifyConfig {
        VerifyConfig {
            cases: vec!["2014-06-04_12:00".to_string()],
            configurations: vec!["PLAIN".to_string()],
            variables: vec!["Air_Temperature (K)".to_string()],
            domain: "d03".to_string(),
            runtime_hours: 42,
            model_interval_min: 60,
            observation_interval_min: 60,
            analysis_start_hour: 0,
            analysis_length_hrs: 2,
            analysis_interval_min: 60,
            single_point_analysis: true,
            save_results: true,
            time_series_analysis: false,
            statistics: ["OBS", "PRED", "MAE", "BIAS"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            hourly_statistics: vec!["MAE".to_string()],
            marine_fm_codes: vec!["FM-13 SHIP".to_string()],
            mask_exempt_configurations: vec![],
            mobile_station_ids: vec![],
            lead_lag: LeadLagConfig::default(),
            model_dir: root.join("model"),
            obs_dir: root.join("obs"),
            csv_dir: root.join("out/csv"),
            plot_dir: root.join("out/plots"),
        }
    }

    /// 1x2 all-land grid, 3 hourly steps; T2 at the station cell is
    /// 295, 296, 297.
    fn write_fixture(root: &Path) {
        let model_case = root.join("model/2014_06_04_1200");
        std::fs::create_dir_all(&model_case).unwrap();
        let dump = serde_json::json!({
            "times": ["2014-06-04_12:00", "2014-06-04_13:00", "2014-06-04_14:00"],
            "ny": 1,
            "nx": 2,
            "lats": [39.0, 39.0],
            "lons": [-75.6, -75.5],
            "landmask": [1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            "fields": { "T2": [295.0, 290.0, 296.0, 290.0, 297.0, 290.0] }
        });
        std::fs::write(
            model_case.join("wrfout_PLAIN_d03.json"),
            serde_json::to_string(&dump).unwrap(),
        )
        .unwrap();

        let obs_case = root.join("obs/2014_06_04_1200");
        std::fs::create_dir_all(&obs_case).unwrap();
        let mut f = std::fs::File::create(obs_case.join("obs.csv")).unwrap();
        writeln!(
            f,
            "ID_String,FM_string,Latitude,Longitude,YEAR,MONTH,DAY,HOUR,MINUTE,Air_Temperature (K)"
        )
        .unwrap();
        writeln!(f, "KILG,FM-12,39.0,-75.6,2014,6,4,12,0,294.0").unwrap();
        writeln!(f, "KILG,FM-12,39.0,-75.6,2014,6,4,13,0,297.0").unwrap();
        writeln!(f, "KILG,FM-12,39.0,-75.6,2014,6,4,14,0,297.0").unwrap();
    }

    #[test]
    fn summary_over_a_small_fixture() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let cfg = test_config(dir.path());
        cfg.validate().unwrap();

        let models = JsonModelProvider::new(&cfg.model_dir);
        let observations = CsvObsProvider::new(&cfg.obs_dir);
        let mut corrections = LandCorrections::new();
        run(&cfg, &models, &observations, &mut corrections).unwrap();

        // Errors are +1, -1, 0: OBS 296, PRED 296, MAE 2/3, BIAS 0.
        let path = summary_path(&cfg, "Air_Temperature (K)").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "VAR.,OBS,PRED,MAE,BIAS\nPLAIN,296.000,296.000,0.667,0.000\n"
        );
        assert!(corrections.is_empty());
    }

    #[test]
    fn summary_filename_encodes_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = test_config(dir.path());
        cfg.cases.push("2014-06-08_12:00".to_string());
        let path = summary_path(&cfg, "Air_Temperature (K)").unwrap();
        assert!(path
            .to_string_lossy()
            .ends_with("WRF_Validate_Air_Temperature_nc2_niv1_s0_len2_freq60.csv"));

        cfg.lead_lag = LeadLagConfig {
            enabled: true,
            offset: "-1".to_string(),
        };
        let path = summary_path(&cfg, "Air_Temperature (K)").unwrap();
        assert!(path.to_string_lossy().ends_with("_freq60_LLn1.csv"));
    }
}
