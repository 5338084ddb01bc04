//! Hourly time-series rollups.
//!
//! Each matched pair contributes one pointwise statistic value to its
//! (station, analysis hour) bucket; buckets are then averaged NaN-safely
//! through three levels: stations within a case, cases within a
//! configuration, and configurations within the run. Every level is
//! written as a CSV table with an AVERAGE column and a closing average
//! row, and the configuration level is also plotted.
//!
//! Lead/lag offsets and analysis intervals finer than the model interval
//! are rejected up front.

use std::path::PathBuf;

use chrono::Duration;
use tracing::info;

use matcher::LandCorrections;
use metrics::nan::nanmean;
use metrics::{compute_all, Statistic};
use verify_common::{
    parse_case_time, substeps, AnalysisWindow, ModelProvider, ObsProvider, PairSeries,
    VerifyError, VerifyResult,
};

use crate::config::VerifyConfig;
use crate::csvout;
use crate::plot;
use crate::summary::{self, pairs_for_case, CaseMatch};

/// A labelled table of per-hour values under construction.
struct HourTable {
    rows: Vec<(String, Vec<f64>)>,
}

impl HourTable {
    fn new() -> Self {
        Self { rows: Vec::new() }
    }

    fn push(&mut self, label: String, values: Vec<f64>) {
        self.rows.push((label, values));
    }

    /// NaN-safe column means over all rows.
    fn column_means(&self, n_cols: usize) -> Vec<f64> {
        (0..n_cols)
            .map(|c| {
                let column: Vec<f64> = self.rows.iter().map(|(_, v)| v[c]).collect();
                nanmean(&column)
            })
            .collect()
    }

    /// CSV rows with an AVERAGE column appended to every row and a closing
    /// average row at the bottom.
    fn csv_rows(&self, closing_label: &str, n_cols: usize) -> Vec<Vec<String>> {
        let mut out: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|(label, values)| {
                let mut cells = csvout::row(label, values);
                cells.push(csvout::fmt_cell(nanmean(values)));
                cells
            })
            .collect();
        let closing = self.column_means(n_cols);
        let mut cells = csvout::row(closing_label, &closing);
        cells.push(csvout::fmt_cell(nanmean(&closing)));
        out.push(cells);
        out
    }
}

fn header(first: &str, labels: &[String]) -> Vec<String> {
    let mut h = Vec::with_capacity(labels.len() + 2);
    h.push(first.to_string());
    h.extend(labels.iter().cloned());
    h.push("AVERAGE".to_string());
    h
}

/// Pointwise stat values bucketed by (station, hour) for one case.
///
/// A bucket with several contributions keeps their NaN-safe mean; a bucket
/// no pair ever reached, or only missing pairs reached, is NaN.
fn hourly_grid(
    matched: &CaseMatch,
    window: &AnalysisWindow,
    step_min: i64,
    n_hours: usize,
    stat: Statistic,
) -> VerifyResult<HourTable> {
    let mut sums = vec![vec![0.0; n_hours]; matched.stations.len()];
    let mut counts = vec![vec![0usize; n_hours]; matched.stations.len()];

    for pair in matched.pairs.iter() {
        let (Some(obs), Some(pred)) = (pair.obs, pair.pred) else {
            continue;
        };
        let Some(row) = matched.stations.iter().position(|s| s == &pair.station_id) else {
            continue;
        };
        let col = ((pair.time - window.start).num_minutes() / step_min) as usize;
        if col >= n_hours {
            continue;
        }
        let value = stat.pointwise(pred, obs)?;
        if !value.is_nan() {
            sums[row][col] += value;
            counts[row][col] += 1;
        }
    }

    let mut table = HourTable::new();
    for (i, station) in matched.stations.iter().enumerate() {
        let values: Vec<f64> = (0..n_hours)
            .map(|c| {
                if counts[i][c] == 0 {
                    f64::NAN
                } else {
                    sums[i][c] / counts[i][c] as f64
                }
            })
            .collect();
        table.push(station.clone(), values);
    }
    Ok(table)
}

fn station_table_path(
    cfg: &VerifyConfig,
    case: &str,
    configuration: &str,
    stat: &str,
    variable: &str,
) -> PathBuf {
    cfg.csv_dir
        .join("csv")
        .join(format!("Case_{}", VerifyConfig::case_dir_name(case)))
        .join(format!(
            "{configuration}_{stat}_{}_{}{}.csv",
            cfg.domain,
            VerifyConfig::var_short(variable),
            cfg.window_tag()
        ))
}

fn case_table_path(cfg: &VerifyConfig, configuration: &str, stat: &str, variable: &str) -> PathBuf {
    cfg.csv_dir.join("csv").join(format!(
        "{configuration}_{stat}{}_{}.csv",
        cfg.window_tag(),
        VerifyConfig::var_short(variable)
    ))
}

fn configuration_table_path(cfg: &VerifyConfig, stat: &str, variable: &str) -> PathBuf {
    cfg.csv_dir.join("csv").join(format!(
        "All_Assimilation_Types_{stat}{}_{}.csv",
        cfg.window_tag(),
        VerifyConfig::var_short(variable)
    ))
}

fn plot_path(cfg: &VerifyConfig, stat: &str, variable: &str) -> PathBuf {
    let base = format!(
        "{stat}{}_{}",
        cfg.window_tag(),
        VerifyConfig::var_short(variable)
    );
    if cfg.cases.len() == 1 {
        cfg.plot_dir
            .join(VerifyConfig::case_dir_name(&cfg.cases[0]))
            .join(format!(
                "{base}_iv{}_single_case.png",
                cfg.configurations.len()
            ))
    } else {
        cfg.plot_dir.join(format!("{base}_All_Cases.png"))
    }
}

/// Run the time-series driver over every variable.
pub fn run(
    cfg: &VerifyConfig,
    models: &dyn ModelProvider,
    observations: &dyn ObsProvider,
    corrections: &mut LandCorrections,
) -> VerifyResult<()> {
    if cfg.lead_lag()?.is_active() {
        return Err(VerifyError::LeadLagUnsupported);
    }
    let (model_substeps, analysis_substeps) =
        substeps(cfg.model_interval_min, cfg.analysis_interval_min)?;
    if analysis_substeps != 1 {
        return Err(VerifyError::SubstepUnsupported { analysis_substeps });
    }

    let step_min = cfg.model_interval_min as i64 * model_substeps as i64;
    let n_hours = (cfg.analysis_length_hrs as i64 * 60 / step_min) as usize + 1;
    // Case and configuration tables label columns by running analysis hour.
    let hour_labels: Vec<String> = (0..n_hours)
        .map(|k| (cfg.analysis_start_hour as usize + k).to_string())
        .collect();
    let stats: Vec<Statistic> = cfg
        .hourly_statistics
        .iter()
        .map(|s| Statistic::parse(s))
        .collect::<VerifyResult<_>>()?;

    for variable in &cfg.variables {
        let mut summary_rows = Vec::new();
        let mut configuration_tables: Vec<HourTable> =
            (0..stats.len()).map(|_| HourTable::new()).collect();

        for configuration in &cfg.configurations {
            let mut all = PairSeries::unbounded();
            let mut case_tables: Vec<HourTable> =
                (0..stats.len()).map(|_| HourTable::new()).collect();

            for case in &cfg.cases {
                let window = cfg.window_for(parse_case_time(case)?)?;
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

                // Station tables label columns by the model time step.
                let time_labels: Vec<String> = (0..n_hours)
                    .map(|k| {
                        (window.start + Duration::minutes(step_min * k as i64))
                            .format("%d_%H:%M")
                            .to_string()
                    })
                    .collect();

                for (k, &stat) in stats.iter().enumerate() {
                    let table = hourly_grid(&matched, &window, step_min, n_hours, stat)?;
                    if cfg.save_results {
                        let path = station_table_path(
                            cfg,
                            case,
                            configuration,
                            &cfg.hourly_statistics[k],
                            variable,
                        );
                        csvout::write_table(
                            &path,
                            &header("Station", &time_labels),
                            &table.csv_rows("CaseAvg", n_hours),
                        )?;
                    }
                    case_tables[k].push(case.clone(), table.column_means(n_hours));
                }
            }

            let values = compute_all(&cfg.statistics, &all.obs_array(), &all.pred_array())?;
            summary_rows.push((configuration.clone(), values));

            for (k, table) in case_tables.iter().enumerate() {
                if cfg.save_results {
                    let path =
                        case_table_path(cfg, configuration, &cfg.hourly_statistics[k], variable);
                    csvout::write_table(
                        &path,
                        &header("CaseStudy", &hour_labels),
                        &table.csv_rows("TypeAvg", n_hours),
                    )?;
                }
                configuration_tables[k].push(configuration.clone(), table.column_means(n_hours));
            }
        }

        summary::print_table(variable, &cfg.statistics, &summary_rows);
        if cfg.save_results {
            let mut head = vec!["VAR.".to_string()];
            head.extend(cfg.statistics.iter().cloned());
            let csv_rows: Vec<Vec<String>> = summary_rows
                .iter()
                .map(|(configuration, values)| csvout::row(configuration, values))
                .collect();
            csvout::write_table(&summary::summary_path(cfg, variable)?, &head, &csv_rows)?;
        }

        for (k, table) in configuration_tables.iter().enumerate() {
            let stat_name = &cfg.hourly_statistics[k];
            if cfg.save_results {
                let path = configuration_table_path(cfg, stat_name, variable);
                csvout::write_table(
                    &path,
                    &header("RunType", &hour_labels),
                    &table.csv_rows("Average", n_hours),
                )?;
                info!(stat = %stat_name, variable, path = %path.display(), "wrote rollups");

                // One line per configuration plus the overall average.
                let mut series: Vec<(String, Vec<f64>)> = table.rows.clone();
                series.push(("Average".to_string(), table.column_means(n_hours)));
                plot::line_chart(
                    &plot_path(cfg, stat_name, variable),
                    &format!("{stat_name} {variable}"),
                    &hour_labels,
                    &series,
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LeadLagConfig;
    use crate::sources::{CsvObsProvider, JsonModelProvider};
    use chrono::{TimeZone, Utc};
    use std::io::Write;
    use std::path::Path;
    use verify_common::MatchedPair;

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
            time_series_analysis: true,
            statistics: ["OBS", "PRED", "MAE"].iter().map(|s| s.to_string()).collect(),
            hourly_statistics: vec!["MAE".to_string(), "BIAS".to_string()],
            marine_fm_codes: vec![],
            mask_exempt_configurations: vec![],
            mobile_station_ids: vec![],
            lead_lag: LeadLagConfig::default(),
            model_dir: root.join("model"),
            obs_dir: root.join("obs"),
            csv_dir: root.join("out/csv"),
            plot_dir: root.join("out/plots"),
        }
    }

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
        writeln!(f, "KILG,FM-12,39.0,-75.6,2014,6,4,14,0,").unwrap();
    }

    #[test]
    fn rejects_lead_lag() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let mut cfg = test_config(dir.path());
        cfg.lead_lag = LeadLagConfig {
            enabled: true,
            offset: "+1".to_string(),
        };
        let models = JsonModelProvider::new(&cfg.model_dir);
        let observations = CsvObsProvider::new(&cfg.obs_dir);
        let mut c = LandCorrections::new();
        assert!(matches!(
            run(&cfg, &models, &observations, &mut c),
            Err(VerifyError::LeadLagUnsupported)
        ));
    }

    #[test]
    fn rejects_finer_analysis_interval() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let mut cfg = test_config(dir.path());
        cfg.analysis_interval_min = 30;
        let models = JsonModelProvider::new(&cfg.model_dir);
        let observations = CsvObsProvider::new(&cfg.obs_dir);
        let mut c = LandCorrections::new();
        assert!(matches!(
            run(&cfg, &models, &observations, &mut c),
            Err(VerifyError::SubstepUnsupported {
                analysis_substeps: 2
            })
        ));
    }

    #[test]
    fn writes_all_three_rollups_and_the_plot() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let cfg = test_config(dir.path());
        let models = JsonModelProvider::new(&cfg.model_dir);
        let observations = CsvObsProvider::new(&cfg.obs_dir);
        let mut c = LandCorrections::new();
        run(&cfg, &models, &observations, &mut c).unwrap();

        // Station x hour MAE table: errors are +1, -1, missing.
        let station = std::fs::read_to_string(station_table_path(
            &cfg,
            "2014-06-04_12:00",
            "PLAIN",
            "MAE",
            "Air_Temperature (K)",
        ))
        .unwrap();
        assert_eq!(
            station,
            "Station,04_12:00,04_13:00,04_14:00,AVERAGE\n\
             KILG,1.000,1.000,,1.000\n\
             CaseAvg,1.000,1.000,,1.000\n"
        );

        let case = std::fs::read_to_string(case_table_path(
            &cfg,
            "PLAIN",
            "BIAS",
            "Air_Temperature (K)",
        ))
        .unwrap();
        assert_eq!(
            case,
            "CaseStudy,0,1,2,AVERAGE\n\
             2014-06-04_12:00,1.000,-1.000,,0.000\n\
             TypeAvg,1.000,-1.000,,0.000\n"
        );

        let config_table = std::fs::read_to_string(configuration_table_path(
            &cfg,
            "MAE",
            "Air_Temperature (K)",
        ))
        .unwrap();
        assert!(config_table.starts_with("RunType,0,1,2,AVERAGE\nPLAIN,1.000,1.000,"));

        let png = plot_path(&cfg, "MAE", "Air_Temperature (K)");
        assert!(png.to_string_lossy().ends_with("_iv1_single_case.png"));
        let bytes = std::fs::read(&png).unwrap();
        assert_eq!(&bytes[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }

    #[test]
    fn grid_buckets_by_station_and_hour() {
        let t0 = Utc.with_ymd_and_hms(2014, 6, 4, 12, 0, 0).unwrap();
        let window = AnalysisWindow {
            start: t0,
            end: t0 + Duration::hours(2),
        };
        let mut pairs = PairSeries::unbounded();
        pairs
            .push(MatchedPair {
                station_id: "A".into(),
                time: t0,
                obs: Some(10.0),
                pred: Some(12.0),
            })
            .unwrap();
        pairs
            .push(MatchedPair {
                station_id: "B".into(),
                time: t0 + Duration::hours(2),
                obs: Some(20.0),
                pred: Some(19.0),
            })
            .unwrap();
        pairs.push(MatchedPair::missing("A", t0 + Duration::hours(1))).unwrap();
        let matched = CaseMatch {
            pairs,
            stations: vec!["A".to_string(), "B".to_string()],
        };
        let table = hourly_grid(&matched, &window, 60, 3, Statistic::Mae).unwrap();
        assert_eq!(table.rows[0].0, "A");
        assert_eq!(table.rows[0].1[0], 2.0);
        assert!(table.rows[0].1[1].is_nan());
        assert!(table.rows[0].1[2].is_nan());
        assert_eq!(table.rows[1].1[2], 1.0);
    }
}
