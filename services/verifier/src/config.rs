//! Run configuration for the verification service.
//!
//! Loaded from a single YAML file. Everything that can be checked before
//! touching data is checked in [`VerifyConfig::validate`]; a bad run
//! configuration aborts before any case is loaded.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use matcher::MatchSettings;
use verify_common::{
    parse_case_time, substeps, AnalysisWindow, LeadLag, VerifyError, VerifyResult,
};

/// Root configuration for one verification run.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyConfig {
    /// Case-study start timestamps, `%Y-%m-%d_%H:%M`.
    pub cases: Vec<String>,
    /// Model configurations (sensitivity-test variants) under comparison.
    pub configurations: Vec<String>,
    /// Observation variables to verify, by registry name.
    pub variables: Vec<String>,
    /// Model domain identifier, e.g. `d03`.
    pub domain: String,

    pub runtime_hours: u32,
    pub model_interval_min: u32,
    pub observation_interval_min: u32,

    pub analysis_start_hour: u32,
    pub analysis_length_hrs: u32,
    pub analysis_interval_min: u32,

    #[serde(default)]
    pub single_point_analysis: bool,
    #[serde(default = "default_true")]
    pub save_results: bool,
    #[serde(default)]
    pub time_series_analysis: bool,

    /// Summary-table statistic names, in output order.
    pub statistics: Vec<String>,
    /// Hourly statistics for the time-series rollups.
    #[serde(default = "default_hourly_statistics")]
    pub hourly_statistics: Vec<String>,

    /// FM codes marking marine observing systems.
    #[serde(default)]
    pub marine_fm_codes: Vec<String>,
    /// Configurations exempt from land-correction reporting.
    #[serde(default)]
    pub mask_exempt_configurations: Vec<String>,
    /// Stations allowed to report without a position.
    #[serde(default)]
    pub mobile_station_ids: Vec<String>,

    #[serde(default)]
    pub lead_lag: LeadLagConfig,

    pub model_dir: PathBuf,
    pub obs_dir: PathBuf,
    pub csv_dir: PathBuf,
    pub plot_dir: PathBuf,
}

/// Lead/lag toggle plus the signed step string, e.g. `"+2"`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadLagConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub offset: String,
}

fn default_true() -> bool {
    true
}

fn default_hourly_statistics() -> Vec<String> {
    ["MAE", "BIAS", "MAPE", "RMSE"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl VerifyConfig {
    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> VerifyResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VerifyConfig = serde_yaml::from_str(&content)?;
        debug!(path = %path.display(), "loaded run configuration");
        Ok(config)
    }

    /// Validate everything checkable before any data is read.
    pub fn validate(&self) -> VerifyResult<()> {
        if self.cases.is_empty() || self.configurations.is_empty() || self.variables.is_empty() {
            return Err(VerifyError::invalid_config(
                "cases, configurations and variables must all be non-empty",
            ));
        }
        for dir in [&self.model_dir, &self.obs_dir] {
            if !dir.is_dir() {
                return Err(VerifyError::DirectoryNotFound(dir.display().to_string()));
            }
        }
        // Fails on uneven interval ratios.
        substeps(self.model_interval_min, self.analysis_interval_min)?;
        for name in self.statistics.iter().chain(&self.hourly_statistics) {
            metrics::Statistic::parse(name)?;
        }
        for case in &self.cases {
            let start = parse_case_time(case)?;
            // Window construction checks the runtime bound.
            self.window_for(start)?;
        }
        self.lead_lag()?;
        Ok(())
    }

    /// The analysis window for one case.
    pub fn window_for(&self, case_start: DateTime<Utc>) -> VerifyResult<AnalysisWindow> {
        AnalysisWindow::for_case(
            case_start,
            self.analysis_start_hour,
            self.analysis_length_hrs,
            self.runtime_hours,
        )
    }

    /// The configured lead/lag offset, or the inactive offset when disabled.
    pub fn lead_lag(&self) -> VerifyResult<LeadLag> {
        if self.lead_lag.enabled {
            LeadLag::parse(&self.lead_lag.offset, self.observation_interval_min)
        } else {
            Ok(LeadLag::none())
        }
    }

    /// Matching-loop settings for one case window.
    pub fn match_settings(&self, window: AnalysisWindow) -> VerifyResult<MatchSettings> {
        let (model_substeps, _) = substeps(self.model_interval_min, self.analysis_interval_min)?;
        Ok(MatchSettings {
            window,
            lead_lag: self.lead_lag()?,
            model_substeps,
            model_interval_min: self.model_interval_min,
            single_point: self.single_point_analysis,
            marine_codes: self.marine_fm_codes.clone(),
            mask_exempt_configurations: self.mask_exempt_configurations.clone(),
            mobile_station_ids: self.mobile_station_ids.clone(),
        })
    }

    /// Case tag used in output filenames: the case count when comparing
    /// several cases, otherwise the single case timestamp with the dashes
    /// flattened.
    pub fn case_tag(&self) -> String {
        if self.cases.len() > 1 {
            self.cases.len().to_string()
        } else {
            self.cases[0].replace('-', "_")
        }
    }

    /// Filesystem-safe form of a case timestamp, shared by the per-case
    /// directory layouts.
    pub fn case_dir_name(case: &str) -> String {
        verify_common::case_dir_name(case)
    }

    /// Variable name shortened for filenames, as the first ten characters.
    pub fn var_short(variable: &str) -> String {
        variable.chars().take(10).collect::<String>().trim().to_string()
    }

    /// First whitespace-separated word of a variable name, for the summary
    /// filename.
    pub fn var_word(variable: &str) -> String {
        variable
            .split_whitespace()
            .next()
            .unwrap_or(variable)
            .to_string()
    }

    /// Common `_s<start>_len<len>_freq<freq>` filename segment.
    pub fn window_tag(&self) -> String {
        format!(
            "_s{}_len{}_freq{}",
            self.analysis_start_hour, self.analysis_length_hrs, self.analysis_interval_min
        )
    }
}
