//! Run configuration for the front-detection driver.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use front_detect::DetectGrid;
use verify_common::{parse_case_time, VerifyError, VerifyResult};

/// Root configuration for one detection run, loaded from YAML.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectConfig {
    /// Case-study start timestamps, `%Y-%m-%d_%H:%M`.
    pub cases: Vec<String>,
    /// Model configurations to detect fronts in.
    pub configurations: Vec<String>,
    /// Registry name of the detection field.
    #[serde(default = "default_variable")]
    pub variable: String,
    /// Model domain identifier, e.g. `d03`.
    pub domain: String,

    /// Sub-domain and detection tuning.
    pub grid: DetectGrid,

    /// Also dump the coarsened theta and raw gradient grids per step.
    #[serde(default)]
    pub save_fields: bool,

    pub model_dir: PathBuf,
    pub output_dir: PathBuf,
}

fn default_variable() -> String {
    "Potential Temperature".to_string()
}

impl DetectConfig {
    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> VerifyResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DetectConfig = serde_yaml::from_str(&content)?;
        debug!(path = %path.display(), "loaded detection configuration");
        Ok(config)
    }

    /// Validate everything checkable before any model data is read. The
    /// sub-domain bounds are checked against the actual grid shape per case.
    pub fn validate(&self) -> VerifyResult<()> {
        if self.cases.is_empty() || self.configurations.is_empty() {
            return Err(VerifyError::invalid_config(
                "cases and configurations must both be non-empty",
            ));
        }
        if !self.model_dir.is_dir() {
            return Err(VerifyError::DirectoryNotFound(
                self.model_dir.display().to_string(),
            ));
        }
        for case in &self.cases {
            parse_case_time(case)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml(model_dir: &str) -> String {
        format!(
            r#"
cases: ["2014-06-04_12:00"]
configurations: ["PLAIN", "ALL"]
domain: "d03"

grid:
  level: 8
  resolution_km: 2.0
  cell_size: 2
  gradient_distance: 4
  west: 10
  east: 150
  south: 20
  north: 180
  threshold: 0.04
  min_area: 20

save_fields: true
model_dir: "{model_dir}"
output_dir: "/tmp/fronts"
"#
        )
    }

    #[test]
    fn parses_with_default_variable() {
        let dir = std::env::temp_dir();
        let cfg: DetectConfig =
            serde_yaml::from_str(&sample_yaml(&dir.display().to_string())).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.variable, "Potential Temperature");
        assert_eq!(cfg.grid.nugget(), 5);
        assert!(cfg.save_fields);
    }

    #[test]
    fn missing_model_dir_is_fatal() {
        let cfg: DetectConfig = serde_yaml::from_str(&sample_yaml("/no/such/dir")).unwrap();
        assert!(matches!(
            cfg.validate(),
            Err(VerifyError::DirectoryNotFound(_))
        ));
    }

    #[test]
    fn bad_case_timestamp_is_fatal() {
        let dir = std::env::temp_dir();
        let mut cfg: DetectConfig =
            serde_yaml::from_str(&sample_yaml(&dir.display().to_string())).unwrap();
        cfg.cases[0] = "06/04/2014".to_string();
        assert!(cfg.validate().is_err());
    }
}
