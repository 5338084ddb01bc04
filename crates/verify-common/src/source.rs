//! Data-source traits the verification core consumes, plus the JSON model
//! provider both services read their model dumps through.
//!
//! Model-file discovery and observation parsing live behind these seams;
//! the drivers only ever see a `ModelSeries` and an `ObsSet`.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::error::{VerifyError, VerifyResult};
use crate::model::ModelSeries;
use crate::obs::ObsSet;
use crate::registry::{RawFields, VariableRegistry};
use crate::window::{case_dir_name, parse_case_time};

/// Source of gridded model output.
pub trait ModelProvider {
    /// Load the field for one (case, configuration, variable, domain).
    /// A missing or ambiguous source file is a fatal configuration error.
    fn load(
        &self,
        case: &str,
        configuration: &str,
        variable: &str,
        domain: &str,
    ) -> VerifyResult<ModelSeries>;
}

/// Source of surface/marine observations.
pub trait ObsProvider {
    /// Load one case's records with the given variable's values attached.
    fn load(&self, case: &str, variable: &str) -> VerifyResult<ObsSet>;
}

/// Serialized model dump, one file per (case, configuration, domain).
#[derive(Debug, Deserialize)]
struct ModelDump {
    /// Time stamps in `%Y-%m-%d_%H:%M`.
    times: Vec<String>,
    ny: usize,
    nx: usize,
    lats: Vec<f64>,
    lons: Vec<f64>,
    /// Land mask per time step, `times * ny * nx`, 0 = water and 1 = land.
    landmask: Vec<f64>,
    /// Raw named fields, each `times * ny * nx`.
    fields: HashMap<String, Vec<f64>>,
}

/// Model provider reading pre-extracted JSON dumps.
///
/// Layout: `<model_dir>/<case>/wrfout_<configuration>_<domain>.json`. The
/// analysis variable is produced from the dump's raw fields through the
/// variable registry, so derived quantities (wind speed, direction) never
/// need their own dump entries.
pub struct JsonModelProvider {
    model_dir: PathBuf,
    registry: VariableRegistry,
}

impl JsonModelProvider {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            registry: VariableRegistry::with_builtins(),
        }
    }

    pub fn with_registry(model_dir: impl Into<PathBuf>, registry: VariableRegistry) -> Self {
        Self {
            model_dir: model_dir.into(),
            registry,
        }
    }

    fn dump_path(&self, case: &str, configuration: &str, domain: &str) -> PathBuf {
        self.model_dir
            .join(case_dir_name(case))
            .join(format!("wrfout_{configuration}_{domain}.json"))
    }
}

impl ModelProvider for JsonModelProvider {
    fn load(
        &self,
        case: &str,
        configuration: &str,
        variable: &str,
        domain: &str,
    ) -> VerifyResult<ModelSeries> {
        let path = self.dump_path(case, configuration, domain);
        if !path.is_file() {
            return Err(VerifyError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(&path)?;
        let dump: ModelDump = serde_json::from_str(&content)?;
        debug!(case, configuration, variable, path = %path.display(), "loaded model dump");

        let times = dump
            .times
            .iter()
            .map(|s| parse_case_time(s))
            .collect::<VerifyResult<Vec<_>>>()?;
        let raw = RawFields::new(dump.fields);
        let field = self.registry.extract(variable, &raw)?;
        ModelSeries::new(
            times,
            dump.ny,
            dump.nx,
            dump.lats,
            dump.lons,
            field,
            dump.landmask,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_dump(dir: &std::path::Path) {
        let case_dir = dir.join("2014_06_04_1200");
        std::fs::create_dir_all(&case_dir).unwrap();
        let dump = serde_json::json!({
            "times": ["2014-06-04_12:00", "2014-06-04_13:00"],
            "ny": 1,
            "nx": 2,
            "lats": [38.0, 38.0],
            "lons": [-76.0, -75.9],
            "landmask": [1.0, 0.0, 1.0, 0.0],
            "fields": {
                "U10": [3.0, 3.0, 0.0, 0.0],
                "V10": [4.0, 4.0, 1.0, 1.0]
            }
        });
        std::fs::write(
            case_dir.join("wrfout_PLAIN_d03.json"),
            serde_json::to_string(&dump).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn model_dump_round_trips_through_the_registry() {
        let dir = tempfile::tempdir().unwrap();
        write_dump(dir.path());

        let provider = JsonModelProvider::new(dir.path());
        let series = provider
            .load("2014-06-04_12:00", "PLAIN", "Wind_Speed (m/s)", "d03")
            .unwrap();
        assert_eq!(series.len_times(), 2);
        assert!((series.value(0, 0, 0) - 5.0).abs() < 1e-12);
        assert_eq!(series.value(1, 0, 1), 1.0);
        assert_eq!(series.land(0, 0, 1), 0.0);
    }

    #[test]
    fn custom_registry_extends_the_variable_set() {
        struct Halved;
        impl crate::registry::FieldExtractor for Halved {
            fn extract(&self, raw: &RawFields) -> VerifyResult<Vec<f64>> {
                Ok(raw.get("U10")?.iter().map(|v| v / 2.0).collect())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        write_dump(dir.path());

        let mut registry = VariableRegistry::with_builtins();
        registry.register("Half_U10", Box::new(Halved));
        let provider = JsonModelProvider::with_registry(dir.path(), registry);
        let series = provider
            .load("2014-06-04_12:00", "PLAIN", "Half_U10", "d03")
            .unwrap();
        assert_eq!(series.value(0, 0, 0), 1.5);
        assert_eq!(series.value(1, 0, 0), 0.0);
    }

    #[test]
    fn missing_model_dump_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let provider = JsonModelProvider::new(dir.path());
        assert!(matches!(
            provider.load("2014-06-04_12:00", "PLAIN", "U10", "d03"),
            Err(VerifyError::FileNotFound(_))
        ));
    }
}
