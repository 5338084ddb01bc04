//! Variable extraction registry.
//!
//! Maps an analysis variable name to a strategy that produces the field
//! array from the raw fields a model dump carries. Replaces string-keyed
//! branching with a table that is open for extension: register a new
//! extractor without touching the dispatcher.

use std::collections::HashMap;

use crate::error::{VerifyError, VerifyResult};

/// Raw named fields of one model dump, each `times * ny * nx` long.
#[derive(Debug, Clone, Default)]
pub struct RawFields {
    fields: HashMap<String, Vec<f64>>,
}

impl RawFields {
    pub fn new(fields: HashMap<String, Vec<f64>>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> VerifyResult<&[f64]> {
        self.fields
            .get(name)
            .map(|v| v.as_slice())
            .ok_or_else(|| VerifyError::UnknownVariable(name.to_string()))
    }
}

/// A strategy producing an analysis field from raw source fields.
pub trait FieldExtractor: Send + Sync {
    fn extract(&self, raw: &RawFields) -> VerifyResult<Vec<f64>>;
}

/// Pass one raw field through unchanged.
struct Direct(&'static str);

impl FieldExtractor for Direct {
    fn extract(&self, raw: &RawFields) -> VerifyResult<Vec<f64>> {
        Ok(raw.get(self.0)?.to_vec())
    }
}

/// 10-m wind speed from the U10/V10 components.
struct WindSpeed;

impl FieldExtractor for WindSpeed {
    fn extract(&self, raw: &RawFields) -> VerifyResult<Vec<f64>> {
        let u = raw.get("U10")?;
        let v = raw.get("V10")?;
        Ok(u.iter().zip(v).map(|(&u, &v)| u.hypot(v)).collect())
    }
}

/// 10-m meteorological wind direction (degrees from north, direction the
/// wind blows from) from the U10/V10 components.
struct WindDirection;

impl FieldExtractor for WindDirection {
    fn extract(&self, raw: &RawFields) -> VerifyResult<Vec<f64>> {
        let u = raw.get("U10")?;
        let v = raw.get("V10")?;
        Ok(u.iter()
            .zip(v)
            .map(|(&u, &v)| {
                if u == 0.0 && v == 0.0 {
                    f64::NAN
                } else {
                    ((-u).atan2(-v).to_degrees() + 360.0) % 360.0
                }
            })
            .collect())
    }
}

/// Registry of variable extractors, keyed by analysis variable name.
pub struct VariableRegistry {
    extractors: HashMap<String, Box<dyn FieldExtractor>>,
}

impl VariableRegistry {
    /// Registry with the fixed built-in variable set.
    pub fn with_builtins() -> Self {
        let mut r = Self {
            extractors: HashMap::new(),
        };
        r.register("Air_Temperature (K)", Box::new(Direct("T2")));
        r.register("Dewpoint_Temperature (K)", Box::new(Direct("TD2")));
        r.register("Relative Humidity (%)", Box::new(Direct("RH2")));
        r.register("Pressure (Pa)", Box::new(Direct("PSFC")));
        r.register("Potential Temperature", Box::new(Direct("THETA")));
        r.register("Wind_Speed (m/s)", Box::new(WindSpeed));
        r.register("Wind_Direction (deg)", Box::new(WindDirection));
        r.register("U10", Box::new(Direct("U10")));
        r.register("V10", Box::new(Direct("V10")));
        r
    }

    pub fn register(&mut self, name: impl Into<String>, extractor: Box<dyn FieldExtractor>) {
        self.extractors.insert(name.into(), extractor);
    }

    /// Produce the field for a variable, failing fast on unknown names.
    pub fn extract(&self, variable: &str, raw: &RawFields) -> VerifyResult<Vec<f64>> {
        let extractor = self
            .extractors
            .get(variable)
            .ok_or_else(|| VerifyError::UnknownVariable(variable.to_string()))?;
        extractor.extract(raw)
    }
}

impl Default for VariableRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
