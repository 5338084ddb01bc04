//! Error types for the verification pipeline.
//!
//! Configuration errors are fatal: the drivers abort the whole run with the
//! message carried here. Per-record data problems never appear as errors;
//! they are recorded as missing pairs and absorbed by the NaN-safe metrics.

use thiserror::Error;

/// Result type alias using VerifyError.
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Fatal errors for verification and front-detection runs.
#[derive(Debug, Error)]
pub enum VerifyError {
    // === Configuration errors ===
    #[error("directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("no file matched: {0}")]
    FileNotFound(String),

    #[error("expected exactly one observation file for {pattern}, found {found}")]
    WrongFileCount { pattern: String, found: usize },

    #[error("model interval {model_min} min and analysis interval {analysis_min} min are not even multiples of each other")]
    IntervalMismatch { model_min: u32, analysis_min: u32 },

    #[error("analysis window ends at hour {end_hour} but the model runtime is {runtime_hours} hours")]
    WindowExceedsRuntime { end_hour: u32, runtime_hours: u32 },

    #[error("unsupported statistic: {0}")]
    UnsupportedStatistic(String),

    #[error("lead/lag offset must carry a '+' or '-' sign: {0:?}")]
    MalformedLeadLag(String),

    #[error("lead/lag analysis cannot be combined with the time-series driver")]
    LeadLagUnsupported,

    #[error("time-series driver requires the analysis interval to equal the model interval (got {analysis_substeps} analysis sub-steps)")]
    SubstepUnsupported { analysis_substeps: usize },

    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // === Data shape errors ===
    #[error("matched pair sequence overflowed its expected length {expected} at station {station}, time {time}")]
    PairOverflow {
        expected: usize,
        station: String,
        time: String,
    },

    #[error("model time steps are not evenly spaced: {0}")]
    UnevenTimeSteps(String),

    #[error("model field shape mismatch: {0}")]
    ShapeMismatch(String),

    // === I/O and parsing ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },
}

impl VerifyError {
    /// Create a Parse error.
    pub fn parse(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
