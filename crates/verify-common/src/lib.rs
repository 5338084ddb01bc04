//! Common types and utilities shared across the wrf-verify crates.

pub mod error;
pub mod model;
pub mod obs;
pub mod pairs;
pub mod registry;
pub mod source;
pub mod window;

pub use error::{VerifyError, VerifyResult};
pub use model::{DomainBounds, ModelSeries};
pub use obs::{ObsRecord, ObsSet};
pub use pairs::{MatchedPair, PairSeries};
pub use registry::{FieldExtractor, RawFields, VariableRegistry};
pub use source::{JsonModelProvider, ModelProvider, ObsProvider};
pub use window::{case_dir_name, parse_case_time, substeps, AnalysisWindow, LeadLag, CASE_TIME_FORMAT};
