//! Analysis window and time-step arithmetic.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{VerifyError, VerifyResult};

/// Format used for case-study start timestamps, e.g. `2014-06-04_12:00`.
pub const CASE_TIME_FORMAT: &str = "%Y-%m-%d_%H:%M";

/// Parse a case-study start timestamp.
pub fn parse_case_time(s: &str) -> VerifyResult<DateTime<Utc>> {
    let ndt = NaiveDateTime::parse_from_str(s, CASE_TIME_FORMAT)
        .map_err(|e| VerifyError::parse("case time", format!("{s:?}: {e}")))?;
    Ok(Utc.from_utc_datetime(&ndt))
}

/// Filesystem-safe form of a case timestamp, shared by the per-case
/// directory layouts: dashes flattened to underscores, colon dropped.
pub fn case_dir_name(case: &str) -> String {
    case.replace('-', "_").replace(':', "")
}

/// The time span a verification run compares over, derived from a case's
/// start timestamp plus the configured start-hour offset and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AnalysisWindow {
    /// Build the window for one case. Fails when the window would extend
    /// past the declared model runtime.
    pub fn for_case(
        case_start: DateTime<Utc>,
        start_hour: u32,
        length_hours: u32,
        runtime_hours: u32,
    ) -> VerifyResult<Self> {
        let end_hour = start_hour + length_hours;
        if end_hour > runtime_hours {
            return Err(VerifyError::WindowExceedsRuntime {
                end_hour,
                runtime_hours,
            });
        }
        Ok(Self {
            start: case_start + Duration::hours(start_hour as i64),
            end: case_start + Duration::hours(end_hour as i64),
        })
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t <= self.end
    }
}

/// Signed lead/lag offset applied to observation timestamps before matching.
///
/// Parsed from a string that must carry an explicit sign, e.g. `"+2"` or
/// `"-1"`; the step count is multiplied by the observation interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadLag {
    /// Signed number of observation-interval steps. Zero when disabled.
    pub steps: i32,
    /// Offset in minutes (steps x observation interval).
    pub minutes: i64,
}

impl LeadLag {
    /// Lead/lag disabled.
    pub fn none() -> Self {
        Self {
            steps: 0,
            minutes: 0,
        }
    }

    /// Parse a signed step string against the observation interval.
    pub fn parse(s: &str, observation_interval_min: u32) -> VerifyResult<Self> {
        let trimmed: String = s.split_whitespace().collect();
        let steps = if let Some(rest) = trimmed.strip_prefix('+') {
            rest.parse::<i32>()
                .map_err(|_| VerifyError::MalformedLeadLag(s.to_string()))?
        } else if let Some(rest) = trimmed.strip_prefix('-') {
            -rest
                .parse::<i32>()
                .map_err(|_| VerifyError::MalformedLeadLag(s.to_string()))?
        } else {
            return Err(VerifyError::MalformedLeadLag(s.to_string()));
        };
        Ok(Self {
            steps,
            minutes: steps as i64 * observation_interval_min as i64,
        })
    }

    pub fn is_active(&self) -> bool {
        self.steps != 0
    }

    pub fn offset(&self) -> Duration {
        Duration::minutes(self.minutes)
    }

    /// Filename suffix: `_LLp<n>` for a lead, `_LLn<n>` for a lag, empty
    /// when disabled.
    pub fn file_suffix(&self) -> String {
        if self.steps > 0 {
            format!("_LLp{}", self.steps)
        } else if self.steps < 0 {
            format!("_LLn{}", self.steps.unsigned_abs())
        } else {
            String::new()
        }
    }
}

/// Compute the sub-step ratio between the model output interval and the
/// analysis interval.
///
/// Exactly one of the two intervals must be an integer multiple of the
/// other. Returns `(model_substeps, analysis_substeps)`: the stride applied
/// to model time steps and to analysis buckets respectively.
///
/// `substeps(30, 60) == (2, 1)`; `substeps(60, 30) == (1, 2)`;
/// `substeps(45, 60)` and `substeps(60, 90)` fail.
pub fn substeps(model_interval_min: u32, analysis_interval_min: u32) -> VerifyResult<(usize, usize)> {
    if model_interval_min == 0 || analysis_interval_min == 0 {
        return Err(VerifyError::IntervalMismatch {
            model_min: model_interval_min,
            analysis_min: analysis_interval_min,
        });
    }
    if analysis_interval_min % model_interval_min == 0 {
        Ok(((analysis_interval_min / model_interval_min) as usize, 1))
    } else if model_interval_min % analysis_interval_min == 0 {
        Ok((1, (model_interval_min / analysis_interval_min) as usize))
    } else {
        Err(VerifyError::IntervalMismatch {
            model_min: model_interval_min,
            analysis_min: analysis_interval_min,
        })
    }
}
