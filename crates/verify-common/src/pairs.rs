//! Matched observation/prediction pairs.
//!
//! Missing sides are a first-class `None`, not a float sentinel; NaN only
//! appears at the metrics boundary where the aggregate formulas expect it.

use chrono::{DateTime, Utc};

use crate::error::{VerifyError, VerifyResult};

/// One (model time-step x station) comparison.
///
/// A pair exists only where the matcher found a model step for the
/// observation time; either side may still be missing. Station-times with
/// no model match at all produce no pair.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedPair {
    pub station_id: String,
    /// Model-side timestamp of the comparison.
    pub time: DateTime<Utc>,
    pub obs: Option<f64>,
    pub pred: Option<f64>,
}

impl MatchedPair {
    pub fn missing(station_id: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            station_id: station_id.into(),
            time,
            obs: None,
            pred: None,
        }
    }

    pub fn is_missing(&self) -> bool {
        self.obs.is_none() || self.pred.is_none()
    }
}

/// A capped sequence of matched pairs.
///
/// The capacity is the precomputed expected count (distinct stations x
/// expected steps); exceeding it is a defect in the matching loop and is
/// reported, never silently absorbed.
#[derive(Debug, Clone, Default)]
pub struct PairSeries {
    pairs: Vec<MatchedPair>,
    cap: usize,
}

impl PairSeries {
    pub fn with_capacity(expected: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(expected),
            cap: expected,
        }
    }

    /// Unbounded series, used when concatenating already-validated runs.
    pub fn unbounded() -> Self {
        Self {
            pairs: Vec::new(),
            cap: usize::MAX,
        }
    }

    pub fn push(&mut self, pair: MatchedPair) -> VerifyResult<()> {
        if self.pairs.len() >= self.cap {
            return Err(VerifyError::PairOverflow {
                expected: self.cap,
                station: pair.station_id,
                time: pair.time.to_rfc3339(),
            });
        }
        self.pairs.push(pair);
        Ok(())
    }

    pub fn extend_from(&mut self, other: &PairSeries) {
        self.pairs.extend_from_slice(&other.pairs);
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchedPair> {
        self.pairs.iter()
    }

    /// Observation values with missing entries marked NaN.
    pub fn obs_array(&self) -> Vec<f64> {
        self.pairs
            .iter()
            .map(|p| p.obs.unwrap_or(f64::NAN))
            .collect()
    }

    /// Prediction values with missing entries marked NaN.
    pub fn pred_array(&self) -> Vec<f64> {
        self.pairs
            .iter()
            .map(|p| p.pred.unwrap_or(f64::NAN))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn overflow_is_an_error() {
        let t = Utc.with_ymd_and_hms(2014, 6, 4, 12, 0, 0).unwrap();
        let mut s = PairSeries::with_capacity(1);
        s.push(MatchedPair::missing("A", t)).unwrap();
        let err = s.push(MatchedPair::missing("B", t)).unwrap_err();
        assert!(matches!(err, VerifyError::PairOverflow { expected: 1, .. }));
    }

    #[test]
    fn arrays_mark_missing_as_nan() {
        let t = Utc.with_ymd_and_hms(2014, 6, 4, 12, 0, 0).unwrap();
        let mut s = PairSeries::with_capacity(2);
        s.push(MatchedPair {
            station_id: "A".into(),
            time: t,
            obs: Some(10.0),
            pred: Some(12.0),
        })
        .unwrap();
        s.push(MatchedPair::missing("A", t)).unwrap();
        let obs = s.obs_array();
        let pred = s.pred_array();
        assert_eq!(obs[0], 10.0);
        assert_eq!(pred[0], 12.0);
        assert!(obs[1].is_nan() && pred[1].is_nan());
    }
}
