//! Verification statistics for paired observation/prediction series.
//!
//! Statistic names are resolved case-insensitively through [`Statistic`];
//! an unrecognized name is a hard error, never a silent skip. Missing data
//! is carried as NaN and ignored pairwise by every aggregate; a series with
//! nothing valid left produces NaN.

pub mod aggregate;
pub mod nan;
pub mod point;

use verify_common::{VerifyError, VerifyResult};

pub use aggregate::{
    bias, ioa, mad, mae, mape, mean_obs, mean_pred, mse, nse, pearson_r, r_squared, rmse,
};
pub use point::{absolute_error, forecast_error, percent_error, relative_error};

/// A named aggregate statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Obs,
    Pred,
    Mae,
    Bias,
    Mse,
    Rmse,
    Mad,
    Mape,
    Nse,
    Ioa,
    R,
    R2,
}

impl Statistic {
    /// Resolve a statistic name, case-insensitively, accepting the
    /// historical aliases. Unknown names are an error.
    pub fn parse(name: &str) -> VerifyResult<Self> {
        match name.trim().to_uppercase().as_str() {
            "OBS" => Ok(Self::Obs),
            "PRED" => Ok(Self::Pred),
            "MAE" => Ok(Self::Mae),
            "BIAS" | "MBE" => Ok(Self::Bias),
            "MSE" => Ok(Self::Mse),
            "RMSE" => Ok(Self::Rmse),
            "MAD" => Ok(Self::Mad),
            "MAPE" => Ok(Self::Mape),
            "NSE" | "EFFICIENCY" | "NASH SUTCLIFFE EFFICIENCY" | "NASH-SUTCLIFFE EFFICIENCY" => {
                Ok(Self::Nse)
            }
            "IOA" | "INDEX OF AGREEMENT" => Ok(Self::Ioa),
            "R" | "PEARSON" => Ok(Self::R),
            "R2" | "RTWO" => Ok(Self::R2),
            _ => Err(VerifyError::UnsupportedStatistic(name.to_string())),
        }
    }

    /// Compute this statistic over a paired series.
    pub fn compute(self, obs: &[f64], pred: &[f64]) -> f64 {
        match self {
            Self::Obs => aggregate::mean_obs(obs, pred),
            Self::Pred => aggregate::mean_pred(obs, pred),
            Self::Mae => aggregate::mae(obs, pred),
            Self::Bias => aggregate::bias(obs, pred),
            Self::Mse => aggregate::mse(obs, pred),
            Self::Rmse => aggregate::rmse(obs, pred),
            Self::Mad => aggregate::mad(obs, pred),
            Self::Mape => aggregate::mape(obs, pred),
            Self::Nse => aggregate::nse(obs, pred),
            Self::Ioa => aggregate::ioa(obs, pred),
            Self::R => aggregate::pearson_r(obs, pred),
            Self::R2 => aggregate::r_squared(obs, pred),
        }
    }

    /// Pointwise contribution of one matched pair to this statistic's
    /// hourly form, as used by the time-series rollups. Only the hourly
    /// statistics have one.
    pub fn pointwise(self, forecast: f64, actual: f64) -> VerifyResult<f64> {
        match self {
            Self::Mae => Ok(point::absolute_error(forecast, actual)),
            Self::Mape => Ok(point::percent_error(forecast, actual)),
            Self::Bias => Ok(point::forecast_error(forecast, actual)),
            Self::Rmse => Ok((point::forecast_error(forecast, actual).powi(2)).sqrt()),
            other => Err(VerifyError::UnsupportedStatistic(format!(
                "{other:?} has no hourly pointwise form"
            ))),
        }
    }
}

/// Resolve and compute every statistic in a header list.
///
/// Fails on the first unrecognized name; otherwise returns one value per
/// requested statistic, in order.
pub fn compute_all(names: &[String], obs: &[f64], pred: &[f64]) -> VerifyResult<Vec<f64>> {
    names
        .iter()
        .map(|name| Statistic::parse(name).map(|s| s.compute(obs, pred)))
        .collect()
}
