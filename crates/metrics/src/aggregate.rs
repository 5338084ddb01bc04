//! Aggregate verification statistics over paired series.
//!
//! All functions take same-length `obs`/`pred` slices where NaN marks a
//! missing value. NaN pairs are ignored position-by-position; a series with
//! no valid pairs yields NaN rather than an error.

use crate::nan::{nanmean, nanmedian, nansum};

fn errors(obs: &[f64], pred: &[f64]) -> Vec<f64> {
    obs.iter().zip(pred).map(|(&o, &p)| p - o).collect()
}

/// Mean observed value.
pub fn mean_obs(obs: &[f64], _pred: &[f64]) -> f64 {
    nanmean(obs)
}

/// Mean predicted value.
pub fn mean_pred(_obs: &[f64], pred: &[f64]) -> f64 {
    nanmean(pred)
}

/// Mean absolute error.
pub fn mae(obs: &[f64], pred: &[f64]) -> f64 {
    let abs: Vec<f64> = errors(obs, pred).iter().map(|e| e.abs()).collect();
    nanmean(&abs)
}

/// Mean (signed) error.
pub fn bias(obs: &[f64], pred: &[f64]) -> f64 {
    nanmean(&errors(obs, pred))
}

/// Mean squared error.
pub fn mse(obs: &[f64], pred: &[f64]) -> f64 {
    let sq: Vec<f64> = errors(obs, pred).iter().map(|e| e * e).collect();
    nanmean(&sq)
}

/// Root mean squared error.
pub fn rmse(obs: &[f64], pred: &[f64]) -> f64 {
    mse(obs, pred).sqrt()
}

/// Mean absolute deviation of the errors about their median.
pub fn mad(obs: &[f64], pred: &[f64]) -> f64 {
    let errs = errors(obs, pred);
    let med = nanmedian(&errs);
    let dev: Vec<f64> = errs.iter().map(|e| (e - med).abs()).collect();
    nanmean(&dev)
}

/// Mean absolute percentage error.
pub fn mape(obs: &[f64], pred: &[f64]) -> f64 {
    let ratios: Vec<f64> = errors(obs, pred)
        .iter()
        .zip(obs)
        .map(|(e, &o)| (e / o).abs())
        .collect();
    nanmean(&ratios) * 100.0
}

/// Nash-Sutcliffe efficiency in the Legates-McCabe form (exponent 1, not
/// the classical squared form).
pub fn nse(obs: &[f64], pred: &[f64]) -> f64 {
    let mobs = nanmean(obs);
    let num: Vec<f64> = obs.iter().zip(pred).map(|(&o, &p)| (o - p).abs()).collect();
    let den: Vec<f64> = obs.iter().map(|&o| (o - mobs).abs()).collect();
    1.0 - nansum(&num) / nansum(&den)
}

/// Refined index of agreement (Willmott et al. 2012).
pub fn ioa(obs: &[f64], pred: &[f64]) -> f64 {
    let mobs = nanmean(obs);
    let part1: Vec<f64> = obs.iter().zip(pred).map(|(&o, &p)| (p - o).abs()).collect();
    let part2: Vec<f64> = obs.iter().map(|&o| (o - mobs).abs()).collect();
    let a = nansum(&part1);
    let b = 2.0 * nansum(&part2);
    if a <= b {
        1.0 - a / b
    } else {
        b / a - 1.0
    }
}

/// Pearson correlation coefficient.
pub fn pearson_r(obs: &[f64], pred: &[f64]) -> f64 {
    let mobs = nanmean(obs);
    let mpred = nanmean(pred);
    let cov: Vec<f64> = obs
        .iter()
        .zip(pred)
        .map(|(&o, &p)| (o - mobs) * (p - mpred))
        .collect();
    let var_obs: Vec<f64> = obs.iter().map(|&o| (o - mobs) * (o - mobs)).collect();
    let var_pred: Vec<f64> = pred.iter().map(|&p| (p - mpred) * (p - mpred)).collect();
    nanmean(&cov) / (nanmean(&var_obs).sqrt() * nanmean(&var_pred).sqrt())
}

/// Coefficient of determination, the square of Pearson R.
pub fn r_squared(obs: &[f64], pred: &[f64]) -> f64 {
    let r = pearson_r(obs, pred);
    r * r
}
