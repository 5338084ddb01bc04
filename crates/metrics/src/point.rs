//! Pointwise error measures for a single (forecast, observed) pair.
//!
//! These feed the hourly time-series rollups, where each match contributes
//! one value before station/case/configuration averaging.

/// |forecast - actual|
pub fn absolute_error(forecast: f64, actual: f64) -> f64 {
    (forecast - actual).abs()
}

/// |forecast - actual| / actual; NaN when the observation is zero.
pub fn relative_error(forecast: f64, actual: f64) -> f64 {
    if actual == 0.0 {
        return f64::NAN;
    }
    absolute_error(forecast, actual) / actual
}

/// Relative error expressed as a percentage.
pub fn percent_error(forecast: f64, actual: f64) -> f64 {
    relative_error(forecast, actual) * 100.0
}

/// Signed error, forecast - actual.
pub fn forecast_error(forecast: f64, actual: f64) -> f64 {
    forecast - actual
}
