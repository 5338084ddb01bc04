//! NaN-ignoring reductions.
//!
//! Every reducer skips NaN entries and yields NaN (not an error) when no
//! valid entry remains. This is the contract the aggregate statistics and
//! the driver rollups rely on for missing data.

/// Mean of the non-NaN entries; NaN when there are none.
pub fn nanmean(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for &v in values {
        if !v.is_nan() {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Sum of the non-NaN entries; NaN when there are none.
pub fn nansum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for &v in values {
        if !v.is_nan() {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum
    }
}

/// Median of the non-NaN entries; NaN when there are none.
pub fn nanmedian(values: &[f64]) -> f64 {
    let mut valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if valid.is_empty() {
        return f64::NAN;
    }
    valid.sort_by(|a, b| a.total_cmp(b));
    let n = valid.len();
    if n % 2 == 1 {
        valid[n / 2]
    } else {
        (valid[n / 2 - 1] + valid[n / 2]) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_skips_nan() {
        assert_eq!(nanmean(&[1.0, f64::NAN, 3.0]), 2.0);
    }

    #[test]
    fn all_nan_yields_nan() {
        assert!(nanmean(&[f64::NAN, f64::NAN]).is_nan());
        assert!(nansum(&[f64::NAN]).is_nan());
        assert!(nanmedian(&[]).is_nan());
    }

    #[test]
    fn median_even_and_odd() {
        assert_eq!(nanmedian(&[5.0, 2.0, 3.0, 8.0, 9.0, -2.0]), 4.0);
        assert_eq!(nanmedian(&[3.0, f64::NAN, 1.0, 2.0]), 2.0);
    }
}
