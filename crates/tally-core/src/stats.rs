//! Numeric helpers shared by the analyzers
//!
//! All money and percentage figures are `f64`. Rounding to two decimals uses
//! round-half-away-from-zero (`f64::round`), which is platform independent.

/// Round to two decimal places (cents / hundredths of a percent)
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator), 0.0 with fewer than 2 values
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// `part / total * 100`, rounded to two decimals; 0.0 when `total` is not positive
pub fn percentage_of(part: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    round2(part / total * 100.0)
}

/// Percent change from `first` to `last`; 0.0 when `first` is zero
pub fn percent_change(first: f64, last: f64) -> f64 {
    if first == 0.0 {
        return 0.0;
    }
    (last - first) / first * 100.0
}
