//! Statistical utility functions.

use statrs::distribution::{ContinuousCDF, Normal};

/// Two-sided standard normal critical value for a coverage `level`.
///
/// # Example
/// ```
/// use demand_forecast::utils::stats::normal_critical_value;
///
/// // 95% coverage -> z ≈ 1.96
/// let z = normal_critical_value(0.95).unwrap();
/// assert!((z - 1.96).abs() < 0.01);
/// ```
pub fn normal_critical_value(level: f64) -> Option<f64> {
    if !(level > 0.0 && level < 1.0) {
        return None;
    }
    let normal = Normal::new(0.0, 1.0).ok()?;
    Some(normal.inverse_cdf((1.0 + level) / 2.0))
}

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (n denominator).
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    (sum_sq / values.len() as f64).sqrt()
}

/// Mean of the strictly positive values, `None` when there are none.
pub fn positive_mean(values: &[f64]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .filter(|&&v| v > 0.0)
        .fold((0.0, 0usize), |(s, c), &v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Root mean square of a slice (0 for an empty slice).
pub fn root_mean_square(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    (values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn critical_value_known_levels() {
        assert_relative_eq!(normal_critical_value(0.95).unwrap(), 1.96, epsilon = 0.01);
        assert_relative_eq!(normal_critical_value(0.99).unwrap(), 2.576, epsilon = 0.01);
    }

    #[test]
    fn critical_value_rejects_bad_levels() {
        assert!(normal_critical_value(0.0).is_none());
        assert!(normal_critical_value(1.0).is_none());
        assert!(normal_critical_value(f64::NAN).is_none());
    }

    #[test]
    fn mean_calculates_correctly() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0, epsilon = 1e-10);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn population_std_dev_calculates_correctly() {
        // Population variance of [2, 4, 4, 4, 5, 5, 7, 9] = 4
        assert_relative_eq!(
            population_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]),
            2.0,
            epsilon = 1e-10
        );
        assert_relative_eq!(population_std_dev(&[3.0]), 0.0);
    }

    #[test]
    fn positive_mean_ignores_zeros() {
        assert_relative_eq!(positive_mean(&[0.0, 2.0, 0.0, 4.0]).unwrap(), 3.0);
        assert!(positive_mean(&[0.0, 0.0]).is_none());
    }

    #[test]
    fn rms_of_errors() {
        assert_relative_eq!(root_mean_square(&[3.0, -4.0]), 12.5_f64.sqrt());
        assert_eq!(root_mean_square(&[]), 0.0);
    }
}
