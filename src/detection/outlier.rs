//! Outlier detection and winsorization.
//!
//! A point is an outlier when it lies more than `sensitivity` standard
//! deviations from the mean of the whole series. Flagged points are capped
//! instead of removed, so positions line up with the seasonal cycle. The cap
//! is the same `sensitivity` band taken around the points that were not
//! flagged. At the default sensitivity and above, a capped value then sits
//! inside the band of the treated series and a second treatment leaves it
//! alone.

use crate::utils::stats::{mean, population_std_dev};
use serde::Serialize;
use tracing::{debug, warn};

/// Default multiplier on the standard deviation.
pub const DEFAULT_SENSITIVITY: f64 = 2.0;

/// Relative tolerance on the outlier boundary.
const TOLERANCE: f64 = 1e-9;

/// How strongly the treatment changed the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierImpact {
    Low,
    Medium,
    High,
}

/// Capping boundaries applied to flagged points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

/// Result of outlier treatment.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierReport {
    /// Flagged positions, ascending.
    pub outlier_indices: Vec<usize>,
    /// Input values at the flagged positions.
    pub original_values: Vec<f64>,
    /// Copy of the input with flagged values capped. Same length as the input.
    pub winsorized: Vec<f64>,
    /// Capping boundaries, when anything was flagged.
    pub bounds: Option<Bounds>,
    /// Sensitivity actually applied.
    pub sensitivity: f64,
}

impl OutlierReport {
    fn untouched(series: &[f64], sensitivity: f64) -> Self {
        Self {
            outlier_indices: Vec::new(),
            original_values: Vec::new(),
            winsorized: series.to_vec(),
            bounds: None,
            sensitivity,
        }
    }

    /// Get the number of outliers detected.
    pub fn outlier_count(&self) -> usize {
        self.outlier_indices.len()
    }

    /// Check if a specific index is an outlier.
    pub fn is_outlier(&self, index: usize) -> bool {
        self.outlier_indices.binary_search(&index).is_ok()
    }

    /// Share of flagged points in percent.
    pub fn outlier_percentage(&self) -> f64 {
        if self.winsorized.is_empty() {
            0.0
        } else {
            100.0 * self.outlier_indices.len() as f64 / self.winsorized.len() as f64
        }
    }

    /// Total absolute adjustment relative to the total original volume.
    pub fn adjustment_ratio(&self) -> f64 {
        let (moved, shift) = self
            .outlier_indices
            .iter()
            .zip(&self.original_values)
            .fold((0.0, 0.0), |(moved, shift), (&i, &orig)| {
                let delta = orig - self.winsorized[i];
                (moved + delta.abs(), shift + delta)
            });
        let volume = self.winsorized.iter().sum::<f64>() + shift;
        if volume.abs() < f64::EPSILON {
            0.0
        } else {
            moved / volume.abs()
        }
    }

    /// Classify how much the treatment moved the series.
    pub fn impact(&self) -> OutlierImpact {
        if self.outlier_indices.is_empty() {
            return OutlierImpact::Low;
        }
        let ratio = self.adjustment_ratio();
        if ratio < 0.05 {
            OutlierImpact::Low
        } else if ratio < 0.15 {
            OutlierImpact::Medium
        } else {
            OutlierImpact::High
        }
    }
}

/// Detect outliers and produce a winsorized copy of `series`.
///
/// Never fails: an empty, single-point or constant series comes back
/// unchanged with no outliers. A non-positive or non-finite sensitivity is
/// replaced by [`DEFAULT_SENSITIVITY`].
///
/// # Example
/// ```
/// use demand_forecast::detection::detect_and_treat;
///
/// let mut series = vec![100.0; 24];
/// series[12] = 10_000.0;
///
/// let report = detect_and_treat(&series, 2.0);
/// assert_eq!(report.outlier_indices, vec![12]);
/// assert!(report.winsorized[12] < 1_000.0);
/// assert_eq!(report.winsorized.len(), series.len());
/// ```
pub fn detect_and_treat(series: &[f64], sensitivity: f64) -> OutlierReport {
    let sensitivity = if sensitivity.is_finite() && sensitivity > 0.0 {
        sensitivity
    } else {
        warn!(sensitivity, "invalid outlier sensitivity, using default");
        DEFAULT_SENSITIVITY
    };

    if series.len() < 2 {
        return OutlierReport::untouched(series, sensitivity);
    }

    let mu = mean(series);
    let sigma = population_std_dev(series);
    let outlier_indices: Vec<usize> = series
        .iter()
        .enumerate()
        .filter(|(_, &x)| exceeds(x, mu, sigma, sensitivity))
        .map(|(i, _)| i)
        .collect();

    if outlier_indices.is_empty() {
        return OutlierReport::untouched(series, sensitivity);
    }

    let bounds = capping_bounds(series, &outlier_indices, mu, sigma, sensitivity);
    let mut winsorized = series.to_vec();
    for &i in &outlier_indices {
        winsorized[i] = winsorized[i].clamp(bounds.lower, bounds.upper);
    }
    debug!(
        flagged = outlier_indices.len(),
        mean = mu,
        std_dev = sigma,
        lower = bounds.lower,
        upper = bounds.upper,
        "outliers capped"
    );

    let original_values = outlier_indices.iter().map(|&i| series[i]).collect();
    OutlierReport {
        outlier_indices,
        original_values,
        winsorized,
        bounds: Some(bounds),
        sensitivity,
    }
}

/// The sensitivity band around the points that were not flagged.
///
/// Falls back to the whole-series band when every point was flagged.
fn capping_bounds(series: &[f64], flagged: &[usize], mu: f64, sigma: f64, k: f64) -> Bounds {
    let retained: Vec<f64> = series
        .iter()
        .enumerate()
        .filter(|(i, _)| flagged.binary_search(i).is_err())
        .map(|(_, &v)| v)
        .collect();
    let (mu, sigma) = if retained.is_empty() {
        (mu, sigma)
    } else {
        (mean(&retained), population_std_dev(&retained))
    };
    Bounds {
        lower: mu - k * sigma,
        upper: mu + k * sigma,
    }
}

fn exceeds(x: f64, mu: f64, sigma: f64, k: f64) -> bool {
    (x - mu).abs() - k * sigma > TOLERANCE * mu.abs().max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spike_series() -> Vec<f64> {
        let mut values = vec![100.0; 24];
        values[12] = 10_000.0;
        values
    }

    #[test]
    fn single_spike_is_flagged_and_capped() {
        let report = detect_and_treat(&spike_series(), 2.0);

        assert_eq!(report.outlier_indices, vec![12]);
        assert_eq!(report.original_values, vec![10_000.0]);
        assert_relative_eq!(report.winsorized[12], 100.0, epsilon = 1e-6);
        assert_eq!(report.impact(), OutlierImpact::High);
    }

    #[test]
    fn non_flagged_positions_are_copied() {
        let series = spike_series();
        let report = detect_and_treat(&series, 2.0);
        for i in (0..series.len()).filter(|&i| i != 12) {
            assert_eq!(report.winsorized[i], series[i]);
        }
    }

    #[test]
    fn low_side_outlier_is_raised() {
        let mut series = vec![100.0; 24];
        series[5] = 0.0;
        let report = detect_and_treat(&series, 2.0);

        assert_eq!(report.outlier_indices, vec![5]);
        assert!(report.winsorized[5] > 0.0);
    }

    #[test]
    fn constant_series_has_no_outliers() {
        let report = detect_and_treat(&[42.0; 12], 2.0);
        assert_eq!(report.outlier_count(), 0);
        assert!(report.bounds.is_none());
        assert_eq!(report.winsorized, vec![42.0; 12]);
    }

    #[test]
    fn all_zero_series_has_no_outliers() {
        let report = detect_and_treat(&[0.0; 24], 2.0);
        assert_eq!(report.outlier_count(), 0);
        assert_eq!(report.impact(), OutlierImpact::Low);
    }

    #[test]
    fn short_series_is_returned_unchanged() {
        assert!(detect_and_treat(&[], 2.0).winsorized.is_empty());

        let report = detect_and_treat(&[7.0], 2.0);
        assert_eq!(report.winsorized, vec![7.0]);
        assert_eq!(report.outlier_count(), 0);
    }

    #[test]
    fn higher_sensitivity_flags_fewer_points() {
        let series = vec![10.0, 11.0, 9.0, 10.0, 12.0, 10.0, 9.0, 11.0, 10.0, 30.0];
        assert_eq!(detect_and_treat(&series, 2.0).outlier_indices, vec![9]);
        assert_eq!(detect_and_treat(&series, 10.0).outlier_count(), 0);
    }

    #[test]
    fn invalid_sensitivity_uses_default() {
        let report = detect_and_treat(&spike_series(), -1.0);
        assert_eq!(report.sensitivity, DEFAULT_SENSITIVITY);
        assert_eq!(report.outlier_indices, vec![12]);
    }

    #[test]
    fn treatment_is_idempotent() {
        let series: Vec<f64> = (0..36)
            .map(|i| 100.0 + 15.0 * ((i as f64) * 1.7).sin() + if i == 20 { 400.0 } else { 0.0 })
            .collect();
        let first = detect_and_treat(&series, 2.0);
        assert!(first.is_outlier(20));

        let second = detect_and_treat(&first.winsorized, 2.0);
        assert_eq!(second.outlier_count(), 0);
        assert_eq!(second.winsorized, first.winsorized);
    }

    #[test]
    fn seasonal_peaks_survive_a_spike() {
        let mut series = vec![100.0; 36];
        for december in [11, 23, 35] {
            series[december] = 180.0;
        }
        series[17] = 5_000.0;

        let report = detect_and_treat(&series, 2.0);

        assert_eq!(report.outlier_indices, vec![17]);
        for december in [11, 23, 35] {
            assert_eq!(report.winsorized[december], 180.0);
        }
        // Capped to the band of the remaining 35 months
        let bounds = report.bounds.unwrap();
        assert_relative_eq!(report.winsorized[17], bounds.upper);
        assert!(bounds.upper > 150.0 && bounds.upper < 155.0);
    }

    #[test]
    fn second_treatment_keeps_capped_values() {
        let mut series = vec![100.0; 36];
        for december in [11, 23, 35] {
            series[december] = 180.0;
        }
        series[17] = 5_000.0;

        let first = detect_and_treat(&series, 2.0);
        let second = detect_and_treat(&first.winsorized, 2.0);

        assert!(!second.is_outlier(17));
        assert_eq!(second.winsorized[17], first.winsorized[17]);
    }

    #[test]
    fn report_helpers() {
        let report = detect_and_treat(&spike_series(), 2.0);
        assert!(report.is_outlier(12));
        assert!(!report.is_outlier(11));
        assert_relative_eq!(report.outlier_percentage(), 100.0 / 24.0, epsilon = 1e-10);
        // 9_900 of 12_300 units were moved
        assert_relative_eq!(report.adjustment_ratio(), 9_900.0 / 12_300.0, epsilon = 1e-6);
    }
}
