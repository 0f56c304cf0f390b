//! Accuracy metrics for forecast evaluation.
//!
//! All metrics stay finite when actual values are zero or near zero, which
//! plain MAPE does not.

use crate::error::{ForecastError, Result};
use crate::utils::stats::root_mean_square;
use serde::Serialize;

/// Upper bound on reported MASE.
pub const MASE_CEILING: f64 = 10.0;

/// Smallest naive MAE used for scaling, relative to the mean actual level.
///
/// A seasonal naive forecast can be exact on a clean pattern; the model is
/// then judged against an error of 0.1% of volume instead of zero.
pub const NAIVE_MAE_FLOOR: f64 = 1e-3;

/// Keeps sMAPE defined when actual and forecast are both zero.
const SMAPE_EPSILON: f64 = 1e-10;

/// Errors below this are treated as exactly zero.
const ZERO_TOLERANCE: f64 = 1e-12;

/// Accuracy metrics for evaluating forecast performance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccuracyMetrics {
    /// Symmetric Mean Absolute Percentage Error (0-200)
    pub smape: f64,
    /// Mean Absolute Scaled Error against a seasonal naive forecast
    pub mase: f64,
    /// Mean Absolute Error in the metric's native units
    pub mae: f64,
    /// Volume-weighted Mean Absolute Percentage Error
    pub weighted_mape: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Number of forecast/actual pairs evaluated
    pub samples: usize,
}

impl AccuracyMetrics {
    /// Metrics for an evaluation that had nothing to score.
    pub fn empty() -> Self {
        Self {
            smape: 0.0,
            mase: 0.0,
            mae: 0.0,
            weighted_mape: 0.0,
            rmse: 0.0,
            samples: 0,
        }
    }
}

/// Calculate accuracy metrics between actual and predicted values.
///
/// MASE scales by the naive forecast that repeats the actual value from
/// `seasonal_period` steps earlier (lag 1 when the window is too short).
///
/// # Arguments
/// * `actual` - Actual observed values
/// * `predicted` - Predicted/forecast values
/// * `seasonal_period` - Optional seasonal period for MASE calculation
pub fn calculate_metrics(
    actual: &[f64],
    predicted: &[f64],
    seasonal_period: Option<usize>,
) -> Result<AccuracyMetrics> {
    check_lengths(actual, predicted)?;

    let n = actual.len();
    let period = seasonal_period.unwrap_or(1).max(1);
    let lag = if n > period { period } else { 1 };
    let naive_mae = if n > lag {
        actual
            .iter()
            .skip(lag)
            .zip(actual.iter())
            .map(|(curr, prev)| (curr - prev).abs())
            .sum::<f64>()
            / (n - lag) as f64
    } else {
        0.0
    };

    Ok(assemble(actual, predicted, naive_mae))
}

/// Calculate accuracy metrics with explicit naive baseline predictions.
///
/// `baseline[i]` is the naive forecast for `actual[i]`; used by walk-forward
/// validation where the seasonal naive value comes from the training prefix.
pub fn calculate_metrics_with_baseline(
    actual: &[f64],
    predicted: &[f64],
    baseline: &[f64],
) -> Result<AccuracyMetrics> {
    check_lengths(actual, predicted)?;
    if baseline.len() != actual.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: baseline.len(),
        });
    }

    Ok(assemble(actual, predicted, mae(actual, baseline)))
}

fn check_lengths(actual: &[f64], predicted: &[f64]) -> Result<()> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }
    Ok(())
}

fn assemble(actual: &[f64], predicted: &[f64], naive_mae: f64) -> AccuracyMetrics {
    let model_mae = mae(actual, predicted);
    let level = actual.iter().map(|a| a.abs()).sum::<f64>() / actual.len() as f64;
    AccuracyMetrics {
        smape: smape(actual, predicted),
        mase: scaled_error(model_mae, naive_mae, level),
        mae: model_mae,
        weighted_mape: weighted_mape(actual, predicted),
        rmse: rmse(actual, predicted),
        samples: actual.len(),
    }
}

/// MAE ratio against the naive MAE, floored at a share of `level`.
fn scaled_error(model_mae: f64, naive_mae: f64, level: f64) -> f64 {
    let scale = naive_mae.max(NAIVE_MAE_FLOOR * level);
    if scale < ZERO_TOLERANCE {
        // All-zero actuals with an exact naive baseline
        if model_mae < ZERO_TOLERANCE {
            0.0
        } else {
            MASE_CEILING
        }
    } else {
        (model_mae / scale).min(MASE_CEILING)
    }
}

/// Calculate MAE between two slices.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate RMSE between two slices.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let errors: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();
    root_mean_square(&errors)
}

/// Calculate SMAPE between two slices.
///
/// `mean(2|a - f| / (|a| + |f| + ε)) * 100`; a period where both are zero
/// contributes nothing.
pub fn smape(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let n = actual.len() as f64;
    actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| 2.0 * (a - p).abs() / (a.abs() + p.abs() + SMAPE_EPSILON))
        .sum::<f64>()
        * 100.0
        / n
}

/// Calculate volume-weighted MAPE between two slices.
///
/// Each period's absolute percentage error is weighted by its share of total
/// actual volume, which reduces to `sum|a - f| / sum|a| * 100`. With zero
/// total volume the result is 0 for a perfect forecast and 100 otherwise.
pub fn weighted_mape(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let volume: f64 = actual.iter().map(|a| a.abs()).sum();
    let abs_error: f64 = actual
        .iter()
        .zip(predicted.iter())
        .map(|(a, p)| (a - p).abs())
        .sum();

    if volume < ZERO_TOLERANCE {
        if abs_error < ZERO_TOLERANCE {
            0.0
        } else {
            100.0
        }
    } else {
        100.0 * abs_error / volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn calculate_metrics_perfect_prediction() {
        let actual = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let metrics = calculate_metrics(&actual, &actual, None).unwrap();

        assert_relative_eq!(metrics.mae, 0.0, epsilon = 1e-10);
        assert_relative_eq!(metrics.rmse, 0.0, epsilon = 1e-10);
        assert_relative_eq!(metrics.smape, 0.0, epsilon = 1e-10);
        assert_relative_eq!(metrics.weighted_mape, 0.0, epsilon = 1e-10);
        assert_relative_eq!(metrics.mase, 0.0, epsilon = 1e-10);
        assert_eq!(metrics.samples, 5);
    }

    #[test]
    fn calculate_metrics_known_values() {
        let actual = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let predicted = vec![1.5, 2.5, 2.5, 4.5, 4.5];

        let metrics = calculate_metrics(&actual, &predicted, None).unwrap();

        assert_relative_eq!(metrics.mae, 0.5, epsilon = 1e-10);
        assert_relative_eq!(metrics.rmse, 0.5, epsilon = 1e-10);
        // 2.5 absolute error over 15 units of volume
        assert_relative_eq!(metrics.weighted_mape, 100.0 * 2.5 / 15.0, epsilon = 1e-10);
        // Lag-1 naive MAE is 1.0
        assert_relative_eq!(metrics.mase, 0.5, epsilon = 1e-10);
    }

    #[test]
    fn metrics_stay_finite_with_zero_actuals() {
        let actual = vec![0.0, 0.0, 5.0, 0.0];
        let predicted = vec![0.0, 1.0, 4.0, 0.0];

        let metrics = calculate_metrics(&actual, &predicted, None).unwrap();

        assert!(metrics.smape.is_finite());
        assert!(metrics.weighted_mape.is_finite());
        assert!(metrics.mase.is_finite());
        // Second period: 2 * 1 / 1 = 2 → 200%, third: 2 / 9; averaged over 4
        assert_relative_eq!(
            metrics.smape,
            (200.0 + 200.0 / 9.0) / 4.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn all_zero_actuals_and_forecasts() {
        let metrics = calculate_metrics(&[0.0; 6], &[0.0; 6], Some(3)).unwrap();
        assert_eq!(metrics.smape, 0.0);
        assert_eq!(metrics.mase, 0.0);
        assert_eq!(metrics.weighted_mape, 0.0);
    }

    #[test]
    fn mase_is_capped_when_naive_is_perfect() {
        let metrics = calculate_metrics(&[4.0; 6], &[5.0; 6], Some(2)).unwrap();
        assert_eq!(metrics.mase, MASE_CEILING);
        assert_eq!(weighted_mape(&[0.0, 0.0], &[1.0, 0.0]), 100.0);
    }

    #[test]
    fn rounding_residue_against_exact_naive_stays_small() {
        let actual = [100.0, 130.0, 100.0, 70.0, 100.0, 130.0, 100.0, 70.0];
        let predicted: Vec<f64> = actual.iter().map(|a| a + 0.002).collect();

        // Lag-4 naive is exact, so the scale is 0.1% of the mean level of 100
        let metrics = calculate_metrics(&actual, &predicted, Some(4)).unwrap();
        assert_relative_eq!(metrics.mase, 0.02, epsilon = 1e-9);
    }

    #[test]
    fn all_zero_actuals_with_wrong_forecast() {
        let metrics = calculate_metrics(&[0.0; 4], &[1.0; 4], Some(2)).unwrap();
        assert_eq!(metrics.mase, MASE_CEILING);
    }

    #[test]
    fn mase_with_seasonal_period() {
        let actual = vec![1.0, 2.0, 3.0, 4.0, 1.5, 2.5, 3.5, 4.5];
        let predicted = vec![1.1, 2.1, 3.1, 4.1, 1.6, 2.6, 3.6, 4.6];

        let metrics = calculate_metrics(&actual, &predicted, Some(4)).unwrap();

        // Seasonal naive errors are all 0.5, model errors all 0.1
        assert_relative_eq!(metrics.mase, 0.2, epsilon = 1e-10);
    }

    #[test]
    fn baseline_metrics_use_supplied_naive() {
        let actual = vec![10.0, 12.0];
        let predicted = vec![11.0, 12.0];
        let naive = vec![8.0, 10.0];

        let metrics = calculate_metrics_with_baseline(&actual, &predicted, &naive).unwrap();
        assert_relative_eq!(metrics.mase, 0.25, epsilon = 1e-10);

        assert!(matches!(
            calculate_metrics_with_baseline(&actual, &predicted, &[1.0]),
            Err(ForecastError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn calculate_metrics_dimension_mismatch() {
        let result = calculate_metrics(&[1.0, 2.0, 3.0], &[1.0, 2.0], None);
        assert!(matches!(
            result,
            Err(ForecastError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn calculate_metrics_empty_data() {
        let result = calculate_metrics(&[], &[], None);
        assert!(matches!(result, Err(ForecastError::EmptyData)));
    }

    #[test]
    fn smape_is_scale_invariant() {
        let actual = [10.0, 0.0, 7.0, 3.0];
        let predicted = [12.0, 1.0, 6.0, 3.0];
        let scaled_a: Vec<f64> = actual.iter().map(|v| v * 250.0).collect();
        let scaled_p: Vec<f64> = predicted.iter().map(|v| v * 250.0).collect();

        assert_relative_eq!(
            smape(&actual, &predicted),
            smape(&scaled_a, &scaled_p),
            epsilon = 1e-6
        );
    }

    #[test]
    fn standalone_functions_reject_mismatch() {
        assert!(mae(&[1.0], &[]).is_nan());
        assert!(smape(&[], &[]).is_nan());
        assert!(weighted_mape(&[1.0, 2.0], &[1.0]).is_nan());
    }
}
