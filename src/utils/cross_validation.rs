//! Walk-forward validation for time series forecasting.
//!
//! The training window starts at `min_train_size` points and only ever grows
//! forward. Each fold forecasts the next `step` points from the prefix before
//! them, so no fold sees data at or after the indices it forecasts.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::baseline::SeasonalNaive;
use crate::models::Forecaster;
use crate::utils::metrics::calculate_metrics_with_baseline;
use crate::validation::{AccuracyReport, ClassificationPolicy};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for walk-forward validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkForwardConfig {
    /// Length of the first training prefix.
    pub min_train_size: usize,
    /// Points forecast per fold; the prefix grows by the same amount.
    pub step: usize,
    /// Period of the seasonal naive baseline used for MASE.
    pub season_length: usize,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            min_train_size: 24,
            step: 1,
            season_length: 12,
        }
    }
}

impl WalkForwardConfig {
    /// Create a configuration with one-step folds.
    pub fn new(min_train_size: usize, season_length: usize) -> Self {
        Self {
            min_train_size,
            step: 1,
            season_length,
        }
    }

    /// Set the number of points forecast per fold.
    pub fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.min_train_size == 0 {
            return Err(ForecastError::InvalidParameter(
                "min_train_size must be at least 1".to_string(),
            ));
        }
        if self.step == 0 {
            return Err(ForecastError::InvalidParameter(
                "step must be at least 1".to_string(),
            ));
        }
        if self.season_length == 0 {
            return Err(ForecastError::InvalidParameter(
                "season_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One walk-forward iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fold {
    /// Training prefix length; the prefix covers indices `0..train_len`.
    pub train_len: usize,
    /// Actual values at indices `train_len..train_len + actual.len()`.
    pub actual: Vec<f64>,
    /// Model forecasts for the same indices.
    pub predicted: Vec<f64>,
    /// Seasonal naive forecasts from the same prefix.
    pub naive: Vec<f64>,
}

impl Fold {
    /// Series indices forecast in this fold.
    pub fn forecast_indices(&self) -> std::ops::Range<usize> {
        self.train_len..self.train_len + self.actual.len()
    }
}

/// Out-of-sample errors of a whole walk-forward run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    /// Per-fold records in chronological order.
    pub folds: Vec<Fold>,
    /// Metrics over all folds pooled together.
    pub accuracy: AccuracyReport,
}

impl BacktestReport {
    fn empty() -> Self {
        Self {
            folds: Vec::new(),
            accuracy: AccuracyReport::unavailable(),
        }
    }

    /// Number of folds evaluated.
    pub fn n_folds(&self) -> usize {
        self.folds.len()
    }

    /// All actual values scored, flattened.
    pub fn actual_values(&self) -> Vec<f64> {
        self.folds.iter().flat_map(|f| f.actual.iter().copied()).collect()
    }

    /// All forecasts scored, flattened.
    pub fn predicted_values(&self) -> Vec<f64> {
        self.folds
            .iter()
            .flat_map(|f| f.predicted.iter().copied())
            .collect()
    }
}

/// Run walk-forward validation with a forecasting function.
///
/// `forecast_fn(prefix, h)` must return `h` forecasts for the points right
/// after `prefix`. The last fold is truncated when fewer than `step` points
/// remain. A series no longer than `min_train_size` produces zero folds and
/// an unavailable accuracy report.
///
/// # Errors
/// Invalid configuration, an error from `forecast_fn`, or a forecast of the
/// wrong length.
///
/// # Example
/// ```
/// use demand_forecast::utils::cross_validation::{walk_forward_validate, WalkForwardConfig};
/// use demand_forecast::validation::ClassificationPolicy;
///
/// let series: Vec<f64> = (0..30).map(|i| 50.0 + (i % 6) as f64).collect();
/// let config = WalkForwardConfig::new(12, 6);
///
/// // Repeat the value one season back
/// let report = walk_forward_validate(
///     &series,
///     |train, h| Ok((0..h).map(|k| train[train.len() - 6 + k % 6]).collect()),
///     &config,
///     &ClassificationPolicy::default(),
/// )
/// .unwrap();
///
/// assert_eq!(report.n_folds(), 18);
/// assert_eq!(report.accuracy.mae(), 0.0);
/// ```
pub fn walk_forward_validate<F>(
    series: &[f64],
    mut forecast_fn: F,
    config: &WalkForwardConfig,
    policy: &ClassificationPolicy,
) -> Result<BacktestReport>
where
    F: FnMut(&[f64], usize) -> Result<Vec<f64>>,
{
    config.validate()?;

    let n = series.len();
    let baseline = SeasonalNaive::new(config.season_length);
    let mut folds = Vec::new();

    let mut origin = config.min_train_size;
    while origin < n {
        let horizon = config.step.min(n - origin);
        let train = &series[..origin];

        let predicted = forecast_fn(train, horizon)?;
        if predicted.len() != horizon {
            return Err(ForecastError::DimensionMismatch {
                expected: horizon,
                got: predicted.len(),
            });
        }

        folds.push(Fold {
            train_len: origin,
            actual: series[origin..origin + horizon].to_vec(),
            predicted,
            naive: baseline.forecast_from(train, horizon),
        });

        origin += horizon;
    }

    if folds.is_empty() {
        debug!(
            len = n,
            min_train_size = config.min_train_size,
            "walk-forward produced no folds"
        );
        return Ok(BacktestReport::empty());
    }

    let actual: Vec<f64> = folds.iter().flat_map(|f| f.actual.iter().copied()).collect();
    let predicted: Vec<f64> = folds
        .iter()
        .flat_map(|f| f.predicted.iter().copied())
        .collect();
    let naive: Vec<f64> = folds.iter().flat_map(|f| f.naive.iter().copied()).collect();

    let metrics = calculate_metrics_with_baseline(&actual, &predicted, &naive)?;
    debug!(
        folds = folds.len(),
        samples = metrics.samples,
        smape = metrics.smape,
        mase = metrics.mase,
        "walk-forward complete"
    );

    Ok(BacktestReport {
        folds,
        accuracy: AccuracyReport::new(metrics, policy),
    })
}

/// Run walk-forward validation by refitting a fresh model on every prefix.
///
/// # Example
/// ```
/// use demand_forecast::core::{ModelParameters, TimeSeries};
/// use demand_forecast::models::exponential::HoltWinters;
/// use demand_forecast::utils::cross_validation::{walk_forward_with, WalkForwardConfig};
/// use demand_forecast::validation::ClassificationPolicy;
///
/// let ts = TimeSeries::new(vec![100.0; 30]).unwrap();
/// let config = WalkForwardConfig::new(24, 12);
///
/// let report = walk_forward_with(
///     &ts,
///     || HoltWinters::new(ModelParameters::FALLBACK, 12),
///     &config,
///     &ClassificationPolicy::default(),
/// )
/// .unwrap();
///
/// assert_eq!(report.n_folds(), 6);
/// assert!(report.accuracy.mae() < 1e-9);
/// ```
pub fn walk_forward_with<M, Factory>(
    series: &TimeSeries,
    model_factory: Factory,
    config: &WalkForwardConfig,
    policy: &ClassificationPolicy,
) -> Result<BacktestReport>
where
    M: Forecaster,
    Factory: Fn() -> M,
{
    walk_forward_validate(
        series.values(),
        |train, horizon| {
            let prefix = series.slice(0, train.len())?;
            let mut model = model_factory();
            model.fit(&prefix)?;
            model.predict(horizon)
        },
        config,
        policy,
    )
}
