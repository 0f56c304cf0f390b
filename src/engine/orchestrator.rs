//! The forecast pipeline.
//!
//! Outlier treatment, parameter selection, fit, partial-period blend,
//! walk-forward backtest and classification, in that order. Every failure
//! along the way is absorbed into a [`Diagnostic`] so callers always get a
//! renderable [`ForecastResult`].

use super::config::{ForecastConfig, ParameterSelection};
use super::result::{
    BacktestFold, BacktestSummary, DataQuality, DegenerateKind, Diagnostic, ForecastResult, ModelSummary,
    OutlierSummary, ParameterSource, PartialPeriod, PredictionInterval,
};
use crate::core::{ModelParameters, TimeSeries};
use crate::detection::{detect_and_treat, OutlierReport};
use crate::error::Result;
use crate::models::{fit_and_forecast, FittedModel};
use crate::utils::cross_validation::{walk_forward_validate, WalkForwardConfig};
use crate::utils::optimization::{holdout_len, search_with_grid};
use crate::utils::stats::normal_critical_value;
use crate::validation::AccuracyReport;
use tracing::{debug, warn};

/// Runs forecasts under a validated configuration.
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    config: ForecastConfig,
}

impl ForecastEngine {
    /// Create an engine, rejecting an invalid configuration up front.
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast from raw monthly totals, oldest first.
    ///
    /// NaN, infinite and negative entries are replaced by zero and reported
    /// as [`Diagnostic::SanitizedInput`].
    ///
    /// # Example
    /// ```
    /// use demand_forecast::engine::{ForecastEngine, PartialPeriod};
    ///
    /// let engine = ForecastEngine::default();
    /// let history = vec![100.0; 24];
    ///
    /// let result = engine.run(&history, None);
    /// assert!((result.monthly_forecast - 100.0).abs() < 1e-6);
    /// assert!((result.annual_forecast - 1200.0).abs() < 1e-4);
    ///
    /// // Half way through a strong month
    /// let blended = engine.run(&history, Some(PartialPeriod::new(0.5, 70.0)));
    /// assert!(blended.monthly_forecast > result.monthly_forecast);
    /// ```
    pub fn run(&self, history: &[f64], partial: Option<PartialPeriod>) -> ForecastResult {
        let (series, sanitized) = TimeSeries::sanitized(history);
        let mut diagnostics = Vec::new();
        if sanitized > 0 {
            warn!(count = sanitized, "replaced invalid history values with zero");
            diagnostics.push(Diagnostic::SanitizedInput { count: sanitized });
        }
        self.execute(&series, partial, diagnostics)
    }

    /// Forecast from a validated series; fills in the target month when the
    /// series is anchored to a calendar.
    pub fn run_series(&self, series: &TimeSeries, partial: Option<PartialPeriod>) -> ForecastResult {
        self.execute(series, partial, Vec::new())
    }

    fn execute(
        &self,
        series: &TimeSeries,
        partial: Option<PartialPeriod>,
        mut diagnostics: Vec<Diagnostic>,
    ) -> ForecastResult {
        let config = &self.config;
        let values = series.values();
        let n = values.len();
        let historical_average = finite_or_zero(series.mean());
        let target_month = series.next_month();

        let degenerate = |mut diagnostics: Vec<Diagnostic>, outliers: OutlierSummary| {
            if partial.is_some() {
                diagnostics.push(Diagnostic::PartialPeriodIgnored {
                    reason: "no model forecast to blend with".to_string(),
                });
            }
            let mut result = ForecastResult::degenerate(historical_average, config.horizon);
            result.outliers = outliers;
            result.target_month = target_month;
            result.diagnostics = diagnostics;
            result
        };

        if n < config.min_history() {
            warn!(
                len = n,
                needed = config.min_history(),
                "history too short to fit a seasonal model"
            );
            diagnostics.push(Diagnostic::InsufficientHistory {
                needed: config.min_history(),
                got: n,
            });
            return degenerate(diagnostics, OutlierSummary::none());
        }

        if series.is_all_zero() {
            warn!(len = n, "history is all zero");
            diagnostics.push(Diagnostic::DegenerateSeries {
                kind: DegenerateKind::AllZero,
            });
            return degenerate(diagnostics, OutlierSummary::none());
        }

        let constant = series.is_constant();
        if constant {
            warn!(len = n, value = values[0], "history is constant");
            diagnostics.push(Diagnostic::DegenerateSeries {
                kind: DegenerateKind::Constant,
            });
        }

        let outliers = detect_and_treat(values, config.outlier_sensitivity);
        let treated = &outliers.winsorized;

        let (model, summary) = match self.select_and_fit(treated, &mut diagnostics) {
            Ok(fitted) => fitted,
            Err(e) => {
                warn!(error = %e, "seasonal model fit failed");
                diagnostics.push(Diagnostic::FitFailed {
                    reason: e.to_string(),
                });
                return degenerate(diagnostics, OutlierSummary::from(&outliers));
            }
        };

        let forecast_path = model.forecast.clone();
        let model_forecast = match forecast_path.first() {
            Some(&f) if forecast_path.iter().all(|v| v.is_finite()) => f,
            _ => {
                warn!("seasonal model produced a non-finite forecast");
                diagnostics.push(Diagnostic::FitFailed {
                    reason: "non-finite forecast".to_string(),
                });
                return degenerate(diagnostics, OutlierSummary::from(&outliers));
            }
        };

        let (monthly_forecast, run_rate) = self.blend(model_forecast, partial, &mut diagnostics);

        let (accuracy, backtest) = self.backtest(treated, &mut diagnostics);
        let interval = self.interval(monthly_forecast, &accuracy);

        let annual_forecast = monthly_forecast * config.periods_per_year as f64;
        let variance_pct = if historical_average > 0.0 {
            (monthly_forecast - historical_average) / historical_average * 100.0
        } else {
            0.0
        };

        if ![monthly_forecast, annual_forecast, variance_pct]
            .iter()
            .all(|v| v.is_finite())
        {
            warn!("projection overflowed");
            diagnostics.push(Diagnostic::FitFailed {
                reason: "non-finite projection".to_string(),
            });
            return degenerate(diagnostics, OutlierSummary::from(&outliers));
        }

        let data_quality = assess_quality(values, &outliers, config.season_length, constant);
        debug!(
            monthly_forecast,
            annual_forecast,
            variance_pct,
            confidence = ?accuracy.confidence(),
            data_quality = ?data_quality,
            "forecast complete"
        );

        ForecastResult {
            monthly_forecast,
            annual_forecast,
            variance_pct,
            historical_average,
            forecast_path,
            model_forecast,
            run_rate,
            model: Some(summary),
            accuracy,
            backtest,
            outliers: OutlierSummary::from(&outliers),
            data_quality,
            interval,
            target_month,
            diagnostics,
        }
    }

    /// Choose parameters and fit the treated series.
    fn select_and_fit(
        &self,
        treated: &[f64],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<(FittedModel, ModelSummary)> {
        let config = &self.config;
        match config.parameters {
            ParameterSelection::Manual(parameters) => {
                debug!(
                    alpha = parameters.alpha(),
                    beta = parameters.beta(),
                    gamma = parameters.gamma(),
                    "using manual parameters"
                );
                let model =
                    fit_and_forecast(treated, config.season_length, config.horizon, parameters)?;
                Ok((
                    model,
                    ModelSummary {
                        parameters,
                        source: ParameterSource::Manual,
                        holdout_mae: None,
                    },
                ))
            }
            ParameterSelection::Search => {
                let outcome =
                    search_with_grid(treated, config.season_length, config.horizon, &config.grid)?;
                let source = if outcome.exhausted() {
                    diagnostics.push(Diagnostic::ParameterSearchExhausted {
                        candidates: config.grid.len(),
                    });
                    ParameterSource::Fallback
                } else {
                    ParameterSource::Search
                };
                let summary = ModelSummary {
                    parameters: outcome.parameters,
                    source,
                    holdout_mae: outcome.holdout_mae,
                };
                Ok((outcome.model, summary))
            }
        }
    }

    /// Mix the model forecast with the run rate of the month in progress.
    fn blend(
        &self,
        model_forecast: f64,
        partial: Option<PartialPeriod>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (f64, Option<f64>) {
        let Some(partial) = partial else {
            return (model_forecast, None);
        };
        let policy = &self.config.blend;

        let Some(run_rate) = partial.run_rate() else {
            warn!(
                elapsed_fraction = partial.elapsed_fraction,
                observed_value = partial.observed_value,
                "ignoring invalid partial period"
            );
            diagnostics.push(Diagnostic::PartialPeriodIgnored {
                reason: "elapsed fraction must lie in (0, 1] and the value must be non-negative"
                    .to_string(),
            });
            return (model_forecast, None);
        };

        if partial.elapsed_fraction <= policy.min_elapsed_fraction {
            debug!(
                elapsed_fraction = partial.elapsed_fraction,
                "too early in the month to blend"
            );
            diagnostics.push(Diagnostic::PartialPeriodIgnored {
                reason: format!(
                    "elapsed fraction {} does not exceed {}",
                    partial.elapsed_fraction, policy.min_elapsed_fraction
                ),
            });
            return (model_forecast, None);
        }

        let blended = policy.model_weight * model_forecast + (1.0 - policy.model_weight) * run_rate;
        if !blended.is_finite() {
            diagnostics.push(Diagnostic::PartialPeriodIgnored {
                reason: "run rate overflowed".to_string(),
            });
            return (model_forecast, None);
        }
        debug!(model_forecast, run_rate, blended, "blended partial period");
        (blended, Some(run_rate))
    }

    /// Select parameters from `train` alone and forecast `horizon` points.
    ///
    /// A prefix too short to hold out a tail and still fit two seasons uses
    /// the fallback triple.
    fn fit_prefix(&self, train: &[f64], horizon: usize) -> Result<(ModelParameters, FittedModel)> {
        let config = &self.config;
        let searchable = train.len() - holdout_len(train.len()) >= 2 * config.season_length;
        let parameters = match config.parameters {
            ParameterSelection::Manual(parameters) => parameters,
            ParameterSelection::Search if searchable => {
                let outcome = search_with_grid(train, config.season_length, horizon, &config.grid)?;
                return Ok((outcome.parameters, outcome.model));
            }
            ParameterSelection::Search => ModelParameters::FALLBACK,
        };
        let model = fit_and_forecast(train, config.season_length, horizon, parameters)?;
        Ok((parameters, model))
    }

    /// Walk-forward on the treated series, selecting parameters from each
    /// prefix.
    fn backtest(
        &self,
        treated: &[f64],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> (AccuracyReport, Option<BacktestSummary>) {
        let config = &self.config;
        let wf_config = WalkForwardConfig {
            min_train_size: config.min_train_size(),
            step: config.backtest.step,
            season_length: config.season_length,
        };

        let mut fold_parameters = Vec::new();
        let result = walk_forward_validate(
            treated,
            |train, horizon| {
                let (parameters, model) = self.fit_prefix(train, horizon)?;
                fold_parameters.push(parameters);
                Ok(model.forecast)
            },
            &wf_config,
            &config.classification,
        );

        match result {
            Ok(report) if report.n_folds() == 0 => {
                debug!(len = treated.len(), "no walk-forward folds");
                diagnostics.push(Diagnostic::BacktestUnavailable);
                (AccuracyReport::unavailable(), None)
            }
            Ok(report) => {
                let metrics = report.accuracy.metrics();
                let finite = [
                    metrics.smape,
                    metrics.mase,
                    metrics.mae,
                    metrics.weighted_mape,
                    metrics.rmse,
                ]
                .iter()
                .all(|v| v.is_finite());
                if !finite {
                    warn!("walk-forward metrics are not finite");
                    diagnostics.push(Diagnostic::BacktestFailed {
                        reason: "non-finite accuracy metrics".to_string(),
                    });
                    return (AccuracyReport::unavailable(), None);
                }

                let folds = report
                    .folds
                    .iter()
                    .zip(&fold_parameters)
                    .map(|(fold, &parameters)| BacktestFold {
                        train_len: fold.train_len,
                        actual: fold.actual.clone(),
                        predicted: fold.predicted.clone(),
                        parameters,
                    })
                    .collect();
                let backtest = BacktestSummary {
                    folds,
                    samples: metrics.samples,
                    min_train_size: wf_config.min_train_size,
                    step: wf_config.step,
                };
                (report.accuracy, Some(backtest))
            }
            Err(e) => {
                warn!(error = %e, "walk-forward validation failed");
                diagnostics.push(Diagnostic::BacktestFailed {
                    reason: e.to_string(),
                });
                (AccuracyReport::unavailable(), None)
            }
        }
    }

    /// Normal interval from the backtest RMSE.
    fn interval(&self, monthly_forecast: f64, accuracy: &AccuracyReport) -> Option<PredictionInterval> {
        if !accuracy.is_available() {
            return None;
        }
        let z = normal_critical_value(self.config.interval_level)?;
        let half_width = z * accuracy.metrics().rmse;
        let interval = PredictionInterval {
            level: self.config.interval_level,
            lower: (monthly_forecast - half_width).max(0.0),
            upper: monthly_forecast + half_width,
        };
        (interval.lower.is_finite() && interval.upper.is_finite()).then_some(interval)
    }
}

/// Forecast with the default configuration.
///
/// # Example
/// ```
/// use demand_forecast::engine::forecast;
/// use demand_forecast::validation::Confidence;
///
/// let result = forecast(&[0.0; 24], None);
/// assert_eq!(result.monthly_forecast, 0.0);
/// assert_eq!(result.confidence(), Confidence::Low);
/// ```
pub fn forecast(history: &[f64], partial: Option<PartialPeriod>) -> ForecastResult {
    ForecastEngine::default().run(history, partial)
}

fn assess_quality(
    values: &[f64],
    outliers: &OutlierReport,
    season_length: usize,
    degenerate: bool,
) -> DataQuality {
    let zero_pct = if values.is_empty() {
        0.0
    } else {
        100.0 * values.iter().filter(|&&v| v == 0.0).count() as f64 / values.len() as f64
    };
    DataQuality::assess(
        values.len(),
        season_length,
        zero_pct,
        outliers.outlier_percentage(),
        degenerate,
    )
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
