//! Output of a forecast run.

use crate::core::ModelParameters;
use crate::detection::{OutlierImpact, OutlierReport};
use crate::validation::{AccuracyReport, Confidence, ForecastQuality};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Observations for the month in progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartialPeriod {
    /// Share of the month already elapsed, in `(0, 1]`.
    pub elapsed_fraction: f64,
    /// Metric total observed so far this month.
    pub observed_value: f64,
}

impl PartialPeriod {
    pub fn new(elapsed_fraction: f64, observed_value: f64) -> Self {
        Self {
            elapsed_fraction,
            observed_value,
        }
    }

    /// Full-month projection of the observed value, `None` when the
    /// observation is unusable.
    pub fn run_rate(&self) -> Option<f64> {
        let usable = self.elapsed_fraction.is_finite()
            && self.elapsed_fraction > 0.0
            && self.elapsed_fraction <= 1.0
            && self.observed_value.is_finite()
            && self.observed_value >= 0.0;
        usable.then(|| self.observed_value / self.elapsed_fraction)
    }
}

/// Trust in the history itself, independent of model accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    Low,
    Medium,
    High,
}

impl DataQuality {
    /// Grade a history by its length in seasons, share of zero months and
    /// share of outliers (both in percent).
    pub fn assess(
        len: usize,
        season_length: usize,
        zero_pct: f64,
        outlier_pct: f64,
        degenerate: bool,
    ) -> Self {
        if degenerate {
            DataQuality::Low
        } else if len >= 3 * season_length && zero_pct <= 10.0 && outlier_pct <= 5.0 {
            DataQuality::High
        } else if len >= 2 * season_length && zero_pct <= 25.0 && outlier_pct <= 15.0 {
            DataQuality::Medium
        } else {
            DataQuality::Low
        }
    }
}

/// Shape of a degenerate series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateKind {
    AllZero,
    Constant,
}

/// Why a result is degraded. Every fallback taken during a run adds one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Fewer months than two seasons; projections are zero.
    InsufficientHistory { needed: usize, got: usize },
    /// All-zero or constant history.
    DegenerateSeries { kind: DegenerateKind },
    /// No grid candidate could be fitted; the fallback triple was used.
    ParameterSearchExhausted { candidates: usize },
    /// Non-finite or negative inputs were replaced by zero.
    SanitizedInput { count: usize },
    /// The partial period was supplied but not blended.
    PartialPeriodIgnored { reason: String },
    /// Walk-forward had no fold to score.
    BacktestUnavailable,
    /// Walk-forward raised an error.
    BacktestFailed { reason: String },
    /// The model could not be fitted or produced an unusable forecast.
    FitFailed { reason: String },
}

/// Where the smoothing parameters came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterSource {
    Search,
    Manual,
    Fallback,
}

/// Parameters of the fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelSummary {
    pub parameters: ModelParameters,
    pub source: ParameterSource,
    /// Holdout MAE of the searched parameters.
    pub holdout_mae: Option<f64>,
}

/// Outlier treatment digest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierSummary {
    pub count: usize,
    pub indices: Vec<usize>,
    pub impact: OutlierImpact,
}

impl OutlierSummary {
    pub fn none() -> Self {
        Self {
            count: 0,
            indices: Vec::new(),
            impact: OutlierImpact::Low,
        }
    }
}

impl From<&OutlierReport> for OutlierSummary {
    fn from(report: &OutlierReport) -> Self {
        Self {
            count: report.outlier_count(),
            indices: report.outlier_indices.clone(),
            impact: report.impact(),
        }
    }
}

/// One walk-forward split and the parameters selected on its prefix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestFold {
    /// Length of the training prefix.
    pub train_len: usize,
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
    pub parameters: ModelParameters,
}

/// Walk-forward digest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestSummary {
    pub folds: Vec<BacktestFold>,
    pub samples: usize,
    pub min_train_size: usize,
    pub step: usize,
}

impl BacktestSummary {
    pub fn n_folds(&self) -> usize {
        self.folds.len()
    }
}

/// Symmetric normal interval around the monthly forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionInterval {
    pub level: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Everything a forecast run produces.
///
/// Always structurally valid and free of NaN/Inf; degraded runs carry zero
/// projections, low grades and at least one [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Forecast for the next month, after blending.
    pub monthly_forecast: f64,
    /// `monthly_forecast` times periods per year.
    pub annual_forecast: f64,
    /// Percent difference of `monthly_forecast` from the historical average.
    pub variance_pct: f64,
    /// Mean of the history before outlier treatment.
    pub historical_average: f64,
    /// Unblended model forecast for each step of the horizon.
    pub forecast_path: Vec<f64>,
    /// Unblended model forecast for the next month.
    pub model_forecast: f64,
    /// Full-month projection of the partial period, when blended.
    pub run_rate: Option<f64>,
    pub model: Option<ModelSummary>,
    pub accuracy: AccuracyReport,
    pub backtest: Option<BacktestSummary>,
    pub outliers: OutlierSummary,
    pub data_quality: DataQuality,
    pub interval: Option<PredictionInterval>,
    /// Calendar month of `monthly_forecast`, for anchored series.
    pub target_month: Option<NaiveDate>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ForecastResult {
    /// A zero forecast with the lowest grades.
    pub(crate) fn degenerate(historical_average: f64, horizon: usize) -> Self {
        Self {
            monthly_forecast: 0.0,
            annual_forecast: 0.0,
            variance_pct: 0.0,
            historical_average,
            forecast_path: vec![0.0; horizon],
            model_forecast: 0.0,
            run_rate: None,
            model: None,
            accuracy: AccuracyReport::unavailable(),
            backtest: None,
            outliers: OutlierSummary::none(),
            data_quality: DataQuality::Low,
            interval: None,
            target_month: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn confidence(&self) -> Confidence {
        self.accuracy.confidence()
    }

    pub fn quality(&self) -> ForecastQuality {
        self.accuracy.quality()
    }

    /// True when no model was fitted.
    pub fn is_degenerate(&self) -> bool {
        self.model.is_none()
    }

    pub fn has_diagnostic(&self, predicate: impl Fn(&Diagnostic) -> bool) -> bool {
        self.diagnostics.iter().any(predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_rate_projects_full_month() {
        assert_eq!(PartialPeriod::new(0.5, 40.0).run_rate(), Some(80.0));
        assert_eq!(PartialPeriod::new(1.0, 40.0).run_rate(), Some(40.0));
        assert_eq!(PartialPeriod::new(0.0, 40.0).run_rate(), None);
        assert_eq!(PartialPeriod::new(1.5, 40.0).run_rate(), None);
        assert_eq!(PartialPeriod::new(0.5, -1.0).run_rate(), None);
        assert_eq!(PartialPeriod::new(f64::NAN, 1.0).run_rate(), None);
    }

    #[test]
    fn data_quality_grades() {
        assert_eq!(DataQuality::assess(36, 12, 0.0, 0.0, false), DataQuality::High);
        assert_eq!(DataQuality::assess(36, 12, 20.0, 0.0, false), DataQuality::Medium);
        assert_eq!(DataQuality::assess(24, 12, 0.0, 0.0, false), DataQuality::Medium);
        assert_eq!(DataQuality::assess(24, 12, 0.0, 20.0, false), DataQuality::Low);
        assert_eq!(DataQuality::assess(12, 12, 0.0, 0.0, false), DataQuality::Low);
        assert_eq!(DataQuality::assess(60, 12, 0.0, 0.0, true), DataQuality::Low);
    }

    #[test]
    fn degenerate_result_is_zero_and_low() {
        let result = ForecastResult::degenerate(0.0, 3);
        assert_eq!(result.monthly_forecast, 0.0);
        assert_eq!(result.forecast_path, vec![0.0; 3]);
        assert_eq!(result.confidence(), Confidence::Low);
        assert_eq!(result.quality(), ForecastQuality::Poor);
        assert_eq!(result.data_quality, DataQuality::Low);
        assert!(result.is_degenerate());
    }

    #[test]
    fn diagnostics_serialize_tagged() {
        let json = serde_json::to_value(Diagnostic::DegenerateSeries {
            kind: DegenerateKind::AllZero,
        })
        .unwrap();
        assert_eq!(json["type"], "degenerate_series");
        assert_eq!(json["kind"], "all_zero");

        let json = serde_json::to_value(Diagnostic::BacktestUnavailable).unwrap();
        assert_eq!(json["type"], "backtest_unavailable");
    }
}
