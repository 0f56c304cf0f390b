//! Confidence and quality classification of backtest accuracy.

use crate::error::{ForecastError, Result};
use crate::utils::metrics::AccuracyMetrics;
use serde::{Deserialize, Serialize};

/// How much the forecast can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// Overall grade of the backtest error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastQuality {
    Poor,
    Fair,
    Good,
    Excellent,
}

/// A pair of upper limits on sMAPE and MASE, both exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub smape: f64,
    pub mase: f64,
}

impl Threshold {
    pub const fn new(smape: f64, mase: f64) -> Self {
        Self { smape, mase }
    }

    fn admits(&self, metrics: &AccuracyMetrics) -> bool {
        metrics.smape < self.smape && metrics.mase < self.mase
    }
}

/// Thresholds mapping metrics to [`Confidence`] and [`ForecastQuality`].
///
/// Each grade requires both metrics below its threshold; grades are tried
/// from best to worst. Thresholds must be non-decreasing from the stricter
/// grade to the looser one, which keeps the classification monotonic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationPolicy {
    pub high_confidence: Threshold,
    pub medium_confidence: Threshold,
    pub excellent: Threshold,
    pub good: Threshold,
    pub fair: Threshold,
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self {
            high_confidence: Threshold::new(15.0, 1.0),
            medium_confidence: Threshold::new(25.0, 1.5),
            excellent: Threshold::new(10.0, 0.8),
            good: Threshold::new(20.0, 1.2),
            fair: Threshold::new(35.0, 2.0),
        }
    }
}

impl ClassificationPolicy {
    /// Check that every threshold is positive and the grades are nested.
    pub fn validate(&self) -> Result<()> {
        let all = [
            self.excellent,
            self.good,
            self.fair,
            self.high_confidence,
            self.medium_confidence,
        ];
        if all
            .iter()
            .any(|t| !(t.smape > 0.0 && t.mase > 0.0) || t.smape.is_nan() || t.mase.is_nan())
        {
            return Err(ForecastError::InvalidParameter(
                "classification thresholds must be positive".to_string(),
            ));
        }

        let nested = |a: Threshold, b: Threshold| a.smape <= b.smape && a.mase <= b.mase;
        if !nested(self.high_confidence, self.medium_confidence)
            || !nested(self.excellent, self.good)
            || !nested(self.good, self.fair)
        {
            return Err(ForecastError::InvalidParameter(
                "classification thresholds must loosen from the best grade down".to_string(),
            ));
        }
        Ok(())
    }

    /// Confidence implied by the metrics.
    pub fn confidence(&self, metrics: &AccuracyMetrics) -> Confidence {
        if metrics.samples == 0 {
            Confidence::Low
        } else if self.high_confidence.admits(metrics) {
            Confidence::High
        } else if self.medium_confidence.admits(metrics) {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    /// Quality grade implied by the metrics.
    pub fn quality(&self, metrics: &AccuracyMetrics) -> ForecastQuality {
        if metrics.samples == 0 {
            ForecastQuality::Poor
        } else if self.excellent.admits(metrics) {
            ForecastQuality::Excellent
        } else if self.good.admits(metrics) {
            ForecastQuality::Good
        } else if self.fair.admits(metrics) {
            ForecastQuality::Fair
        } else {
            ForecastQuality::Poor
        }
    }
}

/// Aggregate accuracy of a backtest with its derived grades.
///
/// Fields are private so the grades can only come from the metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    #[serde(flatten)]
    metrics: AccuracyMetrics,
    confidence: Confidence,
    quality: ForecastQuality,
}

impl AccuracyReport {
    /// Classify `metrics` under `policy`.
    pub fn new(metrics: AccuracyMetrics, policy: &ClassificationPolicy) -> Self {
        Self {
            confidence: policy.confidence(&metrics),
            quality: policy.quality(&metrics),
            metrics,
        }
    }

    /// Report for a run with nothing to score: zero metrics, low confidence.
    pub fn unavailable() -> Self {
        Self {
            metrics: AccuracyMetrics::empty(),
            confidence: Confidence::Low,
            quality: ForecastQuality::Poor,
        }
    }

    pub fn metrics(&self) -> &AccuracyMetrics {
        &self.metrics
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn quality(&self) -> ForecastQuality {
        self.quality
    }

    pub fn smape(&self) -> f64 {
        self.metrics.smape
    }

    pub fn mase(&self) -> f64 {
        self.metrics.mase
    }

    pub fn mae(&self) -> f64 {
        self.metrics.mae
    }

    pub fn weighted_mape(&self) -> f64 {
        self.metrics.weighted_mape
    }

    /// True when at least one forecast was scored.
    pub fn is_available(&self) -> bool {
        self.metrics.samples > 0
    }
}
