//! Engine configuration.

use crate::core::ModelParameters;
use crate::error::{ForecastError, Result};
use crate::utils::optimization::ParameterGrid;
use crate::validation::ClassificationPolicy;
use serde::{Deserialize, Serialize};

/// How smoothing parameters are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterSelection {
    /// Grid search on the treated series.
    #[default]
    Search,
    /// Caller-supplied parameters; the search is skipped.
    Manual(ModelParameters),
}

/// Mixing of the model forecast with the current month's run rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendPolicy {
    /// Weight of the model forecast; the run rate gets the rest.
    pub model_weight: f64,
    /// Elapsed share of the month that must be exceeded before blending.
    pub min_elapsed_fraction: f64,
}

impl Default for BlendPolicy {
    fn default() -> Self {
        Self {
            model_weight: 0.6,
            min_elapsed_fraction: 0.1,
        }
    }
}

/// Walk-forward settings used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// First training prefix; `None` means two seasons.
    pub min_train_size: Option<usize>,
    /// Points forecast per fold.
    pub step: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            min_train_size: None,
            step: 1,
        }
    }
}

/// Configuration for [`ForecastEngine`](super::ForecastEngine).
///
/// # Example
/// ```
/// use demand_forecast::core::ModelParameters;
/// use demand_forecast::engine::ForecastConfig;
///
/// let config = ForecastConfig::default()
///     .with_season_length(4)
///     .with_manual_parameters(ModelParameters::new(0.5, 0.1, 0.1).unwrap());
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Periods in one seasonal cycle.
    pub season_length: usize,
    /// Steps ahead in the reported forecast path; the headline monthly
    /// figure is always the first step.
    pub horizon: usize,
    /// Multiplier from the monthly to the annual projection.
    pub periods_per_year: usize,
    /// Standard deviations beyond which a month is treated as an outlier.
    pub outlier_sensitivity: f64,
    pub parameters: ParameterSelection,
    pub grid: ParameterGrid,
    pub blend: BlendPolicy,
    pub backtest: BacktestConfig,
    pub classification: ClassificationPolicy,
    /// Coverage of the prediction interval.
    pub interval_level: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            season_length: 12,
            horizon: 1,
            periods_per_year: 12,
            outlier_sensitivity: 2.0,
            parameters: ParameterSelection::Search,
            grid: ParameterGrid::default(),
            blend: BlendPolicy::default(),
            backtest: BacktestConfig::default(),
            classification: ClassificationPolicy::default(),
            interval_level: 0.95,
        }
    }
}

impl ForecastConfig {
    /// Set the seasonal cycle length.
    pub fn with_season_length(mut self, season_length: usize) -> Self {
        self.season_length = season_length;
        self
    }

    /// Set the forecast horizon.
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Set the number of periods per year.
    pub fn with_periods_per_year(mut self, periods: usize) -> Self {
        self.periods_per_year = periods;
        self
    }

    /// Set the outlier sensitivity.
    pub fn with_outlier_sensitivity(mut self, sensitivity: f64) -> Self {
        self.outlier_sensitivity = sensitivity;
        self
    }

    /// Skip the search and use fixed parameters.
    pub fn with_manual_parameters(mut self, parameters: ModelParameters) -> Self {
        self.parameters = ParameterSelection::Manual(parameters);
        self
    }

    /// Search a custom grid.
    pub fn with_grid(mut self, grid: ParameterGrid) -> Self {
        self.grid = grid;
        self.parameters = ParameterSelection::Search;
        self
    }

    /// Set the partial-period blend policy.
    pub fn with_blend(mut self, blend: BlendPolicy) -> Self {
        self.blend = blend;
        self
    }

    /// Set the walk-forward settings.
    pub fn with_backtest(mut self, backtest: BacktestConfig) -> Self {
        self.backtest = backtest;
        self
    }

    /// Set the confidence and quality thresholds.
    pub fn with_classification(mut self, policy: ClassificationPolicy) -> Self {
        self.classification = policy;
        self
    }

    /// Set the prediction interval coverage.
    pub fn with_interval_level(mut self, level: f64) -> Self {
        self.interval_level = level;
        self
    }

    /// Months of history needed before the model is fitted.
    pub fn min_history(&self) -> usize {
        2 * self.season_length
    }

    /// First walk-forward training prefix.
    pub fn min_train_size(&self) -> usize {
        self.backtest
            .min_train_size
            .unwrap_or_else(|| self.min_history())
    }

    /// Check the whole configuration.
    pub fn validate(&self) -> Result<()> {
        if self.season_length < 2 {
            return Err(invalid(format!(
                "season_length must be at least 2, got {}",
                self.season_length
            )));
        }
        if self.horizon == 0 {
            return Err(invalid("horizon must be at least 1".to_string()));
        }
        if self.periods_per_year == 0 {
            return Err(invalid("periods_per_year must be at least 1".to_string()));
        }
        if !(self.outlier_sensitivity.is_finite() && self.outlier_sensitivity > 0.0) {
            return Err(invalid(format!(
                "outlier_sensitivity must be positive, got {}",
                self.outlier_sensitivity
            )));
        }
        if !(self.blend.model_weight >= 0.0 && self.blend.model_weight <= 1.0) {
            return Err(invalid(format!(
                "blend model_weight must lie in [0, 1], got {}",
                self.blend.model_weight
            )));
        }
        if !(self.blend.min_elapsed_fraction >= 0.0 && self.blend.min_elapsed_fraction < 1.0) {
            return Err(invalid(format!(
                "blend min_elapsed_fraction must lie in [0, 1), got {}",
                self.blend.min_elapsed_fraction
            )));
        }
        if self.backtest.step == 0 {
            return Err(invalid("backtest step must be at least 1".to_string()));
        }
        if self.backtest.min_train_size.is_some_and(|m| m < self.min_history()) {
            return Err(invalid(format!(
                "backtest min_train_size must be at least {}",
                self.min_history()
            )));
        }
        if !(self.interval_level > 0.0 && self.interval_level < 1.0) {
            return Err(invalid(format!(
                "interval_level must lie in (0, 1), got {}",
                self.interval_level
            )));
        }
        if matches!(self.parameters, ParameterSelection::Search) {
            self.grid.validate()?;
        }
        self.classification.validate()
    }
}

fn invalid(message: String) -> ForecastError {
    ForecastError::InvalidParameter(message)
}
