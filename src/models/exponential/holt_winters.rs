//! Holt-Winters forecasting model.
//!
//! Triple exponential smoothing with an additive trend and multiplicative
//! seasonality, tuned for non-negative monthly business metrics:
//! - Level: `l_t = α(y_t / s_t) + (1-α)(l_{t-1} + b_{t-1})`
//! - Trend: `b_t = β(l_t - l_{t-1}) + (1-β)b_{t-1}`
//! - Seasonal: `s_{t+m} = γ(y_t / l_t) + (1-γ)s_t`
//! - Forecast: `ŷ_{t+h} = max(0, (l_t + h*b_t) * s_{t+h})`
//!
//! Months with a zero (or otherwise unusable) observation carry level and
//! trend forward and keep the previous seasonal index, so a missing month
//! does not drag the trend estimate down.

use crate::core::{ModelParameters, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::stats::positive_mean;

/// Bounds on the initial seasonal indices.
const MIN_SEASONAL_INDEX: f64 = 0.5;
const MAX_SEASONAL_INDEX: f64 = 2.0;

/// Components and forecast of one Holt-Winters run.
///
/// Recomputed from scratch on every fit; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    /// Smoothing parameters used for the fit.
    pub parameters: ModelParameters,
    /// Seasonal cycle length.
    pub season_length: usize,
    /// Level after each observation.
    pub level: Vec<f64>,
    /// Trend after each observation.
    pub trend: Vec<f64>,
    /// Seasonal indices: the first `season_length` entries are the initial
    /// estimates, entry `i + season_length` is produced by observation `i`.
    pub seasonal: Vec<f64>,
    /// One-step-ahead in-sample predictions (the first is the observation).
    pub fitted: Vec<f64>,
    /// Point forecast for the requested horizon.
    pub forecast: Vec<f64>,
}

impl FittedModel {
    /// Number of observations the model was fitted on.
    pub fn n_obs(&self) -> usize {
        self.level.len()
    }

    /// Project `horizon` steps past the end of the fitted data.
    pub fn forecast_ahead(&self, horizon: usize) -> Vec<f64> {
        let n = self.n_obs();
        let level = self.level[n - 1];
        let trend = self.trend[n - 1];
        (1..=horizon)
            .map(|h| {
                let s = self.seasonal[n + (h - 1) % self.season_length];
                ((level + h as f64 * trend) * s).max(0.0)
            })
            .collect()
    }

    /// Residuals `actual - fitted` against the data the model was fitted on.
    pub fn residuals(&self, values: &[f64]) -> Vec<f64> {
        values
            .iter()
            .zip(&self.fitted)
            .map(|(y, f)| y - f)
            .collect()
    }
}

/// Fit Holt-Winters with fixed parameters and forecast `horizon` steps.
///
/// # Errors
/// [`ForecastError::InsufficientData`] when `series` holds fewer than two
/// full seasons, [`ForecastError::InvalidParameter`] for a season shorter
/// than 2 or a zero horizon.
///
/// # Example
/// ```
/// use demand_forecast::core::ModelParameters;
/// use demand_forecast::models::fit_and_forecast;
///
/// let series = vec![100.0; 24];
/// let params = ModelParameters::new(0.3, 0.2, 0.2).unwrap();
/// let model = fit_and_forecast(&series, 12, 3, params).unwrap();
/// assert!(model.forecast.iter().all(|f| (f - 100.0).abs() < 1e-9));
/// ```
pub fn fit_and_forecast(
    series: &[f64],
    season_length: usize,
    horizon: usize,
    parameters: ModelParameters,
) -> Result<FittedModel> {
    if season_length < 2 {
        return Err(ForecastError::InvalidParameter(format!(
            "season length must be at least 2, got {season_length}"
        )));
    }
    if horizon == 0 {
        return Err(ForecastError::InvalidParameter(
            "horizon must be at least 1".to_string(),
        ));
    }
    if series.len() < 2 * season_length {
        return Err(ForecastError::InsufficientData {
            needed: 2 * season_length,
            got: series.len(),
        });
    }

    let mut model = smooth(series, season_length, parameters);
    model.forecast = model.forecast_ahead(horizon);
    Ok(model)
}

/// Initial seasonal indices: per-position average of positive values over
/// the global positive average, clamped to `[0.5, 2.0]`.
fn initial_seasonals(values: &[f64], period: usize) -> Vec<f64> {
    let Some(global) = positive_mean(values) else {
        return vec![1.0; period];
    };

    (0..period)
        .map(|p| {
            let same_position: Vec<f64> = values.iter().skip(p).step_by(period).copied().collect();
            match positive_mean(&same_position) {
                Some(avg) => (avg / global).clamp(MIN_SEASONAL_INDEX, MAX_SEASONAL_INDEX),
                None => 1.0,
            }
        })
        .collect()
}

/// Run the recurrences over the whole series. Preconditions checked by caller.
fn smooth(values: &[f64], period: usize, parameters: ModelParameters) -> FittedModel {
    let n = values.len();
    let (alpha, beta, gamma) = (parameters.alpha(), parameters.beta(), parameters.gamma());

    let first_avg = values[..period].iter().sum::<f64>() / period as f64;
    let second_avg = values[period..2 * period].iter().sum::<f64>() / period as f64;

    let mut level = vec![0.0; n];
    let mut trend = vec![0.0; n];
    let mut seasonal = initial_seasonals(values, period);
    seasonal.resize(n + period, 0.0);
    let mut fitted = Vec::with_capacity(n);

    level[0] = first_avg;
    trend[0] = (second_avg - first_avg) / period as f64;
    seasonal[period] = seasonal[0];
    fitted.push(values[0]);

    for i in 1..n {
        let y = values[i];
        let s = seasonal[i];
        let projected = level[i - 1] + trend[i - 1];
        fitted.push((projected * s).max(0.0));

        if y > 0.0 && s > 0.0 {
            level[i] = alpha * (y / s) + (1.0 - alpha) * projected;
            trend[i] = beta * (level[i] - level[i - 1]) + (1.0 - beta) * trend[i - 1];
            seasonal[i + period] = if level[i] > 0.0 {
                gamma * (y / level[i]) + (1.0 - gamma) * s
            } else {
                s
            };
        } else {
            level[i] = projected;
            trend[i] = trend[i - 1];
            seasonal[i + period] = s;
        }
    }

    FittedModel {
        parameters,
        season_length: period,
        level,
        trend,
        seasonal,
        fitted,
        forecast: Vec::new(),
    }
}

/// Holt-Winters forecaster with fixed smoothing parameters.
#[derive(Debug, Clone)]
pub struct HoltWinters {
    parameters: ModelParameters,
    season_length: usize,
    model: Option<FittedModel>,
}

impl HoltWinters {
    /// Create a new Holt-Winters model.
    pub fn new(parameters: ModelParameters, season_length: usize) -> Self {
        Self {
            parameters,
            season_length,
            model: None,
        }
    }

    /// Get the smoothing parameters.
    pub fn parameters(&self) -> ModelParameters {
        self.parameters
    }

    /// Get the seasonal period.
    pub fn season_length(&self) -> usize {
        self.season_length
    }

    /// The fitted components, if fitted.
    pub fn fitted_model(&self) -> Option<&FittedModel> {
        self.model.as_ref()
    }
}

impl Default for HoltWinters {
    fn default() -> Self {
        Self::new(ModelParameters::FALLBACK, 12)
    }
}

impl Forecaster for HoltWinters {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        self.model = Some(fit_and_forecast(
            series.values(),
            self.season_length,
            1,
            self.parameters,
        )?);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let model = self.model.as_ref().ok_or(ForecastError::FitRequired)?;
        Ok(model.forecast_ahead(horizon))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.model.as_ref().map(|m| m.fitted.as_slice())
    }

    fn name(&self) -> &str {
        "HoltWinters"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(alpha: f64, beta: f64, gamma: f64) -> ModelParameters {
        ModelParameters::new(alpha, beta, gamma).unwrap()
    }

    fn seasonal_pattern(n: usize, period: usize, base: f64, amplitude: f64) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let phase = 2.0 * std::f64::consts::PI * i as f64 / period as f64;
                base + amplitude * phase.sin()
            })
            .collect()
    }

    #[test]
    fn hw_constant_series_forecasts_constant() {
        let model = fit_and_forecast(&[100.0; 24], 12, 12, params(0.5, 0.3, 0.4)).unwrap();
        for f in &model.forecast {
            assert_relative_eq!(*f, 100.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn hw_component_lengths() {
        let model = fit_and_forecast(&[50.0; 30], 6, 4, params(0.3, 0.2, 0.2)).unwrap();
        assert_eq!(model.level.len(), 30);
        assert_eq!(model.trend.len(), 30);
        assert_eq!(model.seasonal.len(), 36);
        assert_eq!(model.fitted.len(), 30);
        assert_eq!(model.forecast.len(), 4);
        assert_eq!(model.n_obs(), 30);
    }

    #[test]
    fn hw_reproduces_exact_seasonal_pattern() {
        let values = seasonal_pattern(48, 12, 100.0, 30.0);
        let model = fit_and_forecast(&values, 12, 12, params(0.5, 0.1, 0.3)).unwrap();

        for (h, f) in model.forecast.iter().enumerate() {
            assert_relative_eq!(*f, values[36 + h], epsilon = 1e-6);
        }
    }

    #[test]
    fn hw_initial_state_from_first_two_seasons() {
        let mut values = vec![10.0; 4];
        values.extend([20.0; 4]);
        let model = fit_and_forecast(&values, 4, 1, params(0.3, 0.2, 0.2)).unwrap();

        assert_relative_eq!(model.level[0], 10.0);
        // (20 - 10) / 4
        assert_relative_eq!(model.trend[0], 2.5);
    }

    #[test]
    fn hw_initial_seasonals_are_clamped() {
        // Position 0 is 100x the rest, so its raw ratio exceeds the upper clamp.
        let values: Vec<f64> = (0..8).map(|i| if i % 4 == 0 { 1000.0 } else { 10.0 }).collect();
        let seasonals = initial_seasonals(&values, 4);
        assert_relative_eq!(seasonals[0], MAX_SEASONAL_INDEX);
        assert_relative_eq!(seasonals[1], MIN_SEASONAL_INDEX);
    }

    #[test]
    fn hw_zero_months_carry_state_forward() {
        let mut values = vec![100.0; 24];
        values[20] = 0.0;
        let model = fit_and_forecast(&values, 12, 1, params(0.3, 0.2, 0.2)).unwrap();

        assert_relative_eq!(model.level[20], model.level[19] + model.trend[19]);
        assert_relative_eq!(model.trend[20], model.trend[19]);
        assert_relative_eq!(model.seasonal[32], model.seasonal[20]);
    }

    #[test]
    fn hw_all_zero_series_forecasts_zero() {
        let model = fit_and_forecast(&[0.0; 24], 12, 3, params(0.3, 0.2, 0.2)).unwrap();
        assert_eq!(model.forecast, vec![0.0; 3]);
    }

    #[test]
    fn hw_forecast_is_never_negative() {
        // Steep decline drives the trend well below zero.
        let values: Vec<f64> = (0..24).map(|i| (240.0 - 10.0 * i as f64).max(1.0)).collect();
        let model = fit_and_forecast(&values, 12, 24, params(0.9, 0.5, 0.1)).unwrap();
        assert!(model.forecast.iter().all(|&f| f >= 0.0));
    }

    #[test]
    fn hw_insufficient_data() {
        assert_eq!(
            fit_and_forecast(&[1.0; 23], 12, 1, params(0.3, 0.2, 0.2)),
            Err(ForecastError::InsufficientData {
                needed: 24,
                got: 23
            })
        );
    }

    #[test]
    fn hw_rejects_bad_shape_arguments() {
        assert!(matches!(
            fit_and_forecast(&[1.0; 24], 1, 1, params(0.3, 0.2, 0.2)),
            Err(ForecastError::InvalidParameter(_))
        ));
        assert!(matches!(
            fit_and_forecast(&[1.0; 24], 12, 0, params(0.3, 0.2, 0.2)),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn hw_is_deterministic() {
        let values = seasonal_pattern(36, 12, 80.0, 20.0);
        let a = fit_and_forecast(&values, 12, 6, params(0.4, 0.15, 0.25)).unwrap();
        let b = fit_and_forecast(&values, 12, 6, params(0.4, 0.15, 0.25)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn hw_forecaster_fit_predict() {
        let ts = TimeSeries::new(seasonal_pattern(36, 12, 80.0, 20.0)).unwrap();
        let mut model = HoltWinters::new(params(0.3, 0.2, 0.2), 12);
        assert!(!model.is_fitted());
        assert!(model.predict(3).is_err());

        model.fit(&ts).unwrap();
        assert!(model.is_fitted());
        assert_eq!(model.predict(3).unwrap().len(), 3);
        assert_eq!(model.fitted_values().unwrap().len(), 36);
        assert_eq!(model.name(), "HoltWinters");
    }

    #[test]
    fn hw_residuals_match_fitted() {
        let values = seasonal_pattern(24, 6, 50.0, 5.0);
        let model = fit_and_forecast(&values, 6, 1, params(0.3, 0.1, 0.1)).unwrap();
        let residuals = model.residuals(&values);
        for i in 0..values.len() {
            assert_relative_eq!(residuals[i], values[i] - model.fitted[i], epsilon = 1e-10);
        }
    }
}
