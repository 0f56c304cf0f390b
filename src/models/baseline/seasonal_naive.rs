//! Seasonal Naive forecasting model.
//!
//! Forecasts by repeating the value from the same position in the last
//! seasonal cycle. Serves as the MASE reference during backtesting.

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;

/// Seasonal Naive forecaster.
#[derive(Debug, Clone)]
pub struct SeasonalNaive {
    period: usize,
    last_season: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
}

impl SeasonalNaive {
    /// Create a new SeasonalNaive model with the given seasonal period.
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
            last_season: None,
            fitted: None,
        }
    }

    /// Get the seasonal period.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Seasonal naive forecast straight from a history slice.
    ///
    /// Repeats the last full season; with less than one season of history it
    /// repeats the last value, and an empty history forecasts zero.
    pub fn forecast_from(&self, history: &[f64], horizon: usize) -> Vec<f64> {
        let n = history.len();
        if n >= self.period {
            let last = &history[n - self.period..];
            (0..horizon).map(|h| last[h % self.period]).collect()
        } else {
            vec![history.last().copied().unwrap_or(0.0); horizon]
        }
    }
}

impl Default for SeasonalNaive {
    fn default() -> Self {
        Self::new(12)
    }
}

impl Forecaster for SeasonalNaive {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        if values.len() < self.period {
            return Err(ForecastError::InsufficientData {
                needed: self.period,
                got: values.len(),
            });
        }

        // y_hat[t] = y[t - period]; the first cycle has no reference and echoes itself.
        let fitted = values
            .iter()
            .enumerate()
            .map(|(t, &y)| if t >= self.period { values[t - self.period] } else { y })
            .collect();

        self.last_season = Some(values[values.len() - self.period..].to_vec());
        self.fitted = Some(fitted);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Vec<f64>> {
        let last = self
            .last_season
            .as_ref()
            .ok_or(ForecastError::FitRequired)?;
        Ok((0..horizon).map(|h| last[h % self.period]).collect())
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn name(&self) -> &str {
        "SeasonalNaive"
    }
}
