//! Forecaster trait defining the common interface for all models.

use crate::core::TimeSeries;
use crate::error::Result;

/// Common interface for all forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the time series data.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Generate point predictions for the specified horizon.
    fn predict(&self, horizon: usize) -> Result<Vec<f64>>;

    /// Get the fitted values (in-sample predictions).
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
///
/// # Example
///
/// ```
/// use demand_forecast::models::{BoxedForecaster, Forecaster};
/// use demand_forecast::models::baseline::SeasonalNaive;
///
/// let model: BoxedForecaster = Box::new(SeasonalNaive::new(12));
/// assert_eq!(model.name(), "SeasonalNaive");
/// ```
pub type BoxedForecaster = Box<dyn Forecaster>;
