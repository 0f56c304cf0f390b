//! Forecasting models.

mod traits;

pub mod baseline;
pub mod exponential;

pub use exponential::{fit_and_forecast, FittedModel, HoltWinters};
pub use traits::{BoxedForecaster, Forecaster};
