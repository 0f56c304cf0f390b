//! Exponential smoothing models.
//!
//! Holt-Winters triple exponential smoothing with multiplicative
//! seasonality for non-negative monthly metrics.

mod holt_winters;

pub use holt_winters::{fit_and_forecast, FittedModel, HoltWinters};
