//! Baseline forecasting models.
//!
//! Simple references to compare the seasonal model against.

mod seasonal_naive;

pub use seasonal_naive::SeasonalNaive;
