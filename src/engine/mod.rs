//! Forecast orchestration.
//!
//! [`ForecastEngine`] chains outlier treatment, parameter search, the
//! Holt-Winters fit, partial-period blending and walk-forward validation into
//! one call that always returns a [`ForecastResult`].
//!
//! # Example
//!
//! ```
//! use demand_forecast::engine::{ForecastConfig, ForecastEngine};
//!
//! let history: Vec<f64> = (0..36)
//!     .map(|i| 1_000.0 + 200.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
//!     .collect();
//!
//! let engine = ForecastEngine::new(ForecastConfig::default()).unwrap();
//! let result = engine.run(&history, None);
//!
//! assert!(result.monthly_forecast > 0.0);
//! assert_eq!(result.annual_forecast, result.monthly_forecast * 12.0);
//! assert!(result.backtest.is_some());
//! ```

mod cache;
mod config;
mod orchestrator;
mod result;

pub use cache::{CacheStats, ForecastCache};
pub use config::{BacktestConfig, BlendPolicy, ForecastConfig, ParameterSelection};
pub use orchestrator::{forecast, ForecastEngine};
pub use result::{
    BacktestFold, BacktestSummary, DataQuality, DegenerateKind, Diagnostic, ForecastResult,
    ModelSummary, OutlierSummary, ParameterSource, PartialPeriod, PredictionInterval,
};
