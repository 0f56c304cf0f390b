//! # demand-forecast
//!
//! Seasonal demand forecasting for monthly business metrics.
//!
//! Takes a history of monthly totals and returns next-month and annual
//! projections with out-of-sample accuracy, outlier and data-quality
//! diagnostics. The pipeline winsorizes outliers, grid-searches
//! Holt-Winters smoothing parameters, optionally blends in the month in
//! progress and scores itself with walk-forward validation. It never fails:
//! degenerate inputs produce a zero forecast with low confidence and a list
//! of [`engine::Diagnostic`]s.
//!
//! # Example
//!
//! ```
//! use demand_forecast::prelude::*;
//!
//! let mut history = vec![100.0; 24];
//! history[12] = 10_000.0;
//!
//! let result = forecast(&history, None);
//! assert!(result.monthly_forecast < 1_000.0);
//! assert_eq!(result.outliers.indices, vec![12]);
//! ```

#![allow(clippy::needless_range_loop)]

pub mod core;
pub mod detection;
pub mod engine;
pub mod error;
pub mod models;
pub mod utils;
pub mod validation;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{ModelParameters, TimeSeries};
    pub use crate::detection::{detect_and_treat, OutlierImpact, OutlierReport};
    pub use crate::engine::{
        forecast, DataQuality, Diagnostic, ForecastConfig, ForecastEngine, ForecastResult,
        PartialPeriod,
    };
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::{fit_and_forecast, Forecaster};
    pub use crate::utils::{calculate_metrics, walk_forward_validate, AccuracyMetrics};
    pub use crate::validation::{AccuracyReport, Confidence, ForecastQuality};
}
