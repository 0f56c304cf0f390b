//! Utility functions for forecasting models.

pub mod cross_validation;
pub mod metrics;
pub mod optimization;
pub mod stats;

pub use cross_validation::{
    walk_forward_validate, walk_forward_with, BacktestReport, Fold, WalkForwardConfig,
};
pub use metrics::{calculate_metrics, calculate_metrics_with_baseline, AccuracyMetrics};
pub use optimization::{
    holdout_len, search_best_parameters, search_with_grid, ParameterGrid, SearchOutcome,
};
pub use stats::normal_critical_value;
