//! Detection utilities for monthly series.
//!
//! This module provides outlier detection with winsorization.

mod outlier;

pub use outlier::{detect_and_treat, Bounds, OutlierImpact, OutlierReport, DEFAULT_SENSITIVITY};
