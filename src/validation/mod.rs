//! Classification of forecast accuracy.
//!
//! # Example
//!
//! ```
//! use demand_forecast::utils::calculate_metrics;
//! use demand_forecast::validation::{AccuracyReport, ClassificationPolicy, Confidence};
//!
//! let actual = vec![100.0, 110.0, 95.0, 105.0];
//! let forecast = vec![102.0, 108.0, 97.0, 104.0];
//! let metrics = calculate_metrics(&actual, &forecast, None).unwrap();
//!
//! let report = AccuracyReport::new(metrics, &ClassificationPolicy::default());
//! assert_eq!(report.confidence(), Confidence::High);
//! ```

mod accuracy;

pub use accuracy::{AccuracyReport, ClassificationPolicy, Confidence, ForecastQuality, Threshold};
