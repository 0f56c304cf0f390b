//! Core data structures for monthly demand forecasting.

mod params;
mod time_series;

pub use params::ModelParameters;
pub use time_series::TimeSeries;
