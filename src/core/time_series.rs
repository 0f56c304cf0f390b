//! Monthly time series of a non-negative business metric.

use crate::error::{ForecastError, Result};
use crate::utils::stats;
use chrono::{Datelike, Months, NaiveDate};

/// A chronological series of monthly observations.
///
/// Values are finite and non-negative (counts, revenue). The series is
/// immutable once built; sub-windows are produced with [`TimeSeries::slice`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    values: Vec<f64>,
    /// First day of the month holding `values[0]`, when known.
    start: Option<NaiveDate>,
}

impl TimeSeries {
    /// Create a series without calendar information.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        validate_values(&values)?;
        Ok(Self {
            values,
            start: None,
        })
    }

    /// Create a series whose first observation belongs to the month of `start`.
    ///
    /// The anchor is normalized to the first day of that month.
    pub fn monthly(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        Ok(Self::new(values)?.with_start(start))
    }

    /// Build a series from untrusted data, replacing NaN/Inf with zero and
    /// clamping negatives to zero.
    ///
    /// Returns the series and the number of values that had to be changed.
    pub fn sanitized(raw: &[f64]) -> (Self, usize) {
        let mut changed = 0;
        let values = raw
            .iter()
            .map(|&v| {
                if v.is_finite() && v >= 0.0 {
                    v
                } else {
                    changed += 1;
                    0.0
                }
            })
            .collect();
        (
            Self {
                values,
                start: None,
            },
            changed,
        )
    }

    /// Attach a calendar anchor to an existing series.
    pub fn with_start(mut self, start: NaiveDate) -> Self {
        self.start = Some(first_of_month(start));
        self
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Observation values in chronological order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Calendar month of the first observation, if anchored.
    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    /// Calendar month of observation `index` (may lie past the end).
    pub fn month_at(&self, index: usize) -> Option<NaiveDate> {
        let offset = u32::try_from(index).ok()?;
        self.start?.checked_add_months(Months::new(offset))
    }

    /// The month immediately after the last observation.
    pub fn next_month(&self) -> Option<NaiveDate> {
        self.month_at(self.len())
    }

    /// Arithmetic mean of the observations (0 for an empty series).
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            0.0
        } else {
            stats::mean(&self.values)
        }
    }

    /// Whether every observation is zero.
    pub fn is_all_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }

    /// Whether every observation equals the first one.
    pub fn is_constant(&self) -> bool {
        match self.values.first() {
            Some(&first) => self.values.iter().all(|&v| v == first),
            None => true,
        }
    }

    /// Sub-window `[start, end)`, keeping the calendar anchor aligned.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: end,
                got: self.len(),
            });
        }

        Ok(TimeSeries {
            values: self.values[start..end].to_vec(),
            start: self.month_at(start),
        })
    }
}

fn validate_values(values: &[f64]) -> Result<()> {
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(ForecastError::NonFiniteValue { index });
        }
        if value < 0.0 {
            return Err(ForecastError::NegativeValue { index, value });
        }
    }
    Ok(())
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
