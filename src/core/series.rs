//! A single numeric column paired with the table's dates.

use crate::error::{AnalyticsError, Result};
use chrono::{Days, NaiveDate};
use std::ops::Range;

/// One numeric column's values, paired 1:1 with dates.
///
/// Missing values are stored as `NaN`. Analyzers call [`Series::observed`]
/// to drop them before computing statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl Series {
    /// Create a series; dates and values must have the same length.
    pub fn new(name: impl Into<String>, dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(AnalyticsError::InvalidParameter(format!(
                "series has {} dates but {} values",
                dates.len(),
                values.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            dates,
            values,
        })
    }

    /// Build a daily series starting at `start`, one value per day.
    ///
    /// Fails when the dates would run past [`NaiveDate::MAX`].
    pub fn daily(name: impl Into<String>, start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let dates = days_from(start, 0..values.len() as u64)?;
        Self::new(name, dates, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of rows, missing values included.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of rows without a value.
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    /// Latest date in the series, whether or not that row has a value.
    pub fn max_date(&self) -> Option<NaiveDate> {
        self.dates.iter().max().copied()
    }

    /// Copy of the series with missing rows removed, order preserved.
    pub fn observed(&self) -> Series {
        let (dates, values) = self
            .dates
            .iter()
            .zip(self.values.iter())
            .filter(|(_, v)| !v.is_nan())
            .map(|(d, v)| (*d, *v))
            .unzip();
        Series {
            name: self.name.clone(),
            dates,
            values,
        }
    }

    /// Present values only, in order.
    pub fn observed_values(&self) -> Vec<f64> {
        self.values.iter().copied().filter(|v| !v.is_nan()).collect()
    }
}

/// `start + offset` for every day offset in `offsets`.
pub(crate) fn days_from(start: NaiveDate, offsets: Range<u64>) -> Result<Vec<NaiveDate>> {
    offsets
        .map(|offset| {
            start.checked_add_days(Days::new(offset)).ok_or_else(|| {
                AnalyticsError::InvalidParameter(format!(
                    "{} days after {} is past the last representable date",
                    offset, start
                ))
            })
        })
        .collect()
}
