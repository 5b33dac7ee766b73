//! Forecast result structure: one row per future day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single forecast step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub predicted: f64,
    pub best_case: f64,
    pub worst_case: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
}

impl ForecastRow {
    /// Build a row from a point prediction and the band half-width.
    ///
    /// Best/worst case sit one half-width away from the prediction, the
    /// confidence bounds half of that.
    pub fn from_band(date: NaiveDate, predicted: f64, half_width: f64) -> Self {
        Self {
            date,
            predicted,
            best_case: predicted + half_width,
            worst_case: predicted - half_width,
            confidence_lower: predicted - half_width * 0.5,
            confidence_upper: predicted + half_width * 0.5,
        }
    }
}

/// A forecast over consecutive future days.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForecastResult {
    rows: Vec<ForecastRow>,
}

impl ForecastResult {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<ForecastRow>) -> Self {
        Self { rows }
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn first(&self) -> Option<&ForecastRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&ForecastRow> {
        self.rows.last()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// Point predictions in date order.
    pub fn predicted(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.predicted).collect()
    }

    pub fn into_rows(self) -> Vec<ForecastRow> {
        self.rows
    }
}

impl IntoIterator for ForecastResult {
    type Item = ForecastRow;
    type IntoIter = std::vec::IntoIter<ForecastRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
