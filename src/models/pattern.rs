//! Pattern-repetition forecast with linear drift.
//!
//! This is a heuristic, not a statistical model. The last `min(horizon, n)`
//! observations are tiled forward, shifted so the tile starts from the last
//! observed value, and a damped linear drift (half the recent slope per day)
//! is added on top. The band half-width is the sample standard deviation of
//! the last `min(30, n)` observations.

use crate::core::{days_from, ForecastResult, ForecastRow, Series};
use crate::error::{AnalyticsError, Result};
use crate::models::trend::{recent_slope, TREND_WINDOW};
use crate::models::Forecaster;
use crate::utils::stats::std_dev;
use chrono::NaiveDate;

/// Fraction of the recent slope applied per forecast step.
const DRIFT_DAMPING: f64 = 0.5;

/// Forecaster that repeats the most recent window of history.
#[derive(Debug, Clone, Default)]
pub struct PatternRepetition {
    history: Option<Vec<f64>>,
    last_date: Option<NaiveDate>,
}

impl PatternRepetition {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Forecaster for PatternRepetition {
    fn fit(&mut self, series: &Series) -> Result<()> {
        let values = series.observed_values();
        if values.is_empty() {
            return Err(AnalyticsError::InsufficientData { needed: 1, got: 0 });
        }

        self.last_date = series.max_date();
        self.history = Some(values);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<ForecastResult> {
        let (history, last_date) = match (&self.history, self.last_date) {
            (Some(history), Some(last_date)) => (history, last_date),
            _ => return Err(AnalyticsError::FitRequired),
        };

        if horizon == 0 {
            return Ok(ForecastResult::new());
        }

        let n = history.len();
        let pattern_length = horizon.min(n);
        let pattern = &history[n - pattern_length..];

        let last_value = history[n - 1];
        let offset = last_value - pattern[0];
        let slope = recent_slope(history);

        let half_width = {
            let std = std_dev(&history[n - TREND_WINDOW.min(n)..]);
            if std.is_finite() {
                std
            } else {
                0.0
            }
        };

        tracing::debug!(
            horizon,
            pattern_length,
            offset,
            slope,
            half_width,
            "pattern repetition forecast"
        );

        let dates = days_from(last_date, 1..(horizon as u64).saturating_add(1))?;
        let rows = dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| {
                let predicted = pattern[i % pattern_length]
                    + offset
                    + slope * (i + 1) as f64 * DRIFT_DAMPING;
                ForecastRow::from_band(date, predicted, half_width)
            })
            .collect();

        Ok(ForecastResult::from_rows(rows))
    }

    fn name(&self) -> &str {
        "PatternRepetition"
    }

    fn is_fitted(&self) -> bool {
        self.history.is_some()
    }
}

/// Forecast the next `horizon_days` days of a series.
///
/// Fails with [`AnalyticsError::InsufficientData`] when the series has no
/// observed values.
pub fn forecast(series: &Series, horizon_days: usize) -> Result<ForecastResult> {
    let mut model = PatternRepetition::new();
    model.fit(series)?;
    model.predict(horizon_days)
}
