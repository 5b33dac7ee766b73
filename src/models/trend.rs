//! Recent-slope trend summary.

use crate::core::Series;
use crate::error::{AnalyticsError, Result};
use crate::utils::round_to;
use serde::Serialize;

/// Number of trailing observations used for the recent slope.
pub const TREND_WINDOW: usize = 30;

/// Direction of the recent trend.
///
/// A slope of exactly zero reports [`Direction::Down`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// Trend summary of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendDirection {
    pub direction: Direction,
    /// Average change per observation over the recent window, 4 decimals.
    pub slope: f64,
    /// Change from first to last observation in percent, 2 decimals.
    pub total_change_pct: f64,
}

/// Average change per step over the last `min(TREND_WINDOW, n)` values.
///
/// Computed as `(last - values[n - w]) / w`; zero for fewer than two values.
pub(crate) fn recent_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n <= 1 {
        return 0.0;
    }
    let window = TREND_WINDOW.min(n);
    (values[n - 1] - values[n - window]) / window as f64
}

/// Summarize the direction and size of a series' trend.
///
/// When the first observed value is zero the percentage change is undefined
/// and reported as `0.0`.
pub fn trend_direction(series: &Series) -> Result<TrendDirection> {
    let values = series.observed_values();
    let (first, last) = match (values.first(), values.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Err(AnalyticsError::InsufficientData { needed: 1, got: 0 }),
    };

    let slope = recent_slope(&values);
    let total_change_pct = if first == 0.0 {
        tracing::warn!(column = series.name(), "first value is zero, reporting 0% change");
        0.0
    } else {
        (last - first) / first * 100.0
    };

    Ok(TrendDirection {
        direction: if slope > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        },
        slope: round_to(slope, 4),
        total_change_pct: round_to(total_change_pct, 2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn series(values: Vec<f64>) -> Series {
        Series::daily("v", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), values).unwrap()
    }

    #[test]
    fn recent_slope_uses_trailing_window() {
        assert_eq!(recent_slope(&[]), 0.0);
        assert_eq!(recent_slope(&[5.0]), 0.0);
        assert_relative_eq!(recent_slope(&[1.0, 3.0]), 1.0);

        // 40 values rising by 1: window is 30, (39 - 10) / 30
        let values: Vec<f64> = (0..40).map(|i| i as f64).collect();
        assert_relative_eq!(recent_slope(&values), 29.0 / 30.0, epsilon = 1e-12);
    }

    #[test]
    fn trend_direction_upward() {
        let trend = trend_direction(&series(vec![100.0, 102.0, 98.0, 101.0, 99.0, 150.0])).unwrap();
        assert_eq!(trend.direction, Direction::Up);
        assert_relative_eq!(trend.slope, 8.3333);
        assert_relative_eq!(trend.total_change_pct, 50.0);
    }

    #[test]
    fn trend_direction_downward_and_flat() {
        let down = trend_direction(&series(vec![10.0, 8.0, 5.0])).unwrap();
        assert_eq!(down.direction, Direction::Down);
        assert_relative_eq!(down.total_change_pct, -50.0);

        let flat = trend_direction(&series(vec![4.0, 4.0, 4.0])).unwrap();
        assert_eq!(flat.direction, Direction::Down);
        assert_eq!(flat.slope, 0.0);
        assert_eq!(flat.total_change_pct, 0.0);
    }

    #[test]
    fn trend_direction_ignores_missing_values() {
        let trend = trend_direction(&series(vec![f64::NAN, 10.0, f64::NAN, 20.0])).unwrap();
        assert_relative_eq!(trend.total_change_pct, 100.0);
        assert_relative_eq!(trend.slope, 5.0);
    }

    #[test]
    fn trend_direction_zero_first_value_falls_back() {
        let trend = trend_direction(&series(vec![0.0, 5.0, 10.0])).unwrap();
        assert_eq!(trend.direction, Direction::Up);
        assert_eq!(trend.total_change_pct, 0.0);
    }

    #[test]
    fn trend_direction_requires_data() {
        let err = trend_direction(&series(vec![f64::NAN])).unwrap_err();
        assert_eq!(err, AnalyticsError::InsufficientData { needed: 1, got: 0 });
    }

    #[test]
    fn direction_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Direction::Up).unwrap(), "\"up\"");
        assert_eq!(Direction::Down.to_string(), "down");
    }
}
