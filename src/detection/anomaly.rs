//! Z-score anomaly detection.
//!
//! A point is flagged when its absolute standardized deviation from the
//! series mean is strictly greater than the threshold. Mean and standard
//! deviation (sample, n-1) are computed over the observed values only.

use crate::core::Series;
use crate::utils::round_to;
use crate::utils::stats::{mean, std_dev};
use chrono::NaiveDate;
use serde::Serialize;

/// A flagged observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalyRow {
    pub date: NaiveDate,
    pub value: f64,
    /// Absolute standardized deviation from the mean.
    pub z_score: f64,
    /// `(value - mean) / mean * 100`, 2 decimals; `0.0` when the mean is zero.
    pub deviation_pct: f64,
}

/// Aggregate view of the flagged rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalySummary {
    pub count: usize,
    /// Flagged rows as a share of all rows, 2 decimals.
    pub percentage: f64,
    /// Largest absolute `deviation_pct` among flagged rows.
    pub max_deviation: Option<f64>,
}

/// Flagged rows plus their summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyResult {
    pub summary: AnomalySummary,
    pub anomalies: Vec<AnomalyRow>,
    /// Threshold used for detection.
    pub threshold: f64,
}

impl AnomalyResult {
    pub fn count(&self) -> usize {
        self.summary.count
    }

    /// Check if the observation on `date` was flagged.
    pub fn is_anomaly(&self, date: NaiveDate) -> bool {
        self.anomalies.iter().any(|a| a.date == date)
    }
}

/// Absolute z-scores for every row of `values`.
///
/// Missing rows score `NaN`. With fewer than two observations or zero
/// variance every observed row scores `0.0`.
pub fn z_scores(values: &[f64]) -> Vec<f64> {
    let observed: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let m = mean(&observed);
    let std = std_dev(&observed);
    let degenerate = !std.is_finite() || std < 1e-10;

    values
        .iter()
        .map(|&v| {
            if v.is_nan() {
                f64::NAN
            } else if degenerate {
                0.0
            } else {
                ((v - m) / std).abs()
            }
        })
        .collect()
}

/// Flag the rows of `series` whose z-score exceeds `threshold`.
pub fn detect(series: &Series, threshold: f64) -> Vec<AnomalyRow> {
    let observed = series.observed_values();
    let m = mean(&observed);

    let rows: Vec<AnomalyRow> = z_scores(series.values())
        .into_iter()
        .zip(series.dates().iter().zip(series.values().iter()))
        .filter(|(z, _)| *z > threshold)
        .map(|(z_score, (&date, &value))| AnomalyRow {
            date,
            value,
            z_score,
            deviation_pct: deviation_pct(value, m),
        })
        .collect();

    tracing::debug!(
        column = series.name(),
        threshold,
        flagged = rows.len(),
        "z-score detection"
    );
    rows
}

fn deviation_pct(value: f64, mean: f64) -> f64 {
    if mean == 0.0 {
        return 0.0;
    }
    round_to((value - mean) / mean * 100.0, 2)
}

/// Detect anomalies and summarize them.
///
/// The percentage is relative to all rows of the series, missing rows
/// included; it is `0.0` for an empty series.
pub fn summarize(series: &Series, threshold: f64) -> AnomalyResult {
    let anomalies = detect(series, threshold);
    let total = series.len();

    let percentage = if total == 0 {
        0.0
    } else {
        round_to(anomalies.len() as f64 / total as f64 * 100.0, 2)
    };

    let max_deviation = anomalies
        .iter()
        .map(|a| a.deviation_pct.abs())
        .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.max(d))));

    AnomalyResult {
        summary: AnomalySummary {
            count: anomalies.len(),
            percentage,
            max_deviation,
        },
        anomalies,
        threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(values: Vec<f64>) -> Series {
        Series::daily("v", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), values).unwrap()
    }

    #[test]
    fn detect_flags_single_outlier() {
        let mut values = vec![10.0; 9];
        values.push(100.0);
        let s = series(values);

        let rows = detect(&s, 2.0);
        assert_eq!(rows.len(), 1);

        let row = rows[0];
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_relative_eq!(row.value, 100.0);
        assert!(row.z_score > 2.0);
        // mean is 19: (100 - 19) / 19 * 100
        assert_relative_eq!(row.deviation_pct, 426.32);
    }

    #[test]
    fn five_point_outlier_is_bounded_by_sample_std() {
        // With n points the largest possible z is (n - 1) / sqrt(n).
        let s = series(vec![10.0, 10.0, 10.0, 10.0, 100.0]);
        assert!(detect(&s, 2.0).is_empty());

        let rows = detect(&s, 1.5);
        assert_eq!(rows.len(), 1);
        assert_relative_eq!(rows[0].z_score, 4.0 / 5.0_f64.sqrt(), epsilon = 1e-10);
        // mean is 28: 72 / 28 * 100
        assert_relative_eq!(rows[0].deviation_pct, 257.14);
    }

    #[test]
    fn constant_series_has_no_anomalies() {
        let s = series(vec![7.0; 50]);
        for threshold in [0.1, 1.0, 2.0, 3.0] {
            assert!(detect(&s, threshold).is_empty());
        }
        assert!(z_scores(s.values()).iter().all(|&z| z == 0.0));
    }

    #[test]
    fn threshold_is_strict() {
        // mean 10, std 10: the outer points sit at exactly z = 1
        let s = series(vec![0.0, 10.0, 20.0]);
        let z = z_scores(s.values());
        assert!(detect(&s, z[0]).is_empty());
        assert_eq!(detect(&s, z[0] - 1e-9).len(), 2);
    }

    #[test]
    fn missing_values_are_ignored() {
        let mut values = vec![10.0; 9];
        values.push(100.0);
        values.insert(3, f64::NAN);
        let s = series(values);

        let z = z_scores(s.values());
        assert!(z[3].is_nan());
        let rows = detect(&s, 2.0);
        assert_eq!(rows.len(), 1);
        assert_relative_eq!(rows[0].value, 100.0);
    }

    #[test]
    fn zero_mean_deviation_falls_back_to_zero() {
        let mut values = vec![-1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0];
        values.push(0.0);
        values.push(-20.0);
        values.push(20.0);
        let s = series(values);

        let rows = detect(&s, 2.0);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.deviation_pct == 0.0));
    }

    #[test]
    fn summarize_reports_counts() {
        let mut values = vec![10.0; 9];
        values.push(100.0);
        let result = summarize(&series(values), 2.0);

        assert_eq!(result.count(), 1);
        assert_relative_eq!(result.summary.percentage, 10.0);
        assert_relative_eq!(result.summary.max_deviation.unwrap(), 426.32);
        assert!(result.is_anomaly(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()));
        assert_relative_eq!(result.threshold, 2.0);
    }

    #[test]
    fn summarize_without_anomalies() {
        let result = summarize(&series(vec![5.0, 5.0, 5.0]), 2.0);
        assert_eq!(result.summary.count, 0);
        assert_eq!(result.summary.percentage, 0.0);
        assert!(result.summary.max_deviation.is_none());
        assert!(result.anomalies.is_empty());

        let empty = summarize(&series(vec![]), 2.0);
        assert_eq!(empty.summary.percentage, 0.0);
    }

    #[test]
    fn summarize_percentage_counts_missing_rows() {
        let mut values = vec![10.0; 9];
        values.push(100.0);
        values.extend([f64::NAN; 10]);
        let result = summarize(&series(values), 2.0);
        assert_relative_eq!(result.summary.percentage, 5.0);
    }
}
