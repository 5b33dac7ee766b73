//! Calendar seasonality: average value per weekday and per month.
//!
//! Strength is the spread of the group means relative to their average,
//! `(max - min) / |mean of means| * 100`, rounded to 2 decimals.

use crate::core::{Series, Table};
use crate::error::{AnalyticsError, Result};
use crate::utils::round_to;
use crate::utils::stats::mean;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Group means for one calendar granularity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodPattern {
    /// Mean value per period index. Only periods with observations appear.
    pub pattern: BTreeMap<u32, f64>,
    /// Normalized spread of the group means in percent (never negative).
    pub strength: f64,
    /// Index with the highest mean (lowest index wins ties).
    pub peak: u32,
    /// Index with the lowest mean (lowest index wins ties).
    pub low: u32,
}

/// Result of calendar seasonality analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalityResult {
    /// Weekday index 0 (Monday) to 6 (Sunday).
    pub weekly: PeriodPattern,
    /// Month index 1 (January) to 12 (December).
    pub monthly: PeriodPattern,
}

/// Weekday index with Monday as 0.
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_monday()
}

/// Analyze weekly and monthly patterns of one table column.
pub fn analyze(table: &Table, column: &str) -> Result<SeasonalityResult> {
    analyze_series(&table.series(column)?)
}

/// Analyze weekly and monthly patterns of a series.
///
/// Fails with [`AnalyticsError::InsufficientData`] when the series has no
/// observed values.
pub fn analyze_series(series: &Series) -> Result<SeasonalityResult> {
    let observed = series.observed();
    if observed.is_empty() {
        return Err(AnalyticsError::InsufficientData { needed: 1, got: 0 });
    }

    let weekly = period_pattern(&group_means(&observed, weekday_index), series.name());
    let monthly = period_pattern(&group_means(&observed, |d| d.month()), series.name());

    tracing::debug!(
        column = series.name(),
        weekly_strength = weekly.strength,
        monthly_strength = monthly.strength,
        "seasonality"
    );

    Ok(SeasonalityResult { weekly, monthly })
}

fn group_means<F>(series: &Series, key: F) -> BTreeMap<u32, f64>
where
    F: Fn(NaiveDate) -> u32,
{
    let mut sums: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for (&date, &value) in series.dates().iter().zip(series.values()) {
        let entry = sums.entry(key(date)).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(k, (sum, count))| (k, sum / count as f64))
        .collect()
}

/// Build the pattern summary from non-empty group means.
fn period_pattern(means: &BTreeMap<u32, f64>, column: &str) -> PeriodPattern {
    let mut peak: Option<(u32, f64)> = None;
    let mut low: Option<(u32, f64)> = None;
    for (&index, &value) in means {
        if peak.map_or(true, |(_, best)| value > best) {
            peak = Some((index, value));
        }
        if low.map_or(true, |(_, best)| value < best) {
            low = Some((index, value));
        }
    }

    let (peak_index, max) = peak.unwrap_or((0, 0.0));
    let (low_index, min) = low.unwrap_or((0, 0.0));

    let values: Vec<f64> = means.values().copied().collect();
    let denominator = mean(&values).abs();
    let strength = if denominator < 1e-12 || !denominator.is_finite() {
        tracing::warn!(column, "group means average to zero, reporting strength 0");
        0.0
    } else {
        round_to((max - min) / denominator * 100.0, 2)
    };

    PeriodPattern {
        pattern: means.clone(),
        strength,
        peak: peak_index,
        low: low_index,
    }
}

/// Weekly seasonal component: for every row, its weekday mean minus the
/// overall mean. Rows without a value yield `NaN`.
pub fn seasonal_component(table: &Table, column: &str) -> Result<Vec<f64>> {
    let series = table.series(column)?;
    let observed = series.observed();
    let weekday_means = group_means(&observed, weekday_index);
    let overall = mean(observed.values());

    Ok(series
        .dates()
        .iter()
        .zip(series.values())
        .map(|(&date, &value)| {
            if value.is_nan() {
                f64::NAN
            } else {
                weekday_means[&weekday_index(date)] - overall
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // 2024-01-01 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn weekly_series(weeks: usize, profile: [f64; 7]) -> Series {
        let values = (0..weeks * 7).map(|i| profile[i % 7]).collect();
        Series::daily("v", monday(), values).unwrap()
    }

    #[test]
    fn weekly_pattern_recovers_profile() {
        let profile = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0];
        let result = analyze_series(&weekly_series(4, profile)).unwrap();

        assert_eq!(result.weekly.pattern.len(), 7);
        for (i, expected) in profile.iter().enumerate() {
            assert_relative_eq!(result.weekly.pattern[&(i as u32)], *expected);
        }
        assert_eq!(result.weekly.peak, 6);
        assert_eq!(result.weekly.low, 0);
        // (70 - 10) / 40 * 100
        assert_relative_eq!(result.weekly.strength, 150.0);
    }

    #[test]
    fn equal_weekday_means_have_zero_strength() {
        let result = analyze_series(&weekly_series(3, [5.0; 7])).unwrap();
        assert_eq!(result.weekly.strength, 0.0);
        assert_eq!(result.weekly.peak, 0);
        assert_eq!(result.weekly.low, 0);
    }

    #[test]
    fn ties_resolve_to_lowest_index() {
        let profile = [1.0, 9.0, 9.0, 1.0, 5.0, 5.0, 5.0];
        let result = analyze_series(&weekly_series(1, profile)).unwrap();
        assert_eq!(result.weekly.peak, 1);
        assert_eq!(result.weekly.low, 0);
    }

    #[test]
    fn zero_mean_of_means_falls_back_to_zero_strength() {
        let profile = [-3.0, 3.0, -3.0, 3.0, 0.0, 0.0, 0.0];
        let result = analyze_series(&weekly_series(2, profile)).unwrap();
        assert_eq!(result.weekly.strength, 0.0);
    }

    #[test]
    fn strength_is_non_negative_for_negative_values() {
        let profile = [-10.0, -20.0, -10.0, -20.0, -10.0, -20.0, -10.0];
        let result = analyze_series(&weekly_series(2, profile)).unwrap();
        assert!(result.weekly.strength > 0.0);
        assert_eq!(result.weekly.peak, 0);
        assert_eq!(result.weekly.low, 1);
    }

    #[test]
    fn monthly_pattern_uses_calendar_months() {
        let dates = vec![
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        ];
        let series = Series::new("v", dates, vec![10.0, 20.0, 40.0, 60.0]).unwrap();
        let result = analyze_series(&series).unwrap();

        assert_eq!(result.monthly.pattern.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_relative_eq!(result.monthly.pattern[&1], 15.0);
        assert_relative_eq!(result.monthly.pattern[&3], 50.0);
        assert_eq!(result.monthly.peak, 3);
        assert_eq!(result.monthly.low, 1);
        // (50 - 15) / 32.5 * 100
        assert_relative_eq!(result.monthly.strength, 107.69);
    }

    #[test]
    fn missing_values_do_not_create_groups() {
        let mut values = vec![f64::NAN; 7];
        values[2] = 4.0;
        let series = Series::daily("v", monday(), values).unwrap();
        let result = analyze_series(&series).unwrap();

        assert_eq!(result.weekly.pattern.len(), 1);
        assert_eq!(result.weekly.peak, 2);
    }

    #[test]
    fn all_missing_is_insufficient() {
        let series = Series::daily("v", monday(), vec![f64::NAN; 3]).unwrap();
        assert!(matches!(
            analyze_series(&series),
            Err(AnalyticsError::InsufficientData { .. })
        ));
    }

    #[test]
    fn analyze_reads_table_column() {
        let dates: Vec<NaiveDate> = monday().iter_days().take(14).collect();
        let values: Vec<f64> = (0..14).map(|i| if i % 7 == 5 { 30.0 } else { 10.0 }).collect();
        let table = Table::builder()
            .dates(dates)
            .numeric("visits", values)
            .build()
            .unwrap();

        let result = analyze(&table, "visits").unwrap();
        assert_eq!(result.weekly.peak, 5);
        assert!(analyze(&table, "missing").is_err());
    }

    #[test]
    fn seasonal_component_centres_weekday_means() {
        let dates: Vec<NaiveDate> = monday().iter_days().take(7).collect();
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, f64::NAN];
        let table = Table::builder()
            .dates(dates)
            .numeric("v", values)
            .build()
            .unwrap();

        let component = seasonal_component(&table, "v").unwrap();
        // overall mean of observed values is 3.5
        assert_relative_eq!(component[0], -2.5);
        assert_relative_eq!(component[5], 2.5);
        assert!(component[6].is_nan());
    }
}
