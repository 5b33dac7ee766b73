//! Cross-column comparison: per-column reports, a correlation matrix and a
//! list of plain-language insights.
//!
//! Nothing here is a new algorithm; every number comes from the column
//! analyzers. Columns are processed in parallel.

use crate::config::AnalyticsConfig;
use crate::core::{ForecastResult, Table};
use crate::detection::{self, AnomalySummary, SeasonalityResult};
use crate::error::{AnalyticsError, Result};
use crate::models::{self, Direction, TrendDirection};
use crate::utils::pearson;
use crate::utils::stats::{mean, std_dev};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;

/// Weekday names indexed like [`detection::weekday_index`].
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Everything computed for one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnReport {
    pub column: String,
    pub mean: f64,
    pub std: f64,
    pub trend: TrendDirection,
    pub forecast: ForecastResult,
    pub seasonality: SeasonalityResult,
    pub anomalies: AnomalySummary,
}

/// Pairwise Pearson correlations. `None` marks an undefined coefficient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Coefficient between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// A single observation about a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    Trend {
        column: String,
        direction: Direction,
        change_pct: f64,
    },
    PeakDay {
        column: String,
        weekday: &'static str,
    },
    LowDay {
        column: String,
        weekday: &'static str,
    },
    Anomalies {
        column: String,
        count: usize,
        percentage: f64,
    },
    StrongWeeklyPattern {
        column: String,
        strength: f64,
    },
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Insight::Trend {
                column,
                direction,
                change_pct,
            } => {
                let article = match direction {
                    Direction::Up => "an upward",
                    Direction::Down => "a downward",
                };
                write!(
                    f,
                    "{} shows {} trend with {}% change",
                    column,
                    article,
                    change_pct.abs()
                )
            }
            Insight::PeakDay { column, weekday } => {
                write!(f, "Highest {} values typically occur on {}", column, weekday)
            }
            Insight::LowDay { column, weekday } => {
                write!(f, "Lowest {} values typically occur on {}", column, weekday)
            }
            Insight::Anomalies {
                column,
                count,
                percentage,
            } => write!(
                f,
                "{} unusual {} data points detected ({}% of data)",
                count, column, percentage
            ),
            Insight::StrongWeeklyPattern { column, strength } => write!(
                f,
                "Strong weekly pattern in {}: {}% variation between days",
                column, strength
            ),
        }
    }
}

/// Result of [`compare`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub columns: Vec<ColumnReport>,
    /// Present only when at least two columns were compared.
    pub correlation: Option<CorrelationMatrix>,
    pub insights: Vec<Insight>,
}

impl Comparison {
    pub fn report(&self, column: &str) -> Option<&ColumnReport> {
        self.columns.iter().find(|r| r.column == column)
    }
}

/// Run every column analyzer over `columns` and assemble the comparison.
pub fn compare<S>(table: &Table, columns: &[S], config: &AnalyticsConfig) -> Result<Comparison>
where
    S: AsRef<str> + Sync,
{
    let reports: Vec<ColumnReport> = columns
        .par_iter()
        .map(|column| column_report(table, column.as_ref(), config))
        .collect::<Result<Vec<_>>>()?;

    let correlation = correlation_matrix(table, columns)?;
    let insights = reports
        .iter()
        .flat_map(|report| insights_for(report, config))
        .collect();

    tracing::debug!(columns = reports.len(), "comparison assembled");

    Ok(Comparison {
        columns: reports,
        correlation,
        insights,
    })
}

/// Analyze a single column.
pub fn column_report(table: &Table, column: &str, config: &AnalyticsConfig) -> Result<ColumnReport> {
    let series = table.series(column)?;
    let observed = series.observed_values();

    Ok(ColumnReport {
        column: column.to_string(),
        mean: mean(&observed),
        std: std_dev(&observed),
        trend: models::trend_direction(&series)?,
        forecast: models::forecast(&series, config.forecast_horizon)?,
        seasonality: detection::analyze_series(&series)?,
        anomalies: detection::summarize(&series, config.anomaly_threshold).summary,
    })
}

/// Pearson correlation for every pair of `columns`, using the rows where
/// both columns have a value.
///
/// Returns `Ok(None)` when fewer than two columns are given.
pub fn correlation_matrix<S>(table: &Table, columns: &[S]) -> Result<Option<CorrelationMatrix>>
where
    S: AsRef<str>,
{
    if columns.len() < 2 {
        return Ok(None);
    }

    let data: Vec<&[f64]> = columns
        .iter()
        .map(|name| {
            let name = name.as_ref();
            table
                .column(name)
                .ok_or_else(|| AnalyticsError::UnknownColumn(name.to_string()))?
                .numeric_values()
                .ok_or_else(|| AnalyticsError::NotNumeric(name.to_string()))
        })
        .collect::<Result<_>>()?;

    let values = data
        .iter()
        .map(|a| data.iter().map(|b| pearson(a, b)).collect())
        .collect();

    Ok(Some(CorrelationMatrix {
        columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        values,
    }))
}

/// Plain-language observations about one column report.
pub fn insights_for(report: &ColumnReport, config: &AnalyticsConfig) -> Vec<Insight> {
    let column = report.column.clone();
    let weekly = &report.seasonality.weekly;

    let mut insights = vec![
        Insight::Trend {
            column: column.clone(),
            direction: report.trend.direction,
            change_pct: report.trend.total_change_pct,
        },
        Insight::PeakDay {
            column: column.clone(),
            weekday: WEEKDAY_NAMES[weekly.peak as usize % 7],
        },
        Insight::LowDay {
            column: column.clone(),
            weekday: WEEKDAY_NAMES[weekly.low as usize % 7],
        },
        Insight::Anomalies {
            column: column.clone(),
            count: report.anomalies.count,
            percentage: report.anomalies.percentage,
        },
    ];

    if weekly.strength > config.strong_weekly_strength {
        insights.push(Insight::StrongWeeklyPattern {
            column,
            strength: weekly.strength,
        });
    }

    insights
}
