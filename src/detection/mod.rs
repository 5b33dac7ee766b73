//! Detection utilities for time series analysis.
//!
//! This module provides tools for detecting:
//! - Weekly and monthly calendar patterns
//! - Z-score anomalies

mod anomaly;
mod seasonality;

pub use anomaly::{detect, summarize, z_scores, AnomalyResult, AnomalyRow, AnomalySummary};
pub use seasonality::{
    analyze, analyze_series, seasonal_component, weekday_index, PeriodPattern, SeasonalityResult,
};
