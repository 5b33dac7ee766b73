//! # trendlens
//!
//! Time-series analytics over small tabular datasets.
//!
//! Takes a table with a date column and one or more numeric columns and
//! produces pattern-repetition forecasts with uncertainty bands, trend
//! direction, weekly and monthly seasonality, z-score anomalies and a
//! cross-column comparison with plain-language insights.
//!
//! ```
//! use trendlens::prelude::*;
//!
//! let raw = RawTable::from_rows(
//!     &["date", "sales"],
//!     &[&["2024-01-01", "10"], &["2024-01-02", "12"], &["2024-01-03", "11"]],
//! )
//! .unwrap();
//! let table = shape_validated(&raw).unwrap();
//! let forecast = forecast(&table.series("sales").unwrap(), 2).unwrap();
//! assert_eq!(forecast.horizon(), 2);
//! ```

#![allow(clippy::needless_range_loop)]

pub mod cache;
pub mod comparison;
pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod export;
pub mod models;
pub mod persistence;
pub mod sample;
pub mod utils;

pub use error::{AnalyticsError, Result};

pub mod prelude {
    pub use crate::comparison::{compare, Comparison, Insight};
    pub use crate::config::AnalyticsConfig;
    pub use crate::core::{
        numeric_columns, shape, shape_validated, validate, ForecastResult, ForecastRow, RawTable,
        Series, Table,
    };
    pub use crate::detection::{analyze, summarize, AnomalyResult, SeasonalityResult};
    pub use crate::error::{AnalyticsError, Result};
    pub use crate::models::{forecast, trend_direction, Forecaster, PatternRepetition};
}
