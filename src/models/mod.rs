//! Forecasting models and trend summaries.

mod pattern;
mod traits;
mod trend;

pub use pattern::{forecast, PatternRepetition};
pub use traits::{BoxedForecaster, Forecaster};
pub use trend::{trend_direction, Direction, TrendDirection, TREND_WINDOW};
