//! Forecaster trait defining the common interface for forecasting models.

use crate::core::{ForecastResult, Series};
use crate::error::Result;

/// Common interface for forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the series. Missing values are ignored.
    fn fit(&mut self, series: &Series) -> Result<()>;

    /// Generate one row per day for the next `horizon` days.
    fn predict(&self, horizon: usize) -> Result<ForecastResult>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool;
}

/// Type alias for boxed forecaster trait objects.
///
/// # Example
///
/// ```
/// use trendlens::models::{BoxedForecaster, Forecaster, PatternRepetition};
///
/// let model: BoxedForecaster = Box::new(PatternRepetition::new());
/// assert_eq!(model.name(), "PatternRepetition");
/// ```
pub type BoxedForecaster = Box<dyn Forecaster + Send + Sync>;
