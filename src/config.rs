//! Engine configuration.
//!
//! Parameters are passed explicitly into every call; nothing here is global.

use crate::error::{AnalyticsError, Result};
use serde::Deserialize;

/// Default parameters for a comparison run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Number of days to forecast.
    pub forecast_horizon: usize,
    /// Z-score above which a point is an anomaly.
    pub anomaly_threshold: f64,
    /// Weekly strength (percent) above which an insight calls out the pattern.
    pub strong_weekly_strength: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            forecast_horizon: 30,
            anomaly_threshold: 2.0,
            strong_weekly_strength: 10.0,
        }
    }
}

impl AnalyticsConfig {
    /// Set forecast horizon in days.
    pub fn with_forecast_horizon(mut self, days: usize) -> Self {
        self.forecast_horizon = days;
        self
    }

    /// Set anomaly z-score threshold.
    pub fn with_anomaly_threshold(mut self, threshold: f64) -> Self {
        self.anomaly_threshold = threshold;
        self
    }

    /// Set the weekly strength that counts as a strong pattern.
    pub fn with_strong_weekly_strength(mut self, strength: f64) -> Self {
        self.strong_weekly_strength = strength;
        self
    }

    /// Parse from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the analyzers cannot use.
    pub fn validate(&self) -> Result<()> {
        if self.forecast_horizon == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "forecast_horizon must be positive".to_string(),
            ));
        }
        if !self.anomaly_threshold.is_finite() || self.anomaly_threshold <= 0.0 {
            return Err(AnalyticsError::InvalidParameter(
                "anomaly_threshold must be a positive number".to_string(),
            ));
        }
        if !self.strong_weekly_strength.is_finite() {
            return Err(AnalyticsError::InvalidParameter(
                "strong_weekly_strength must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
