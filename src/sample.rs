//! Synthetic demo dataset.
//!
//! Two years of daily data for three products with a linear trend, weekly
//! and monthly cycles, gaussian noise and ten injected spikes in
//! `Product_A`. The same seed always yields the same table.

use crate::core::Table;
use crate::error::{AnalyticsError, Result};
use crate::utils::round_to;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{seq::index, Rng, SeedableRng};
use statrs::distribution::Normal;
use std::f64::consts::PI;

/// Number of spikes injected into `Product_A`.
pub const SAMPLE_SPIKES: usize = 10;

/// Build the demo table: a `date` column from 2023-01-01 through
/// 2024-12-31 plus `Product_A`, `Product_B` and `Product_C`.
pub fn generate_sample_data(seed: u64) -> Result<Table> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1)
        .ok_or_else(|| AnalyticsError::InvalidParameter("invalid start date".to_string()))?;
    let end = NaiveDate::from_ymd_opt(2024, 12, 31)
        .ok_or_else(|| AnalyticsError::InvalidParameter("invalid end date".to_string()))?;
    let dates: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();
    let n = dates.len();

    let mut rng = StdRng::seed_from_u64(seed);
    let normal =
        Normal::new(0.0, 5.0).map_err(|e| AnalyticsError::InvalidParameter(e.to_string()))?;

    let mut product_a = Vec::with_capacity(n);
    let mut product_b = Vec::with_capacity(n);
    let mut product_c = Vec::with_capacity(n);

    for i in 0..n {
        let t = i as f64;
        let trend = 100.0 + 50.0 * t / (n - 1).max(1) as f64;
        let weekly = 10.0 * (2.0 * PI * t / 7.0).sin();
        let monthly = 15.0 * (2.0 * PI * t / 30.0).sin();
        let noise: f64 = rng.sample(normal);

        product_a.push(trend + weekly + noise + 100.0);
        product_b.push(trend * 0.8 + monthly + noise + 80.0);
        product_c.push(trend * 1.2 + weekly + monthly + noise + 120.0);
    }

    for idx in index::sample(&mut rng, n, SAMPLE_SPIKES.min(n)) {
        product_a[idx] *= 1.5;
    }

    let round = |values: Vec<f64>| -> Vec<f64> {
        values.into_iter().map(|v| round_to(v, 2)).collect()
    };

    tracing::debug!(rows = n, seed, "sample data generated");

    Table::builder()
        .dates(dates)
        .numeric("Product_A", round(product_a))
        .numeric("Product_B", round(product_b))
        .numeric("Product_C", round(product_c))
        .build()
}
