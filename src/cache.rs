//! Memoization of analyzer results keyed by a fingerprint.
//!
//! The engine itself never caches. Callers that serve repeated requests can
//! wrap analyzer calls in a [`ResultCache`]; concurrent requests for the same
//! key block on a single computation.

use crate::core::Table;
use crate::error::Result;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Analyzer parameters that take part in a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Params {
    Forecast { horizon: usize },
    Trend,
    Seasonality,
    /// Threshold stored as raw bits so the key stays hashable.
    Anomalies { threshold_bits: u64 },
}

/// Identifies a cacheable result: column, parameters and data version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    pub column: String,
    pub params: Params,
    pub data_version: u64,
}

impl Fingerprint {
    pub fn new(table: &Table, column: &str, params: Params) -> Self {
        Self {
            column: column.to_string(),
            params,
            data_version: table.fingerprint(),
        }
    }

    pub fn forecast(table: &Table, column: &str, horizon: usize) -> Self {
        Self::new(table, column, Params::Forecast { horizon })
    }

    pub fn trend(table: &Table, column: &str) -> Self {
        Self::new(table, column, Params::Trend)
    }

    pub fn seasonality(table: &Table, column: &str) -> Self {
        Self::new(table, column, Params::Seasonality)
    }

    pub fn anomalies(table: &Table, column: &str, threshold: f64) -> Self {
        Self::new(
            table,
            column,
            Params::Anomalies {
                threshold_bits: threshold.to_bits(),
            },
        )
    }
}

/// Concurrent cache with at most one computation in flight per key.
#[derive(Debug)]
pub struct ResultCache<V> {
    entries: DashMap<Fingerprint, Arc<OnceCell<V>>>,
}

impl<V> Default for ResultCache<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<V: Clone> ResultCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, computing it if absent.
    ///
    /// A failed computation is not cached; the next caller retries.
    pub fn get_or_compute<F>(&self, key: Fingerprint, compute: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        let cell = Arc::clone(
            self.entries
                .entry(key)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .value(),
        );
        cell.get_or_try_init(compute).cloned()
    }

    /// Cached value, if one has been computed.
    pub fn get(&self, key: &Fingerprint) -> Option<V> {
        self.entries.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Drop every entry computed from the given data version.
    pub fn invalidate(&self, data_version: u64) {
        self.entries.retain(|key, _| key.data_version != data_version);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of keys with a computed value.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyticsError;
    use crate::models::forecast;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn table(last: f64) -> Table {
        Table::builder()
            .dates(
                NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .iter_days()
                    .take(4)
                    .collect(),
            )
            .numeric("sales", vec![1.0, 2.0, 3.0, last])
            .build()
            .unwrap()
    }

    #[test]
    fn fingerprint_distinguishes_params_and_data() {
        let t = table(4.0);
        assert_eq!(
            Fingerprint::forecast(&t, "sales", 7),
            Fingerprint::forecast(&t, "sales", 7)
        );
        assert_ne!(
            Fingerprint::forecast(&t, "sales", 7),
            Fingerprint::forecast(&t, "sales", 14)
        );
        assert_ne!(
            Fingerprint::anomalies(&t, "sales", 2.0),
            Fingerprint::anomalies(&t, "sales", 2.5)
        );
        assert_ne!(
            Fingerprint::trend(&t, "sales"),
            Fingerprint::trend(&table(5.0), "sales")
        );
    }

    #[test]
    fn cache_computes_once_per_key() {
        let t = table(4.0);
        let cache = ResultCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let result = cache
                .get_or_compute(Fingerprint::forecast(&t, "sales", 3), || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    forecast(&t.series("sales")?, 3)
                })
                .unwrap();
            assert_eq!(result.horizon(), 3);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&Fingerprint::forecast(&t, "sales", 3)).is_some());
    }

    #[test]
    fn concurrent_requests_share_one_computation() {
        let t = table(4.0);
        let cache: ResultCache<usize> = ResultCache::new();
        let calls = AtomicUsize::new(0);
        let key = Fingerprint::seasonality(&t, "sales");

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    let value = cache
                        .get_or_compute(key.clone(), || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(20));
                            Ok(42)
                        })
                        .unwrap();
                    assert_eq!(value, 42);
                });
            }
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let t = table(4.0);
        let cache: ResultCache<u8> = ResultCache::new();
        let key = Fingerprint::trend(&t, "sales");

        let err = cache
            .get_or_compute(key.clone(), || {
                Err(AnalyticsError::InsufficientData { needed: 1, got: 0 })
            })
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData { .. }));
        assert!(cache.is_empty());

        assert_eq!(cache.get_or_compute(key, || Ok(7)).unwrap(), 7);
    }

    #[test]
    fn invalidate_drops_old_versions() {
        let old = table(4.0);
        let new = table(5.0);
        let cache: ResultCache<u8> = ResultCache::new();

        cache
            .get_or_compute(Fingerprint::trend(&old, "sales"), || Ok(1))
            .unwrap();
        cache
            .get_or_compute(Fingerprint::trend(&new, "sales"), || Ok(2))
            .unwrap();

        cache.invalidate(old.fingerprint());
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&Fingerprint::trend(&old, "sales")).is_none());

        cache.clear();
        assert!(cache.is_empty());
    }
}
