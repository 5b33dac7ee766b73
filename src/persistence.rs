//! Record shapes for an optional dataset store, and an in-memory store.
//!
//! The analyzers never touch a store. Callers convert results into these
//! records and hand them to any [`DatasetSink`].

use crate::core::{ForecastResult, Table};
use crate::detection::AnomalyRow;
use crate::error::{AnalyticsError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Metadata describing an uploaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    /// Assigned by the store; `None` until saved.
    pub id: Option<String>,
    pub name: String,
    pub upload_date: DateTime<Utc>,
    pub columns: Vec<String>,
    pub row_count: usize,
}

impl DatasetRecord {
    /// Describe a shaped table under a dataset name.
    pub fn from_table(name: impl Into<String>, table: &Table) -> Self {
        Self {
            id: None,
            name: name.into(),
            upload_date: Utc::now(),
            columns: table.column_names(),
            row_count: table.row_count(),
        }
    }
}

/// One stored forecast row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub dataset_id: String,
    pub created_at: DateTime<Utc>,
    pub date: NaiveDate,
    pub predicted: f64,
    pub best_case: f64,
    pub worst_case: f64,
    pub confidence_lower: f64,
    pub confidence_upper: f64,
}

/// Convert a forecast into records stamped with one creation time.
pub fn prediction_records(dataset_id: &str, forecast: &ForecastResult) -> Vec<PredictionRecord> {
    let created_at = Utc::now();
    forecast
        .rows()
        .iter()
        .map(|row| PredictionRecord {
            dataset_id: dataset_id.to_string(),
            created_at,
            date: row.date,
            predicted: row.predicted,
            best_case: row.best_case,
            worst_case: row.worst_case,
            confidence_lower: row.confidence_lower,
            confidence_upper: row.confidence_upper,
        })
        .collect()
}

/// One stored anomaly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub dataset_id: String,
    pub date: NaiveDate,
    pub value: f64,
    pub z_score: f64,
    pub deviation: f64,
}

/// Convert flagged rows into records.
pub fn anomaly_records(dataset_id: &str, anomalies: &[AnomalyRow]) -> Vec<AnomalyRecord> {
    anomalies
        .iter()
        .map(|a| AnomalyRecord {
            dataset_id: dataset_id.to_string(),
            date: a.date,
            value: a.value,
            z_score: a.z_score,
            deviation: a.deviation_pct,
        })
        .collect()
}

/// A destination for datasets, predictions and anomalies.
pub trait DatasetSink {
    /// Store dataset metadata and return it with its assigned id.
    fn save_dataset(&self, record: DatasetRecord) -> Result<DatasetRecord>;

    /// All datasets, most recent upload first.
    fn list_datasets(&self) -> Result<Vec<DatasetRecord>>;

    /// Remove a dataset together with its predictions and anomalies.
    fn delete_dataset(&self, dataset_id: &str) -> Result<()>;

    fn save_predictions(&self, records: Vec<PredictionRecord>) -> Result<()>;

    fn predictions(&self, dataset_id: &str) -> Result<Vec<PredictionRecord>>;

    fn save_anomalies(&self, records: Vec<AnomalyRecord>) -> Result<()>;

    fn anomalies(&self, dataset_id: &str) -> Result<Vec<AnomalyRecord>>;
}

#[derive(Debug, Default)]
struct StoreState {
    datasets: HashMap<String, DatasetRecord>,
    predictions: Vec<PredictionRecord>,
    anomalies: Vec<AnomalyRecord>,
}

/// Thread-safe store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, StoreState>> {
        self.state
            .read()
            .map_err(|_| AnalyticsError::Store("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, StoreState>> {
        self.state
            .write()
            .map_err(|_| AnalyticsError::Store("lock poisoned".to_string()))
    }

    fn require_dataset(state: &StoreState, dataset_id: &str) -> Result<()> {
        if state.datasets.contains_key(dataset_id) {
            Ok(())
        } else {
            Err(AnalyticsError::NotFound(format!("dataset {}", dataset_id)))
        }
    }
}

impl DatasetSink for MemoryStore {
    fn save_dataset(&self, mut record: DatasetRecord) -> Result<DatasetRecord> {
        let id = record
            .id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        record.id = Some(id.clone());
        self.write()?.datasets.insert(id.clone(), record.clone());
        tracing::debug!(dataset_id = %id, name = %record.name, "dataset saved");
        Ok(record)
    }

    fn list_datasets(&self) -> Result<Vec<DatasetRecord>> {
        let mut datasets: Vec<DatasetRecord> = self.read()?.datasets.values().cloned().collect();
        datasets.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
        Ok(datasets)
    }

    fn delete_dataset(&self, dataset_id: &str) -> Result<()> {
        let mut state = self.write()?;
        if state.datasets.remove(dataset_id).is_none() {
            return Err(AnalyticsError::NotFound(format!("dataset {}", dataset_id)));
        }
        state.predictions.retain(|p| p.dataset_id != dataset_id);
        state.anomalies.retain(|a| a.dataset_id != dataset_id);
        Ok(())
    }

    fn save_predictions(&self, records: Vec<PredictionRecord>) -> Result<()> {
        let mut state = self.write()?;
        for record in &records {
            Self::require_dataset(&state, &record.dataset_id)?;
        }
        state.predictions.extend(records);
        Ok(())
    }

    fn predictions(&self, dataset_id: &str) -> Result<Vec<PredictionRecord>> {
        let state = self.read()?;
        Self::require_dataset(&state, dataset_id)?;
        Ok(state
            .predictions
            .iter()
            .filter(|p| p.dataset_id == dataset_id)
            .cloned()
            .collect())
    }

    fn save_anomalies(&self, records: Vec<AnomalyRecord>) -> Result<()> {
        let mut state = self.write()?;
        for record in &records {
            Self::require_dataset(&state, &record.dataset_id)?;
        }
        state.anomalies.extend(records);
        Ok(())
    }

    fn anomalies(&self, dataset_id: &str) -> Result<Vec<AnomalyRecord>> {
        let state = self.read()?;
        Self::require_dataset(&state, dataset_id)?;
        Ok(state
            .anomalies
            .iter()
            .filter(|a| a.dataset_id == dataset_id)
            .cloned()
            .collect())
    }
}
