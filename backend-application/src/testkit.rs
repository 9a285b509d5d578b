// In-memory ports for orchestration tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::bail;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use backend_domain::ports::{AnomalyStore, EventPublisher, RiskScorer, TransactionStore};
use backend_domain::{
    Anomaly,
    AnomalyComment,
    AnomalyFilter,
    AnomalyStatus,
    AnomalyUpdate,
    Assessment,
    PagedResult,
    RuntimeConfig,
    Severity,
    TransactionDelta,
    TransactionFeatures,
    TransactionPatch,
    TransactionRecord,
    TriggeredBy,
};

use crate::{AppState, Metrics};

#[derive(Default)]
pub struct MemoryAnomalyStore {
    rows: Mutex<Vec<Anomaly>>,
    creates: AtomicU64,
    fail_creates: AtomicBool,
}

impl MemoryAnomalyStore {
    pub fn create_calls(&self) -> u64 {
        self.creates.load(Ordering::Relaxed)
    }

    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl AnomalyStore for MemoryAnomalyStore {
    async fn create(&self, anomaly: &Anomaly) -> anyhow::Result<Anomaly> {
        if self.fail_creates.load(Ordering::Relaxed) {
            bail!("anomaly store offline");
        }
        self.creates.fetch_add(1, Ordering::Relaxed);
        self.rows.lock().unwrap().push(anomaly.clone());
        Ok(anomaly.clone())
    }

    async fn update(&self, id: &str, update: &AnomalyUpdate) -> anyhow::Result<Option<Anomaly>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if let Some(status) = update.status {
            row.status = status;
        }
        if let Some(severity) = update.severity {
            row.severity = severity;
        }
        if let Some(risk_score) = update.risk_score {
            row.risk_score = risk_score;
        }
        if let Some(description) = &update.description {
            row.description = description.clone();
        }
        if let Some(resolved_by) = &update.resolved_by {
            row.resolved_by = resolved_by.clone();
        }
        if let Some(resolved_at) = &update.resolved_at {
            row.resolved_at = *resolved_at;
        }
        if let Some(notes) = &update.resolution_notes {
            row.resolution_notes = notes.clone();
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn add_comment(
        &self,
        id: &str,
        comment: &AnomalyComment,
    ) -> anyhow::Result<Option<Anomaly>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(row) = rows.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        row.comments.push(comment.clone());
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: &str) -> anyhow::Result<Option<Anomaly>> {
        let mut rows = self.rows.lock().unwrap();
        let Some(index) = rows.iter().position(|a| a.id == id) else {
            return Ok(None);
        };
        Ok(Some(rows.remove(index)))
    }

    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Anomaly>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> anyhow::Result<Vec<Anomaly>> {
        let mut matches: Vec<Anomaly> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.transaction_id == transaction_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(matches)
    }

    async fn list(&self, filter: &AnomalyFilter) -> anyhow::Result<PagedResult<Anomaly>> {
        let mut matches: Vec<Anomaly> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|a| {
                filter.status.map_or(true, |status| a.status == status)
                    && filter.min_risk_score.map_or(true, |min| a.risk_score >= min)
                    && filter.max_risk_score.map_or(true, |max| a.risk_score <= max)
                    && filter.start_date.map_or(true, |start| a.timestamp >= start)
                    && filter.end_date.map_or(true, |end| a.timestamp <= end)
                    && filter
                        .algorithm
                        .as_deref()
                        .map_or(true, |alg| a.triggered_by.algorithm == alg)
                    && filter.search.as_deref().map_or(true, |needle| {
                        let needle = needle.to_lowercase();
                        a.description.to_lowercase().contains(&needle)
                            || a.transaction_id.to_lowercase().contains(&needle)
                    })
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let total_count = matches.len() as u64;
        let offset = filter.offset.unwrap_or(0);
        let rows = match filter.limit {
            Some(limit) => matches.into_iter().skip(offset).take(limit).collect(),
            None => matches.into_iter().skip(offset).collect(),
        };
        Ok(PagedResult { rows, total_count })
    }

    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTransactionStore {
    rows: Mutex<HashMap<String, TransactionRecord>>,
    patches: Mutex<Vec<(String, TransactionPatch)>>,
    fail_updates: AtomicBool,
}

impl MemoryTransactionStore {
    pub fn seed(&self, record: TransactionRecord) {
        self.rows
            .lock()
            .unwrap()
            .insert(record.transaction_id.clone(), record);
    }

    pub fn get(&self, transaction_id: &str) -> Option<TransactionRecord> {
        self.rows.lock().unwrap().get(transaction_id).cloned()
    }

    pub fn patches(&self) -> Vec<(String, TransactionPatch)> {
        self.patches.lock().unwrap().clone()
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::Relaxed);
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn find_by_id(
        &self,
        transaction_id: &str,
    ) -> anyhow::Result<Option<TransactionRecord>> {
        Ok(self.rows.lock().unwrap().get(transaction_id).cloned())
    }

    async fn update(
        &self,
        transaction_id: &str,
        patch: &TransactionPatch,
    ) -> anyhow::Result<()> {
        if self.fail_updates.load(Ordering::Relaxed) {
            bail!("transaction store offline");
        }
        self.patches
            .lock()
            .unwrap()
            .push((transaction_id.to_string(), patch.clone()));
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .entry(transaction_id.to_string())
            .or_insert_with(|| TransactionRecord {
                transaction_id: transaction_id.to_string(),
                user_id: None,
                amount: 0.0,
                timestamp: Utc::now(),
                is_fraud: false,
                risk_score: 0.0,
            });
        if let Some(is_fraud) = patch.is_fraud {
            row.is_fraud = is_fraud;
        }
        if let Some(risk_score) = patch.risk_score {
            row.risk_score = risk_score;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<String>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish_new_anomaly(&self, anomaly: &Anomaly) {
        self.events
            .lock()
            .unwrap()
            .push(format!("newAnomaly:{}", anomaly.id));
    }

    async fn publish_anomaly_updated(&self, anomaly: &Anomaly) {
        self.events
            .lock()
            .unwrap()
            .push(format!("anomalyUpdated:{}", anomaly.id));
    }

    async fn publish_anomaly_deleted(&self, anomaly_id: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("anomalyDeleted:{}", anomaly_id));
    }

    async fn publish_transaction_updated(&self, delta: &TransactionDelta) {
        self.events
            .lock()
            .unwrap()
            .push(format!("transactionUpdated:{}", delta.transaction_id));
    }
}

pub struct StubScorer {
    response: Mutex<Assessment>,
}

impl Default for StubScorer {
    fn default() -> Self {
        Self {
            response: Mutex::new(assessment(0.1, false)),
        }
    }
}

impl StubScorer {
    pub fn set_response(&self, response: Assessment) {
        *self.response.lock().unwrap() = response;
    }
}

#[async_trait]
impl RiskScorer for StubScorer {
    async fn assess(&self, _features: &TransactionFeatures) -> Assessment {
        self.response.lock().unwrap().clone()
    }

    async fn check_scorer(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct TestHarness {
    pub anomaly_store: Arc<MemoryAnomalyStore>,
    pub transaction_store: Arc<MemoryTransactionStore>,
    pub publisher: Arc<RecordingPublisher>,
    pub scorer: Arc<StubScorer>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            anomaly_store: Arc::new(MemoryAnomalyStore::default()),
            transaction_store: Arc::new(MemoryTransactionStore::default()),
            publisher: Arc::new(RecordingPublisher::default()),
            scorer: Arc::new(StubScorer::default()),
        }
    }
}

pub fn state_with(harness: &TestHarness) -> AppState {
    AppState {
        config: RuntimeConfig::default(),
        anomaly_store: harness.anomaly_store.clone(),
        transaction_store: harness.transaction_store.clone(),
        scorer: harness.scorer.clone(),
        publisher: harness.publisher.clone(),
        metrics: Arc::new(Metrics::default()),
    }
}

pub fn features(transaction_id: &str) -> TransactionFeatures {
    TransactionFeatures {
        transaction_id: transaction_id.to_string(),
        user_id: Some("user-1".to_string()),
        amount: 150_000.0,
        timestamp: Some(Utc::now()),
        ..TransactionFeatures::default()
    }
}

pub fn assessment(risk_score: f64, is_anomaly: bool) -> Assessment {
    Assessment {
        is_anomaly,
        risk_score,
        model_name: None,
        model_version: "2.1".to_string(),
        model_description: None,
        confidence: None,
        risk_factors: Vec::new(),
        timestamp: Utc::now(),
    }
}

pub fn sample_anomaly(transaction_id: &str) -> Anomaly {
    let now = Utc::now();
    Anomaly {
        id: Uuid::new_v4().to_string(),
        transaction_id: transaction_id.to_string(),
        user_id: None,
        rule_name: "ML_Detection".to_string(),
        description: "Anomaly detected with risk score 0.70 using LocalOutlierFactor.".to_string(),
        severity: Severity::High,
        status: AnomalyStatus::Open,
        risk_score: 0.7,
        triggered_by: TriggeredBy {
            kind: "ML Model".to_string(),
            algorithm: "LocalOutlierFactor".to_string(),
            version: "2.1".to_string(),
            description: "Local Outlier Factor - Detects anomalies based on local density deviation"
                .to_string(),
            confidence: 0.7,
            risk_factors: Vec::new(),
            selection_reason: "Selected based on risk score 0.7 and transaction amount 150000"
                .to_string(),
        },
        transaction_data: serde_json::Value::Null,
        comments: Vec::new(),
        resolved_by: None,
        resolved_at: None,
        resolution_notes: None,
        timestamp: now,
        created_at: now,
        updated_at: now,
    }
}
