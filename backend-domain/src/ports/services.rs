use async_trait::async_trait;

use crate::entities::{Anomaly, Assessment, TransactionDelta, TransactionFeatures};

/// Risk scoring seam. `assess` never surfaces dependency failures; a
/// broken scorer degrades to the local rule evaluator.
#[async_trait]
pub trait RiskScorer: Send + Sync {
    async fn assess(&self, features: &TransactionFeatures) -> Assessment;
    /// Reachability probe for readiness reporting.
    async fn check_scorer(&self) -> anyhow::Result<()>;
}

/// Real-time event fan-out. Delivery is at-most-once and best-effort; a
/// publish must never fail the mutation that triggered it.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish_new_anomaly(&self, anomaly: &Anomaly);
    async fn publish_anomaly_updated(&self, anomaly: &Anomaly);
    async fn publish_anomaly_deleted(&self, anomaly_id: &str);
    async fn publish_transaction_updated(&self, delta: &TransactionDelta);
}
