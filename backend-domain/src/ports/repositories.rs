use async_trait::async_trait;

use crate::entities::{
    Anomaly,
    AnomalyComment,
    AnomalyFilter,
    AnomalyUpdate,
    PagedResult,
    TransactionPatch,
    TransactionRecord,
};

/// Anomaly case store. Every operation is a single atomic row operation;
/// concurrent updates to the same id serialize at the store.
#[async_trait]
pub trait AnomalyStore: Send + Sync {
    async fn create(&self, anomaly: &Anomaly) -> anyhow::Result<Anomaly>;
    async fn update(&self, id: &str, update: &AnomalyUpdate) -> anyhow::Result<Option<Anomaly>>;
    async fn add_comment(
        &self,
        id: &str,
        comment: &AnomalyComment,
    ) -> anyhow::Result<Option<Anomaly>>;
    /// Returns the record as it existed before deletion.
    async fn delete(&self, id: &str) -> anyhow::Result<Option<Anomaly>>;
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<Anomaly>>;
    async fn find_by_transaction_id(&self, transaction_id: &str)
        -> anyhow::Result<Vec<Anomaly>>;
    async fn list(&self, filter: &AnomalyFilter) -> anyhow::Result<PagedResult<Anomaly>>;
    /// Store liveness probe for readiness reporting.
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn find_by_id(
        &self,
        transaction_id: &str,
    ) -> anyhow::Result<Option<TransactionRecord>>;
    async fn update(&self, transaction_id: &str, patch: &TransactionPatch)
        -> anyhow::Result<()>;
}
