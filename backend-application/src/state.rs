use std::sync::Arc;

use backend_domain::ports::{AnomalyStore, EventPublisher, RiskScorer, TransactionStore};
use backend_domain::RuntimeConfig;

use crate::Metrics;

/// All collaborators are injected here; components never reach across
/// layers for each other. The orchestration commands own the sequencing
/// between scorer, stores and publisher.
#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub anomaly_store: Arc<dyn AnomalyStore>,
    pub transaction_store: Arc<dyn TransactionStore>,
    pub scorer: Arc<dyn RiskScorer>,
    pub publisher: Arc<dyn EventPublisher>,
    pub metrics: Arc<Metrics>,
}
