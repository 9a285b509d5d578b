// Real-time fan-out hub
// Two audience scopes plus per-user private channels. Delivery is
// at-most-once: a subscriber that disconnects and returns gets the open
// snapshot from the stream handler plus whatever is published from then on.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{broadcast, RwLock};

use backend_domain::ports::EventPublisher;
use backend_domain::{Anomaly, TransactionDelta};

const CHANNEL_BUFFER: usize = 64;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum StreamEvent {
    #[serde(rename = "newAnomaly")]
    NewAnomaly(Anomaly),
    #[serde(rename = "anomalyUpdated")]
    AnomalyUpdated(Anomaly),
    #[serde(rename = "anomalyDeleted")]
    AnomalyDeleted(String),
    #[serde(rename = "transactionUpdated")]
    TransactionUpdated(TransactionDelta),
    #[serde(rename = "initialAnomalies")]
    InitialAnomalies(Vec<Anomaly>),
}

pub struct StreamHub {
    anomalies: broadcast::Sender<StreamEvent>,
    transactions: broadcast::Sender<StreamEvent>,
    users: RwLock<HashMap<String, broadcast::Sender<StreamEvent>>>,
}

impl Default for StreamHub {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamHub {
    pub fn new() -> Self {
        let (anomalies, _) = broadcast::channel(CHANNEL_BUFFER);
        let (transactions, _) = broadcast::channel(CHANNEL_BUFFER);
        Self {
            anomalies,
            transactions,
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Privileged scope: anomaly lifecycle events.
    pub fn subscribe_anomalies(&self) -> broadcast::Receiver<StreamEvent> {
        self.anomalies.subscribe()
    }

    /// General scope: coarse transaction-level feed, open to every observer.
    pub fn subscribe_transactions(&self) -> broadcast::Receiver<StreamEvent> {
        self.transactions.subscribe()
    }

    pub async fn subscribe_user(&self, user_id: &str) -> broadcast::Receiver<StreamEvent> {
        let mut users = self.users.write().await;
        users
            .entry(user_id.to_string())
            .or_insert_with(|| {
                let (tx, _rx) = broadcast::channel(CHANNEL_BUFFER);
                tx
            })
            .subscribe()
    }

    pub fn publish_anomalies(&self, event: StreamEvent) {
        let _ = self.anomalies.send(event);
    }

    pub fn publish_transactions(&self, event: StreamEvent) {
        let _ = self.transactions.send(event);
    }

    /// Delivers on a private channel if that user is connected; silently
    /// dropped otherwise.
    pub async fn publish_user(&self, user_id: &str, event: StreamEvent) {
        let users = self.users.read().await;
        if let Some(tx) = users.get(user_id) {
            let _ = tx.send(event);
        }
    }
}

/// EventPublisher backed by the hub. Injected into the orchestration layer
/// so tests can swap in a recording stub.
pub struct HubPublisher {
    hub: Arc<StreamHub>,
}

impl HubPublisher {
    pub fn new(hub: Arc<StreamHub>) -> Self {
        Self { hub }
    }
}

#[async_trait]
impl EventPublisher for HubPublisher {
    async fn publish_new_anomaly(&self, anomaly: &Anomaly) {
        self.hub
            .publish_anomalies(StreamEvent::NewAnomaly(anomaly.clone()));
    }

    async fn publish_anomaly_updated(&self, anomaly: &Anomaly) {
        self.hub
            .publish_anomalies(StreamEvent::AnomalyUpdated(anomaly.clone()));
        if let Some(resolver) = anomaly.resolved_by.as_deref() {
            self.hub
                .publish_user(resolver, StreamEvent::AnomalyUpdated(anomaly.clone()))
                .await;
        }
    }

    async fn publish_anomaly_deleted(&self, anomaly_id: &str) {
        self.hub
            .publish_anomalies(StreamEvent::AnomalyDeleted(anomaly_id.to_string()));
    }

    async fn publish_transaction_updated(&self, delta: &TransactionDelta) {
        self.hub
            .publish_transactions(StreamEvent::TransactionUpdated(delta.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::sample_anomaly;
    use tokio::sync::broadcast::error::TryRecvError;

    #[tokio::test]
    async fn anomaly_events_stay_in_the_privileged_scope() {
        let hub = Arc::new(StreamHub::new());
        let publisher = HubPublisher::new(hub.clone());

        let mut privileged = hub.subscribe_anomalies();
        let mut general = hub.subscribe_transactions();

        let anomaly = sample_anomaly("T1");
        publisher.publish_new_anomaly(&anomaly).await;
        publisher.publish_anomaly_deleted(&anomaly.id).await;

        assert!(matches!(privileged.try_recv(), Ok(StreamEvent::NewAnomaly(_))));
        assert!(matches!(
            privileged.try_recv(),
            Ok(StreamEvent::AnomalyDeleted(_))
        ));
        assert!(matches!(general.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn transaction_updates_reach_the_general_scope() {
        let hub = Arc::new(StreamHub::new());
        let publisher = HubPublisher::new(hub.clone());
        let mut general = hub.subscribe_transactions();

        let delta = TransactionDelta {
            transaction_id: "T1".to_string(),
            is_fraud: Some(true),
            risk_score: Some(0.7),
        };
        publisher.publish_transaction_updated(&delta).await;

        match general.try_recv() {
            Ok(StreamEvent::TransactionUpdated(received)) => {
                assert_eq!(received.transaction_id, "T1");
                assert_eq!(received.is_fraud, Some(true));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn resolver_gets_a_private_copy_of_the_update() {
        let hub = Arc::new(StreamHub::new());
        let publisher = HubPublisher::new(hub.clone());

        let mut private = hub.subscribe_user("analyst-7").await;
        let mut other = hub.subscribe_user("analyst-9").await;

        let mut anomaly = sample_anomaly("T1");
        anomaly.resolved_by = Some("analyst-7".to_string());
        publisher.publish_anomaly_updated(&anomaly).await;

        assert!(matches!(private.try_recv(), Ok(StreamEvent::AnomalyUpdated(_))));
        assert!(matches!(other.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn events_serialize_with_stable_names() {
        let json = serde_json::to_string(&StreamEvent::AnomalyDeleted("a-1".to_string()))
            .expect("serialize");
        assert!(json.contains(r#""event":"anomalyDeleted""#));
        assert!(json.contains(r#""data":"a-1""#));
    }
}
