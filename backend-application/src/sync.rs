// Transaction mirror synchronization
// Keeps the parent transaction's is_fraud/risk_score consistent with the
// set of anomalies referencing it. The anomaly store is the source of
// truth; the mirror is best-effort and self-heals on the next successful
// sync for the same transaction, so failures here are logged and swallowed
// and never fail the triggering anomaly mutation.

use tracing::warn;

use backend_domain::{Anomaly, AnomalyPatch, AnomalyStatus, TransactionDelta, TransactionPatch};

use crate::AppState;

/// A new anomaly always flags its transaction and mirrors its risk score.
pub async fn after_create(state: &AppState, anomaly: &Anomaly) -> Option<TransactionDelta> {
    let patch = TransactionPatch {
        is_fraud: Some(true),
        risk_score: Some(anomaly.risk_score),
    };
    apply(state, &anomaly.transaction_id, patch).await
}

/// Propagates a risk-score change, and translates resolving status
/// transitions: false_positive unflags the transaction, resolved confirms
/// the flag.
pub async fn after_update(
    state: &AppState,
    anomaly: &Anomaly,
    patch: &AnomalyPatch,
) -> Option<TransactionDelta> {
    let mut tx_patch = TransactionPatch::default();

    if patch.risk_score.is_some() {
        tx_patch.risk_score = Some(anomaly.risk_score);
    }
    match patch.status {
        Some(AnomalyStatus::FalsePositive) => tx_patch.is_fraud = Some(false),
        Some(AnomalyStatus::Resolved) => tx_patch.is_fraud = Some(true),
        _ => {}
    }

    if tx_patch.is_empty() {
        return None;
    }
    apply(state, &anomaly.transaction_id, tx_patch).await
}

/// After a hard delete, the transaction stays flagged only while sibling
/// anomalies remain.
pub async fn after_delete(state: &AppState, deleted: &Anomaly) -> Option<TransactionDelta> {
    let remaining = match state
        .anomaly_store
        .find_by_transaction_id(&deleted.transaction_id)
        .await
    {
        Ok(remaining) => remaining,
        Err(err) => {
            warn!(
                transaction_id = %deleted.transaction_id,
                "failed to query sibling anomalies after delete: {}",
                err
            );
            state.metrics.record_sync_failure();
            return None;
        }
    };

    if !remaining.is_empty() {
        return None;
    }

    let patch = TransactionPatch {
        is_fraud: Some(false),
        risk_score: Some(0.0),
    };
    apply(state, &deleted.transaction_id, patch).await
}

async fn apply(
    state: &AppState,
    transaction_id: &str,
    patch: TransactionPatch,
) -> Option<TransactionDelta> {
    match state.transaction_store.update(transaction_id, &patch).await {
        Ok(()) => Some(TransactionDelta::from_patch(transaction_id, &patch)),
        Err(err) => {
            warn!(
                transaction_id = %transaction_id,
                "transaction mirror sync failed: {}",
                err
            );
            state.metrics.record_sync_failure();
            None
        }
    }
}
