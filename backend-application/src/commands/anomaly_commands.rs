// Anomaly lifecycle operations
// Every mutation follows the same sequence: persist, synchronize the
// transaction mirror, publish. Persistence failures propagate to the
// caller; sync and publish are best-effort.

use chrono::Utc;
use uuid::Uuid;

use backend_domain::services::attribution;
use backend_domain::{
    Anomaly,
    AnomalyComment,
    AnomalyPatch,
    AnomalyStatus,
    AnomalyUpdate,
    Assessment,
    NewComment,
    Severity,
    TransactionFeatures,
    TriggeredBy,
};

use crate::{sync, AppError, AppState};

const MANUAL_RISK_SCORE: f64 = 0.5;

fn validate_features(features: &TransactionFeatures) -> Result<(), AppError> {
    if features.transaction_id.trim().is_empty() || features.timestamp.is_none() {
        return Err(AppError::Validation(
            "transaction_id and timestamp are required".to_string(),
        ));
    }
    Ok(())
}

/// Opens an anomaly case from a risk assessment. Returns None without
/// touching the store when the assessment judged the transaction normal.
pub async fn create_from_assessment(
    state: &AppState,
    features: &TransactionFeatures,
    assessment: &Assessment,
) -> Result<Option<Anomaly>, AppError> {
    validate_features(features)?;
    if !assessment.is_anomaly {
        return Ok(None);
    }

    let triggered_by = attribution::attribute(assessment, features, &state.config.thresholds);
    let description = format!(
        "Anomaly detected with risk score {:.2} using {}.",
        assessment.risk_score, triggered_by.algorithm
    );
    let now = Utc::now();
    let anomaly = Anomaly {
        id: Uuid::new_v4().to_string(),
        transaction_id: features.transaction_id.clone(),
        user_id: features.user_id.clone(),
        rule_name: "ML_Detection".to_string(),
        description,
        severity: Severity::from_risk_score(assessment.risk_score),
        status: AnomalyStatus::Open,
        risk_score: assessment.risk_score,
        triggered_by,
        transaction_data: serde_json::to_value(features).unwrap_or_default(),
        comments: Vec::new(),
        resolved_by: None,
        resolved_at: None,
        resolution_notes: None,
        timestamp: assessment.timestamp,
        created_at: now,
        updated_at: now,
    };

    let created = state
        .anomaly_store
        .create(&anomaly)
        .await
        .map_err(AppError::Internal)?;
    state.metrics.record_anomaly_created();

    if let Some(delta) = sync::after_create(state, &created).await {
        state.publisher.publish_transaction_updated(&delta).await;
    }
    state.publisher.publish_new_anomaly(&created).await;

    Ok(Some(created))
}

/// Human-initiated flag with no assessment backing it: fixed medium risk.
pub async fn create_manual(
    state: &AppState,
    features: &TransactionFeatures,
) -> Result<Anomaly, AppError> {
    validate_features(features)?;

    let now = Utc::now();
    let anomaly = Anomaly {
        id: Uuid::new_v4().to_string(),
        transaction_id: features.transaction_id.clone(),
        user_id: features.user_id.clone(),
        rule_name: "Manual_Detection".to_string(),
        description: format!(
            "Manual anomaly creation for transaction {}.",
            features.transaction_id
        ),
        severity: Severity::Medium,
        status: AnomalyStatus::Open,
        risk_score: MANUAL_RISK_SCORE,
        triggered_by: TriggeredBy {
            kind: "Manual Review".to_string(),
            algorithm: "ManualReview".to_string(),
            version: "1.0".to_string(),
            description: "Manually flagged by an operator".to_string(),
            confidence: MANUAL_RISK_SCORE,
            risk_factors: Vec::new(),
            selection_reason: format!(
                "Manual flag for transaction {}",
                features.transaction_id
            ),
        },
        transaction_data: serde_json::to_value(features).unwrap_or_default(),
        comments: Vec::new(),
        resolved_by: None,
        resolved_at: None,
        resolution_notes: None,
        timestamp: features.timestamp.unwrap_or(now),
        created_at: now,
        updated_at: now,
    };

    let created = state
        .anomaly_store
        .create(&anomaly)
        .await
        .map_err(AppError::Internal)?;
    state.metrics.record_anomaly_created();

    if let Some(delta) = sync::after_create(state, &created).await {
        state.publisher.publish_transaction_updated(&delta).await;
    }
    state.publisher.publish_new_anomaly(&created).await;

    Ok(created)
}

/// Applies a partial update. Status transitions drive the resolution
/// fields: resolving statuses stamp resolved_by/resolved_at, anything else
/// clears all three. A supplied risk_score always wins over a supplied
/// severity.
pub async fn update_anomaly(
    state: &AppState,
    anomaly_id: &str,
    patch: AnomalyPatch,
    actor_id: Option<&str>,
) -> Result<Anomaly, AppError> {
    let mut update = AnomalyUpdate {
        status: patch.status,
        severity: patch.severity,
        risk_score: patch.risk_score,
        description: patch.description.clone(),
        ..AnomalyUpdate::default()
    };

    if let Some(risk_score) = patch.risk_score {
        update.severity = Some(Severity::from_risk_score(risk_score));
    }

    match patch.status {
        Some(status) if status.requires_resolution() => {
            update.resolved_by = Some(actor_id.map(str::to_string));
            update.resolved_at = Some(Some(Utc::now()));
            if let Some(notes) = patch.resolution_notes.clone() {
                update.resolution_notes = Some(Some(notes));
            }
        }
        Some(_) => {
            update.resolved_by = Some(None);
            update.resolved_at = Some(None);
            update.resolution_notes = Some(None);
        }
        None => {
            if let Some(notes) = patch.resolution_notes.clone() {
                update.resolution_notes = Some(Some(notes));
            }
        }
    }

    let updated = state
        .anomaly_store
        .update(anomaly_id, &update)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound)?;
    state.metrics.record_anomaly_updated();

    if let Some(delta) = sync::after_update(state, &updated, &patch).await {
        state.publisher.publish_transaction_updated(&delta).await;
    }
    state.publisher.publish_anomaly_updated(&updated).await;

    Ok(updated)
}

/// Hard delete. The pre-delete record drives the mirror reconciliation.
pub async fn delete_anomaly(state: &AppState, anomaly_id: &str) -> Result<Anomaly, AppError> {
    let deleted = state
        .anomaly_store
        .delete(anomaly_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound)?;
    state.metrics.record_anomaly_deleted();

    if let Some(delta) = sync::after_delete(state, &deleted).await {
        state.publisher.publish_transaction_updated(&delta).await;
    }
    state.publisher.publish_anomaly_deleted(&deleted.id).await;

    Ok(deleted)
}

/// Appends a comment. Comments never touch the transaction mirror.
pub async fn add_comment(
    state: &AppState,
    anomaly_id: &str,
    comment: NewComment,
    author: &str,
    author_id: Option<&str>,
) -> Result<Anomaly, AppError> {
    let text = comment.text.trim().to_string();
    if text.is_empty() {
        return Err(AppError::BadRequest("comment text must not be empty".to_string()));
    }

    let record = AnomalyComment {
        id: Uuid::new_v4().to_string(),
        author: author.to_string(),
        author_id: author_id.map(str::to_string),
        timestamp: Utc::now(),
        text,
    };

    let updated = state
        .anomaly_store
        .add_comment(anomaly_id, &record)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound)?;
    state.metrics.record_anomaly_updated();

    state.publisher.publish_anomaly_updated(&updated).await;
    Ok(updated)
}
