// Transaction risk check
// Obtains an assessment (remote scorer or local fallback) and optionally
// opens an anomaly case from it. A failed case creation never fails the
// assessment itself.

use serde::Serialize;
use tracing::warn;

use backend_domain::{Anomaly, DetectionAlgorithm, TransactionFeatures};

use crate::commands::anomaly_commands;
use crate::{AppError, AppState};

#[derive(Debug, Clone, Serialize)]
pub struct CheckOutcome {
    pub is_anomaly: bool,
    pub risk_score: f64,
    pub action: String,
    pub model_name: String,
    pub model_version: String,
    pub model_description: String,
    pub reason: String,
    pub risk_factors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_anomaly: Option<Anomaly>,
}

pub async fn check_transaction(
    state: &AppState,
    features: TransactionFeatures,
    create_anomaly: bool,
) -> Result<CheckOutcome, AppError> {
    let assessment = state.scorer.assess(&features).await;
    state.metrics.record_assessment(assessment.is_fallback());

    let action = if assessment.is_anomaly { "block" } else { "allow" };

    let mut created_anomaly = None;
    if assessment.is_anomaly && create_anomaly {
        match anomaly_commands::create_from_assessment(state, &features, &assessment).await {
            Ok(anomaly) => created_anomaly = anomaly,
            Err(err) => {
                warn!(
                    transaction_id = %features.transaction_id,
                    "anomaly creation failed during transaction check: {}",
                    err
                );
            }
        }
    }

    let probability = assessment.risk_score.clamp(0.0, 1.0);
    let reason = if assessment.is_anomaly {
        let source = if assessment.is_fallback() {
            "Rule-based"
        } else {
            "ML model"
        };
        format!(
            "{} detected anomaly with probability {:.1}%",
            source,
            probability * 100.0
        )
    } else {
        "Normal transaction".to_string()
    };

    Ok(CheckOutcome {
        is_anomaly: assessment.is_anomaly,
        risk_score: probability,
        action: action.to_string(),
        model_name: assessment
            .model_name
            .clone()
            .unwrap_or_else(|| "isolation_forest".to_string()),
        model_version: assessment.model_version.clone(),
        model_description: assessment
            .model_description
            .clone()
            .unwrap_or_else(|| DetectionAlgorithm::IsolationForest.description().to_string()),
        reason,
        risk_factors: assessment.risk_factors,
        created_anomaly,
    })
}
