// Algorithm attribution
// Pure selection of the detection-algorithm label recorded on an anomaly,
// driven by risk score and transaction amount.

use crate::entities::{Assessment, DetectionThresholds, TransactionFeatures, TriggeredBy};
use crate::value_objects::DetectionAlgorithm;

/// Priority cascade, first match wins. A recognized model-name hint from
/// the scorer overrides the label but not the bookkeeping.
pub fn attribute(
    assessment: &Assessment,
    features: &TransactionFeatures,
    thresholds: &DetectionThresholds,
) -> TriggeredBy {
    let risk_score = assessment.risk_score;
    let amount = features.amount;

    let mut algorithm = if risk_score >= thresholds.deep_score {
        DetectionAlgorithm::Autoencoder
    } else if risk_score >= thresholds.precision_score && amount >= thresholds.precision_amount {
        DetectionAlgorithm::OneClassSVM
    } else if risk_score >= thresholds.general_score {
        DetectionAlgorithm::LocalOutlierFactor
    } else if amount >= thresholds.ensemble_amount {
        DetectionAlgorithm::EnsembleDetection
    } else if assessment.is_fallback() {
        DetectionAlgorithm::RuleBasedDetection
    } else {
        DetectionAlgorithm::LocalOutlierFactor
    };

    if let Some(hint) = assessment.model_name.as_deref() {
        if let Some(mapped) = DetectionAlgorithm::from_model_hint(hint) {
            algorithm = mapped;
        }
    }

    TriggeredBy {
        kind: if assessment.is_fallback() {
            "Rule Engine".to_string()
        } else {
            "ML Model".to_string()
        },
        algorithm: algorithm.name().to_string(),
        version: assessment.model_version.clone(),
        description: assessment
            .model_description
            .clone()
            .unwrap_or_else(|| algorithm.description().to_string()),
        confidence: assessment
            .confidence
            .unwrap_or_else(|| risk_score.abs().min(1.0)),
        risk_factors: assessment.risk_factors.clone(),
        selection_reason: format!(
            "Selected based on risk score {} and transaction amount {}",
            risk_score, amount
        ),
    }
}
