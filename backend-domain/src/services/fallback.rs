// Local rule-based assessment
// Deterministic scoring used whenever the remote scorer is unreachable,
// slow, or returns garbage.

use chrono::{Timelike, Utc};

use crate::entities::{Assessment, DetectionThresholds, TransactionFeatures, FALLBACK_MODEL_VERSION};

const BASE_RISK: f64 = 0.1;
const RISK_CAP: f64 = 0.95;
const ANOMALY_CUTOFF: f64 = 0.5;

/// Weighted additive scoring over transaction features. Identical features
/// always produce an identical score.
pub fn fallback_assessment(
    features: &TransactionFeatures,
    thresholds: &DetectionThresholds,
) -> Assessment {
    let mut risk_score = BASE_RISK;
    let mut risk_factors = Vec::new();
    let amount = features.amount;

    if amount > thresholds.high_value_amount {
        risk_score += 0.3;
        risk_factors.push("High transaction amount".to_string());
    }

    let history = features.user_total_transactions.unwrap_or(0);
    if history < thresholds.new_user_max_history && amount > thresholds.new_user_amount {
        risk_score += 0.2;
        risk_factors.push("New user with high amount".to_string());
    }

    if history > 0 {
        let average = features.user_total_amount_spent.unwrap_or(0.0) / history as f64;
        if amount > average * 3.0 {
            risk_score += 0.2;
            risk_factors.push("Amount significantly higher than user average".to_string());
        }
    }

    if let Some(timestamp) = features.timestamp {
        let hour = timestamp.hour();
        if !(6..=22).contains(&hour) {
            risk_score += 0.1;
            risk_factors.push("Transaction outside business hours".to_string());
        }
    }

    if features.is_new_location {
        risk_score += 0.15;
        risk_factors.push("Transaction from new location".to_string());
    }

    if features.is_new_device {
        risk_score += 0.1;
        risk_factors.push("Transaction from new device".to_string());
    }

    risk_score = risk_score.min(RISK_CAP);

    Assessment {
        is_anomaly: risk_score > ANOMALY_CUTOFF,
        risk_score,
        model_name: None,
        model_version: FALLBACK_MODEL_VERSION.to_string(),
        model_description: None,
        confidence: None,
        risk_factors,
        timestamp: features.timestamp.unwrap_or_else(Utc::now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn night_transaction(amount: f64) -> TransactionFeatures {
        TransactionFeatures {
            transaction_id: "T1".to_string(),
            amount,
            timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 1, 2, 0, 0).unwrap()),
            ..TransactionFeatures::default()
        }
    }

    #[test]
    fn identical_features_score_identically() {
        let mut features = night_transaction(150_000.0);
        features.is_new_device = true;
        let first = fallback_assessment(&features, &DetectionThresholds::default());
        let second = fallback_assessment(&features, &DetectionThresholds::default());
        assert_eq!(first.risk_score, second.risk_score);
        assert_eq!(first.is_anomaly, second.is_anomaly);
        assert_eq!(first.risk_factors, second.risk_factors);
    }

    #[test]
    fn established_user_high_amount_at_night_stays_below_cutoff() {
        // base 0.1 + high amount 0.3 + off hours 0.1 = 0.5, not over the line
        let mut features = night_transaction(120_000.0);
        features.user_total_transactions = Some(20);
        features.user_total_amount_spent = Some(1_000_000.0);
        let assessment = fallback_assessment(&features, &DetectionThresholds::default());
        assert!((assessment.risk_score - 0.5).abs() < 1e-9);
        assert!(!assessment.is_anomaly);
    }

    #[test]
    fn unseen_user_high_amount_at_night_is_anomalous() {
        // base 0.1 + high amount 0.3 + new user 0.2 + off hours 0.1 = 0.7
        let features = night_transaction(150_000.0);
        let assessment = fallback_assessment(&features, &DetectionThresholds::default());
        assert!((assessment.risk_score - 0.7).abs() < 1e-9);
        assert!(assessment.is_anomaly);
        assert_eq!(assessment.model_version, FALLBACK_MODEL_VERSION);
        assert!(assessment.is_fallback());
    }

    #[test]
    fn score_is_capped() {
        let features = TransactionFeatures {
            transaction_id: "T1".to_string(),
            amount: 500_000.0,
            timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap()),
            user_total_transactions: Some(2),
            user_total_amount_spent: Some(100.0),
            is_new_location: true,
            is_new_device: true,
            ..TransactionFeatures::default()
        };
        let assessment = fallback_assessment(&features, &DetectionThresholds::default());
        assert!((assessment.risk_score - 0.95).abs() < 1e-9);
        assert!(assessment.is_anomaly);
    }

    #[test]
    fn daytime_small_amount_is_baseline_risk() {
        let features = TransactionFeatures {
            transaction_id: "T1".to_string(),
            amount: 500.0,
            timestamp: Some(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
            user_total_transactions: Some(50),
            user_total_amount_spent: Some(100_000.0),
            ..TransactionFeatures::default()
        };
        let assessment = fallback_assessment(&features, &DetectionThresholds::default());
        assert!((assessment.risk_score - BASE_RISK).abs() < 1e-9);
        assert!(!assessment.is_anomaly);
        assert!(assessment.risk_factors.is_empty());
    }
}
