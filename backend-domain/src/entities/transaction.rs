// Transaction types
// The transaction row itself is owned by the ingestion subsystem; this
// core only reads it and mirrors fraud verdicts back onto it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Feature view of a transaction as submitted for risk assessment.
/// Unknown feature fields are carried through to the remote scorer as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionFeatures {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_total_transactions: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_total_amount_spent: Option<f64>,
    #[serde(default)]
    pub is_new_location: bool,
    #[serde(default)]
    pub is_new_device: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Mirror row as stored. `is_fraud`/`risk_score` are the only fields this
/// core ever writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    pub is_fraud: bool,
    pub risk_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub is_fraud: Option<bool>,
    pub risk_score: Option<f64>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.is_fraud.is_none() && self.risk_score.is_none()
    }
}

/// Broadcast payload for a mirror update: only the fields that changed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDelta {
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_fraud: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
}

impl TransactionDelta {
    pub fn from_patch(transaction_id: &str, patch: &TransactionPatch) -> Self {
        Self {
            transaction_id: transaction_id.to_string(),
            is_fraud: patch.is_fraud,
            risk_score: patch.risk_score,
        }
    }
}
