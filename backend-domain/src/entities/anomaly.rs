// Anomaly case entity
// A persisted suspected-fraud finding tied to a transaction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{AnomalyStatus, Severity};

/// Attribution record: which detection method produced the finding and why.
/// Immutable once written except by explicit re-classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggeredBy {
    #[serde(rename = "type")]
    pub kind: String,
    pub algorithm: String,
    pub version: String,
    pub description: String,
    pub confidence: f64,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    pub selection_reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyComment {
    pub id: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    pub id: String,
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub rule_name: String,
    pub description: String,
    pub severity: Severity,
    pub status: AnomalyStatus,
    pub risk_score: f64,
    pub triggered_by: TriggeredBy,
    #[serde(default)]
    pub transaction_data: serde_json::Value,
    #[serde(default)]
    pub comments: Vec<AnomalyComment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-facing partial update. `resolved_at` is never accepted from
/// callers; the lifecycle derives it from the status transition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnomalyPatch {
    pub status: Option<AnomalyStatus>,
    pub severity: Option<Severity>,
    pub risk_score: Option<f64>,
    pub description: Option<String>,
    pub resolution_notes: Option<String>,
}

/// Normalized store-level update. The outer Option selects the column,
/// the inner value is what gets written (None clears a nullable field).
#[derive(Debug, Clone, Default)]
pub struct AnomalyUpdate {
    pub status: Option<AnomalyStatus>,
    pub severity: Option<Severity>,
    pub risk_score: Option<f64>,
    pub description: Option<String>,
    pub resolved_by: Option<Option<String>>,
    pub resolved_at: Option<Option<DateTime<Utc>>>,
    pub resolution_notes: Option<Option<String>>,
}

impl AnomalyUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.severity.is_none()
            && self.risk_score.is_none()
            && self.description.is_none()
            && self.resolved_by.is_none()
            && self.resolved_at.is_none()
            && self.resolution_notes.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub text: String,
}
