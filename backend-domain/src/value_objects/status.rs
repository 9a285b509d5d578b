// Anomaly case status value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyStatus {
    Open,
    Investigating,
    Resolved,
    FalsePositive,
    ConfirmedFraud,
}

impl AnomalyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyStatus::Open => "open",
            AnomalyStatus::Investigating => "investigating",
            AnomalyStatus::Resolved => "resolved",
            AnomalyStatus::FalsePositive => "false_positive",
            AnomalyStatus::ConfirmedFraud => "confirmed_fraud",
        }
    }

    /// Statuses that must carry resolution bookkeeping.
    /// Invariant: `resolved_at` is non-null iff the status is one of these.
    pub fn requires_resolution(&self) -> bool {
        matches!(self, AnomalyStatus::Resolved | AnomalyStatus::FalsePositive)
    }
}

impl From<&str> for AnomalyStatus {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "investigating" => AnomalyStatus::Investigating,
            "resolved" => AnomalyStatus::Resolved,
            "false_positive" => AnomalyStatus::FalsePositive,
            "confirmed_fraud" => AnomalyStatus::ConfirmedFraud,
            _ => AnomalyStatus::Open,
        }
    }
}
