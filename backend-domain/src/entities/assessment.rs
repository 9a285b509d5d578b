// Assessment entity
// Transient output of risk scoring for one transaction; never persisted
// on its own, only folded into an anomaly record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const FALLBACK_MODEL_VERSION: &str = "fallback_rules_v1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub is_anomaly: bool,
    pub risk_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub model_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl Assessment {
    /// True when the assessment came from the local rule evaluator rather
    /// than a genuine model response.
    pub fn is_fallback(&self) -> bool {
        let version = self.model_version.to_lowercase();
        version.contains("fallback") || version.contains("rule")
    }
}
