// Runtime configuration entities
// Built once by the infrastructure config loader and shared read-only.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTokenEntry {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub role: String,
}

/// Policy constants for the fallback rule evaluator and the attribution
/// cascade. Observed operating values are the defaults; all of them are
/// overridable through configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionThresholds {
    pub high_value_amount: f64,
    pub new_user_amount: f64,
    pub new_user_max_history: i64,
    pub precision_amount: f64,
    pub ensemble_amount: f64,
    pub deep_score: f64,
    pub precision_score: f64,
    pub general_score: f64,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            high_value_amount: 50_000.0,
            new_user_amount: 10_000.0,
            new_user_max_history: 5,
            precision_amount: 100_000.0,
            ensemble_amount: 50_000.0,
            deep_score: 0.9,
            precision_score: 0.7,
            general_score: 0.6,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_tokens: Vec<ApiTokenEntry>,
    pub privileged_roles: Vec<String>,
    pub scorer_base_url: String,
    pub scorer_timeout_seconds: u64,
    pub thresholds: DetectionThresholds,
    pub snapshot_limit: usize,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3400".to_string(),
            api_tokens: Vec::new(),
            privileged_roles: vec!["admin".to_string(), "analyst".to_string()],
            scorer_base_url: "http://127.0.0.1:8000".to_string(),
            scorer_timeout_seconds: 10,
            thresholds: DetectionThresholds::default(),
            snapshot_limit: 10,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 15,
        }
    }
}

impl RuntimeConfig {
    pub fn is_privileged_role(&self, role: &str) -> bool {
        self.privileged_roles.iter().any(|r| r == role)
    }
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
}
