// Remote scorer client
// One bounded request per assessment, no retries; every failure path lands
// on the deterministic local rule evaluator.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use backend_domain::ports::RiskScorer;
use backend_domain::services::fallback;
use backend_domain::{Assessment, DetectionThresholds, RuntimeConfig, TransactionFeatures};

pub struct MlScorerService {
    client: Client,
    base_url: String,
    thresholds: DetectionThresholds,
}

/// Wire shape of the scorer's /predict response.
#[derive(Debug, Deserialize)]
struct ScorerResponse {
    is_anomaly: bool,
    anomaly_score: f64,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    model_name: Option<String>,
    #[serde(default)]
    model_version: Option<String>,
    #[serde(default)]
    model_description: Option<String>,
    #[serde(default)]
    risk_factors: Option<Vec<String>>,
}

impl MlScorerService {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.scorer_timeout_seconds.max(1)))
            .build()?;
        Ok(Self {
            client,
            base_url: config.scorer_base_url.clone(),
            thresholds: config.thresholds,
        })
    }

    async fn remote_assess(&self, features: &TransactionFeatures) -> Result<Assessment> {
        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(features)
            .send()
            .await?
            .error_for_status()?;
        let body: ScorerResponse = response.json().await?;
        Ok(map_response(body))
    }
}

#[async_trait]
impl RiskScorer for MlScorerService {
    async fn assess(&self, features: &TransactionFeatures) -> Assessment {
        match self.remote_assess(features).await {
            Ok(assessment) => assessment,
            Err(err) => {
                warn!(
                    transaction_id = %features.transaction_id,
                    "remote scorer unavailable, using rule fallback: {}",
                    err
                );
                fallback::fallback_assessment(features, &self.thresholds)
            }
        }
    }

    async fn check_scorer(&self) -> Result<()> {
        self.client
            .get(format!("{}/metrics", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Maps the raw response into the assessment shape. Raw anomaly scores can
/// be negative and unbounded; the probability is their magnitude, with
/// scores over 100 divided by 1000 to compensate for the wide scales some
/// scorers emit.
fn map_response(body: ScorerResponse) -> Assessment {
    let probability = body
        .confidence
        .map(clamp_unit)
        .unwrap_or_else(|| normalize_anomaly_score(body.anomaly_score));
    Assessment {
        is_anomaly: body.is_anomaly,
        risk_score: probability,
        model_name: body.model_name,
        model_version: body.model_version.unwrap_or_else(|| "1.0".to_string()),
        model_description: body.model_description,
        confidence: Some(probability),
        risk_factors: body.risk_factors.unwrap_or_default(),
        timestamp: Utc::now(),
    }
}

fn normalize_anomaly_score(anomaly_score: f64) -> f64 {
    let magnitude = anomaly_score.abs();
    let magnitude = if magnitude > 100.0 {
        magnitude / 1000.0
    } else {
        magnitude
    };
    clamp_unit(magnitude)
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
