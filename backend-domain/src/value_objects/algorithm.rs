// Detection algorithm catalog
// Labels recorded in anomaly attribution for audit/explainability

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionAlgorithm {
    IsolationForest,
    LocalOutlierFactor,
    OneClassSVM,
    Autoencoder,
    EnsembleDetection,
    RuleBasedDetection,
}

impl DetectionAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            DetectionAlgorithm::IsolationForest => "IsolationForest",
            DetectionAlgorithm::LocalOutlierFactor => "LocalOutlierFactor",
            DetectionAlgorithm::OneClassSVM => "OneClassSVM",
            DetectionAlgorithm::Autoencoder => "Autoencoder",
            DetectionAlgorithm::EnsembleDetection => "EnsembleDetection",
            DetectionAlgorithm::RuleBasedDetection => "RuleBasedDetection",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DetectionAlgorithm::IsolationForest => {
                "Isolation Forest - Isolates anomalies by randomly selecting features and split values"
            }
            DetectionAlgorithm::LocalOutlierFactor => {
                "Local Outlier Factor - Detects anomalies based on local density deviation"
            }
            DetectionAlgorithm::OneClassSVM => {
                "One-Class SVM - Support Vector Machine for novelty detection"
            }
            DetectionAlgorithm::Autoencoder => {
                "Autoencoder Neural Network - Detects anomalies through reconstruction error"
            }
            DetectionAlgorithm::EnsembleDetection => {
                "Ensemble Method - Combined multiple algorithms for enhanced accuracy"
            }
            DetectionAlgorithm::RuleBasedDetection => {
                "Rule-based fraud detection system with threshold analysis"
            }
        }
    }

    /// Maps a scorer-provided model name onto a known category.
    /// Unrecognized hints return None and leave the cascade result in place.
    pub fn from_model_hint(hint: &str) -> Option<Self> {
        let hint = hint.to_lowercase();
        if hint.contains("lof") || hint.contains("outlier") {
            Some(DetectionAlgorithm::LocalOutlierFactor)
        } else if hint.contains("svm") || hint.contains("oneclass") {
            Some(DetectionAlgorithm::OneClassSVM)
        } else if hint.contains("autoencoder") {
            Some(DetectionAlgorithm::Autoencoder)
        } else if hint.contains("ensemble") {
            Some(DetectionAlgorithm::EnsembleDetection)
        } else if hint.contains("isolation") || hint.contains("forest") {
            Some(DetectionAlgorithm::IsolationForest)
        } else if hint.contains("rule") || hint.contains("fallback") {
            Some(DetectionAlgorithm::RuleBasedDetection)
        } else {
            None
        }
    }
}
