//! Probability model — serving contract and the pluggable backends.
//!
//! The trained artifact is a one-vs-rest set of logistic scorers, one per
//! role, persisted as JSON together with the fitted encoder, per-role
//! decision thresholds, and the fixed role order that defines the vector
//! index ↔ role mapping. It is loaded once per process and shared
//! read-only; nothing here mutates after load.
//!
//! Two backends implement `ProbabilitySource`: the local artifact and a
//! remote HTTP service. Either failing is a degraded-mode event for the
//! engine, never a caller-facing error.

pub mod remote;
pub mod thresholds;
pub mod train;

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::encoder::EncoderState;
use crate::errors::EngineError;
use crate::profile::Profile;

/// Validation metrics captured at training time and carried in the
/// artifact for observability.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub hamming_loss: f64,
    pub precision_at_3: f64,
    pub recall_at_3: f64,
    pub train_rows: usize,
    pub val_rows: usize,
}

/// Immutable trained-model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Fixed role order; index i of every aligned vector refers to
    /// `roles[i]`.
    pub roles: Vec<String>,
    pub encoder: EncoderState,
    /// Logistic coefficients, `[n_roles][n_features]`.
    pub weights: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
    /// Tuned per-role decision thresholds, aligned to `roles`.
    pub thresholds: Vec<f64>,
    pub metrics: TrainingMetrics,
    pub trained_at: DateTime<Utc>,
}

impl ModelArtifact {
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Artifact(format!("cannot read {}: {e}", path.display())))?;
        let artifact: ModelArtifact = serde_json::from_str(&raw)
            .map_err(|e| EngineError::Artifact(format!("invalid artifact JSON: {e}")))?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EngineError::Artifact(format!("cannot create {}: {e}", parent.display())))?;
        }
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| EngineError::Artifact(e.to_string()))?;
        std::fs::write(path, raw)
            .map_err(|e| EngineError::Artifact(format!("cannot write {}: {e}", path.display())))
    }

    fn validate(&self) -> Result<(), EngineError> {
        let n = self.roles.len();
        if self.weights.len() != n || self.intercepts.len() != n || self.thresholds.len() != n {
            return Err(EngineError::Artifact(format!(
                "role-aligned vectors disagree: {} roles, {} weight rows, {} intercepts, {} thresholds",
                n,
                self.weights.len(),
                self.intercepts.len(),
                self.thresholds.len()
            )));
        }
        let width = self.encoder.width();
        if let Some(row) = self.weights.iter().find(|w| w.len() != width) {
            return Err(EngineError::Artifact(format!(
                "weight row width {} does not match encoder width {width}",
                row.len()
            )));
        }
        Ok(())
    }

    /// One independent activation probability per role. Multi-label: the
    /// entries are sigmoids, not a distribution, and need not sum to 1.
    pub fn predict_proba(&self, features: &Array1<f64>) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.intercepts)
            .map(|(w, b)| {
                let z: f64 = w.iter().zip(features.iter()).map(|(wi, xi)| wi * xi).sum::<f64>() + b;
                sigmoid(z)
            })
            .collect()
    }
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Role-aligned output of a probability backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelScores {
    pub roles: Vec<String>,
    pub probabilities: Vec<f64>,
    pub thresholds: Vec<f64>,
}

impl ModelScores {
    /// Probability for a role, 0.0 when the backend does not know it.
    pub fn probability_for(&self, role: &str) -> f64 {
        self.roles
            .iter()
            .position(|r| r == role)
            .map(|i| self.probabilities[i])
            .unwrap_or(0.0)
    }
}

/// Pluggable probability backend. Carried by the engine as
/// `Option<Arc<dyn ProbabilitySource>>`; `None` or any `Err` routes the
/// request to the rule-based fallback scorer.
#[async_trait]
pub trait ProbabilitySource: Send + Sync {
    async fn score(&self, profile: &Profile) -> Result<ModelScores, EngineError>;
    fn backend(&self) -> &'static str;
}

/// In-process backend over the loaded artifact. Pure arithmetic, no I/O.
pub struct LocalModel {
    artifact: ModelArtifact,
}

impl LocalModel {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self { artifact }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

#[async_trait]
impl ProbabilitySource for LocalModel {
    async fn score(&self, profile: &Profile) -> Result<ModelScores, EngineError> {
        let features = self.artifact.encoder.transform(profile);
        Ok(ModelScores {
            roles: self.artifact.roles.clone(),
            probabilities: self.artifact.predict_proba(&features),
            thresholds: self.artifact.thresholds.clone(),
        })
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_artifact() -> ModelArtifact {
        let profiles = vec![
            Profile {
                skills: vec!["python".to_string(), "sql".to_string()],
                ..Profile::default()
            }
            .sanitize(),
            Profile {
                skills: vec!["figma".to_string()],
                ..Profile::default()
            }
            .sanitize(),
        ];
        let encoder = EncoderState::fit(&profiles);
        let width = encoder.width();
        ModelArtifact {
            roles: vec!["Data Analyst".to_string(), "UX/UI Designer".to_string()],
            encoder,
            weights: vec![vec![0.0; width], vec![0.0; width]],
            intercepts: vec![0.0, 2.0],
            thresholds: vec![0.5, 0.5],
            metrics: TrainingMetrics::default(),
            trained_at: Utc::now(),
        }
    }

    #[test]
    fn test_predict_proba_is_per_role_sigmoid() {
        let artifact = tiny_artifact();
        let features = Array1::zeros(artifact.encoder.width());
        let proba = artifact.predict_proba(&features);
        assert_eq!(proba.len(), 2);
        assert!((proba[0] - 0.5).abs() < 1e-9);
        assert!((proba[1] - sigmoid(2.0)).abs() < 1e-9);
        // Multi-label: entries are independent and exceed 1.0 in sum.
        assert!(proba.iter().sum::<f64>() > 1.0);
    }

    #[test]
    fn test_artifact_round_trips_through_disk() {
        let artifact = tiny_artifact();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        artifact.save(&path).unwrap();
        let restored = ModelArtifact::load(&path).unwrap();
        assert_eq!(restored.roles, artifact.roles);
        assert_eq!(restored.weights, artifact.weights);
        assert_eq!(restored.thresholds, artifact.thresholds);
    }

    #[test]
    fn test_misaligned_artifact_is_rejected() {
        let mut artifact = tiny_artifact();
        artifact.thresholds.pop();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let raw = serde_json::to_string(&artifact).unwrap();
        std::fs::write(&path, raw).unwrap();
        assert!(ModelArtifact::load(&path).is_err());
    }

    #[tokio::test]
    async fn test_local_source_scores_are_role_aligned() {
        let source = LocalModel::new(tiny_artifact());
        let profile = Profile::default().sanitize();
        let scores = source.score(&profile).await.unwrap();
        assert_eq!(scores.roles.len(), scores.probabilities.len());
        assert_eq!(scores.roles.len(), scores.thresholds.len());
        assert_eq!(scores.probability_for("No Such Role"), 0.0);
    }
}
