//! Offline training for the one-vs-rest probability model.
//!
//! Not request-path code: the `train` binary drives this against a labeled
//! dataset and publishes the artifact before serving picks it up. Each
//! role label gets an independent logistic regression fit by batch
//! gradient descent on the encoded design matrix, which yields
//! calibrated-enough per-role probabilities for downstream blending.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::encoder::EncoderState;
use crate::errors::EngineError;
use crate::model::thresholds::tune_thresholds;
use crate::model::{sigmoid, ModelArtifact, TrainingMetrics};
use crate::profile::Profile;

/// One labeled training row: a profile plus the set of roles that fit it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRecord {
    #[serde(flatten)]
    pub profile: Profile,
    pub labels: Vec<String>,
}

/// Hyperparameters for the gradient-descent fit.
#[derive(Debug, Clone, Copy)]
pub struct TrainOptions {
    pub test_size: f64,
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            epochs: 300,
            learning_rate: 0.1,
            l2: 1.0e-3,
            seed: 42,
        }
    }
}

/// Trains the full artifact: encoder fit, per-role logistic fits,
/// validation metrics, and per-role threshold tuning.
pub fn train(records: &[TrainingRecord], opts: TrainOptions) -> Result<ModelArtifact, EngineError> {
    if records.len() < 4 {
        return Err(EngineError::Training(format!(
            "need at least 4 labeled rows, got {}",
            records.len()
        )));
    }

    let profiles: Vec<Profile> = records.iter().map(|r| r.profile.clone().sanitize()).collect();
    let roles = label_vocab(records);
    if roles.is_empty() {
        return Err(EngineError::Training("no role labels in dataset".into()));
    }

    let encoder = EncoderState::fit(&profiles);
    let x = encoder.transform_batch(&profiles);
    let y = binarize_labels(records, &roles);

    let (train_idx, val_idx) = split_indices(records.len(), opts.test_size, opts.seed);
    let x_train = select_rows(&x, &train_idx);
    let y_train = select_rows(&y, &train_idx);
    let x_val = select_rows(&x, &val_idx);
    let y_val = select_rows(&y, &val_idx);

    info!(
        roles = roles.len(),
        features = encoder.width(),
        train_rows = train_idx.len(),
        val_rows = val_idx.len(),
        "fitting one-vs-rest logistic model"
    );

    let mut weights = Vec::with_capacity(roles.len());
    let mut intercepts = Vec::with_capacity(roles.len());
    for label in 0..roles.len() {
        let targets = y_train.column(label).to_owned();
        let (w, b) = fit_logistic(&x_train, &targets, &opts);
        weights.push(w.to_vec());
        intercepts.push(b);
    }

    let val_proba = predict_matrix(&x_val, &weights, &intercepts);
    let metrics = TrainingMetrics {
        hamming_loss: hamming_loss(&y_val, &val_proba, 0.5),
        precision_at_3: precision_at_k(&y_val, &val_proba, 3),
        recall_at_3: recall_at_k(&y_val, &val_proba, 3),
        train_rows: train_idx.len(),
        val_rows: val_idx.len(),
    };
    let thresholds = tune_thresholds(&y_val, &val_proba);

    Ok(ModelArtifact {
        roles,
        encoder,
        weights,
        intercepts,
        thresholds,
        metrics,
        trained_at: chrono::Utc::now(),
    })
}

/// Sorted, deduplicated role vocabulary; this order is the artifact's
/// index ↔ role contract.
fn label_vocab(records: &[TrainingRecord]) -> Vec<String> {
    let mut roles: Vec<String> = Vec::new();
    for r in records {
        for label in &r.labels {
            let label = label.trim().to_string();
            if !label.is_empty() && !roles.contains(&label) {
                roles.push(label);
            }
        }
    }
    roles.sort();
    roles
}

fn binarize_labels(records: &[TrainingRecord], roles: &[String]) -> Array2<f64> {
    let mut y = Array2::zeros((records.len(), roles.len()));
    for (i, r) in records.iter().enumerate() {
        for label in &r.labels {
            if let Some(j) = roles.iter().position(|role| role == label.trim()) {
                y[[i, j]] = 1.0;
            }
        }
    }
    y
}

fn split_indices(n: usize, test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let val_len = ((n as f64 * test_size).round() as usize).clamp(1, n - 1);
    let (val, train) = indices.split_at(val_len);
    (train.to_vec(), val.to_vec())
}

fn select_rows(m: &Array2<f64>, idx: &[usize]) -> Array2<f64> {
    let mut out = Array2::zeros((idx.len(), m.ncols()));
    for (row, &i) in idx.iter().enumerate() {
        out.row_mut(row).assign(&m.row(i));
    }
    out
}

/// Batch gradient descent on the log loss with L2 regularization.
fn fit_logistic(x: &Array2<f64>, y: &Array1<f64>, opts: &TrainOptions) -> (Array1<f64>, f64) {
    let n = x.nrows().max(1) as f64;
    let mut w = Array1::<f64>::zeros(x.ncols());
    let mut b = 0.0f64;

    for _ in 0..opts.epochs {
        // error = sigmoid(Xw + b) - y
        let mut z = x.dot(&w);
        z += b;
        let error = z.mapv(sigmoid) - y;

        let grad_w = x.t().dot(&error) / n + opts.l2 * &w;
        let grad_b = error.sum() / n;

        w = w - opts.learning_rate * &grad_w;
        b -= opts.learning_rate * grad_b;
    }
    (w, b)
}

fn predict_matrix(x: &Array2<f64>, weights: &[Vec<f64>], intercepts: &[f64]) -> Array2<f64> {
    let mut proba = Array2::zeros((x.nrows(), weights.len()));
    for (j, (w, &b)) in weights.iter().zip(intercepts).enumerate() {
        let w = Array1::from_vec(w.clone());
        let z = x.dot(&w) + b;
        proba.column_mut(j).assign(&z.mapv(sigmoid));
    }
    proba
}

// ────────────────────────────────────────────────────────────────────────────
// Validation metrics
// ────────────────────────────────────────────────────────────────────────────

/// Fraction of label cells predicted wrongly at a fixed 0.5 cut.
pub fn hamming_loss(truth: &Array2<f64>, proba: &Array2<f64>, cut: f64) -> f64 {
    let total = (truth.nrows() * truth.ncols()).max(1) as f64;
    let mut wrong = 0usize;
    for (t, p) in truth.iter().zip(proba.iter()) {
        let pred = *p >= cut;
        let actual = *t >= 0.5;
        if pred != actual {
            wrong += 1;
        }
    }
    wrong as f64 / total
}

fn top_k_indices(row: &[f64], k: usize) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..row.len()).collect();
    idx.sort_by(|&a, &b| row[b].partial_cmp(&row[a]).unwrap_or(std::cmp::Ordering::Equal));
    idx.truncate(k);
    idx
}

/// Of the k top-scored labels per row, the fraction that are true.
pub fn precision_at_k(truth: &Array2<f64>, proba: &Array2<f64>, k: usize) -> f64 {
    let rows = truth.nrows();
    if rows == 0 {
        return 0.0;
    }
    let mut hits = 0.0;
    for i in 0..rows {
        let row: Vec<f64> = proba.row(i).to_vec();
        for j in top_k_indices(&row, k) {
            hits += truth[[i, j]];
        }
    }
    hits / (rows * k) as f64
}

/// Of all true labels, the fraction recovered inside the per-row top k.
pub fn recall_at_k(truth: &Array2<f64>, proba: &Array2<f64>, k: usize) -> f64 {
    let total: f64 = truth.iter().sum();
    if total == 0.0 {
        return 0.0;
    }
    let mut hits = 0.0;
    for i in 0..truth.nrows() {
        let row: Vec<f64> = proba.row(i).to_vec();
        for j in top_k_indices(&row, k) {
            hits += truth[[i, j]];
        }
    }
    hits / total
}
