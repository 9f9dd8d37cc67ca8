//! Per-label decision-threshold tuning.
//!
//! Offline, independent per role: scan a fixed threshold grid over
//! held-out probabilities against binarized truth and keep the
//! F1-maximizing cut. No cross-role interaction, no global threshold.

use ndarray::Array2;

/// Seed value for the per-label scan. The scan always lands on a grid
/// point (`best_f1` starts below any reachable F1, so the first grid
/// point wins when every threshold ties at 0); this constant is the
/// threshold consumers assume when no tuned vector exists at all.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Candidate grid: 0.10 to 0.90 inclusive, step 0.05.
pub fn threshold_grid() -> Vec<f64> {
    (0..=16).map(|i| 0.10 + i as f64 * 0.05).collect()
}

/// F1 for one label at one threshold. Zero-division (no positive
/// predictions or no positive truth) reads as 0.0, never an error.
fn f1_at(truth: &[f64], proba: &[f64], threshold: f64) -> f64 {
    let mut tp = 0u32;
    let mut fp = 0u32;
    let mut fn_ = 0u32;
    for (&t, &p) in truth.iter().zip(proba) {
        let pred = p >= threshold;
        let actual = t >= 0.5;
        match (pred, actual) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, true) => fn_ += 1,
            (false, false) => {}
        }
    }
    let denom = 2 * tp + fp + fn_;
    if denom == 0 {
        0.0
    } else {
        2.0 * tp as f64 / denom as f64
    }
}

/// Tunes one threshold per label column. `truth` and `proba` are
/// `[rows][labels]` and must share shape; the output is aligned to the
/// label (role) order of the columns.
pub fn tune_thresholds(truth: &Array2<f64>, proba: &Array2<f64>) -> Vec<f64> {
    let grid = threshold_grid();
    let labels = truth.ncols();
    let mut thresholds = Vec::with_capacity(labels);

    for label in 0..labels {
        let truth_col: Vec<f64> = truth.column(label).to_vec();
        let proba_col: Vec<f64> = proba.column(label).to_vec();

        let mut best_f1 = -1.0;
        let mut best_thr = DEFAULT_THRESHOLD;
        for &thr in &grid {
            let f1 = f1_at(&truth_col, &proba_col, thr);
            if f1 > best_f1 {
                best_f1 = f1;
                best_thr = thr;
            }
        }
        thresholds.push(best_thr);
    }
    thresholds
}
