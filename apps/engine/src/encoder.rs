//! Feature encoder — turns a profile into the fixed-width numeric vector
//! the probability model was trained on.
//!
//! The concatenation order (skills, desired_roles, categorical, numeric) is
//! part of the model contract: the trained weights are meaningless if it
//! changes. `EncoderState` is persisted inside the model artifact so
//! training and serving always agree.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::profile::Profile;

/// Number of one-hot categorical columns (education, field_of_study,
/// personality, work_preference, sentiment — in that order).
const CATEGORICAL_COLS: usize = 5;
/// Number of standardized numeric columns (age, risk, motivation,
/// experience, seven interests).
const NUMERIC_COLS: usize = 11;

/// Per-column one-hot vocabulary with an explicit trailing unknown bucket,
/// so inference never fails on a category unseen at fit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoricalVocab {
    pub categories: Vec<String>,
}

impl CategoricalVocab {
    /// Width including the unknown bucket.
    fn width(&self) -> usize {
        self.categories.len() + 1
    }

    fn encode_into(&self, value: &str, out: &mut Vec<f64>) {
        let hit = self.categories.iter().position(|c| c == value);
        for i in 0..self.categories.len() {
            out.push(if hit == Some(i) { 1.0 } else { 0.0 });
        }
        // Unknown bucket.
        out.push(if hit.is_none() { 1.0 } else { 0.0 });
    }
}

/// Fitted encoder parameters: multi-label vocabularies, categorical
/// vocabularies, and standardization statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderState {
    pub skills_vocab: Vec<String>,
    pub desired_vocab: Vec<String>,
    /// Vocabularies for education, field_of_study, personality,
    /// work_preference, sentiment — in that order.
    pub categorical: Vec<CategoricalVocab>,
    pub numeric_means: Vec<f64>,
    pub numeric_stds: Vec<f64>,
}

impl EncoderState {
    /// Captures vocabularies and standardization statistics from the
    /// training profiles. Profiles are expected to be sanitized.
    pub fn fit(profiles: &[Profile]) -> Self {
        let skills_vocab = multi_label_vocab(profiles.iter().map(|p| p.skills.as_slice()));
        let desired_vocab = multi_label_vocab(profiles.iter().map(|p| p.desired_roles.as_slice()));

        let categorical = (0..CATEGORICAL_COLS)
            .map(|col| {
                let mut categories: Vec<String> = Vec::new();
                for p in profiles {
                    let v = categorical_value(p, col);
                    if !categories.contains(&v) {
                        categories.push(v);
                    }
                }
                categories.sort();
                CategoricalVocab { categories }
            })
            .collect();

        let n = profiles.len().max(1) as f64;
        let mut means = vec![0.0; NUMERIC_COLS];
        for p in profiles {
            for (i, v) in numeric_values(p).into_iter().enumerate() {
                means[i] += v;
            }
        }
        for m in &mut means {
            *m /= n;
        }
        let mut stds = vec![0.0; NUMERIC_COLS];
        for p in profiles {
            for (i, v) in numeric_values(p).into_iter().enumerate() {
                stds[i] += (v - means[i]).powi(2);
            }
        }
        for s in &mut stds {
            *s = (*s / n).sqrt();
            // Zero-variance guard: a constant column scales to 0, not NaN.
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        Self {
            skills_vocab,
            desired_vocab,
            categorical,
            numeric_means: means,
            numeric_stds: stds,
        }
    }

    /// Total feature-vector width.
    pub fn width(&self) -> usize {
        self.skills_vocab.len()
            + self.desired_vocab.len()
            + self.categorical.iter().map(CategoricalVocab::width).sum::<usize>()
            + NUMERIC_COLS
    }

    /// Encodes one profile. Skills and desired roles unseen at fit time
    /// are silently dropped to keep the vector fixed-width.
    pub fn transform(&self, profile: &Profile) -> Array1<f64> {
        let mut out = Vec::with_capacity(self.width());

        for skill in &self.skills_vocab {
            out.push(if profile.skills.contains(skill) { 1.0 } else { 0.0 });
        }
        for role in &self.desired_vocab {
            out.push(if profile.desired_roles.contains(role) {
                1.0
            } else {
                0.0
            });
        }
        for (col, vocab) in self.categorical.iter().enumerate() {
            vocab.encode_into(&categorical_value(profile, col), &mut out);
        }
        for (i, v) in numeric_values(profile).into_iter().enumerate() {
            let v = if v.is_finite() { v } else { 0.0 };
            out.push((v - self.numeric_means[i]) / self.numeric_stds[i]);
        }

        Array1::from_vec(out)
    }

    /// Encodes a batch into a design matrix, one row per profile.
    pub fn transform_batch(&self, profiles: &[Profile]) -> Array2<f64> {
        let width = self.width();
        let mut matrix = Array2::zeros((profiles.len(), width));
        for (i, p) in profiles.iter().enumerate() {
            matrix.row_mut(i).assign(&self.transform(p));
        }
        matrix
    }
}

fn multi_label_vocab<'a>(lists: impl Iterator<Item = &'a [String]>) -> Vec<String> {
    let mut vocab: Vec<String> = Vec::new();
    for list in lists {
        for token in list {
            if !vocab.contains(token) {
                vocab.push(token.clone());
            }
        }
    }
    vocab.sort();
    vocab
}

fn categorical_value(p: &Profile, col: usize) -> String {
    match col {
        0 => format!("{:?}", p.education),
        1 => p.field_of_study.clone(),
        2 => p.personality.clone(),
        3 => format!("{:?}", p.work_preference),
        _ => format!("{:?}", p.sentiment),
    }
}

fn numeric_values(p: &Profile) -> [f64; NUMERIC_COLS] {
    [
        p.age as f64,
        p.risk_taking as f64,
        p.motivation_score as f64,
        p.years_experience,
        p.interests.data as f64,
        p.interests.programming as f64,
        p.interests.design as f64,
        p.interests.hardware as f64,
        p.interests.management as f64,
        p.interests.research as f64,
        p.interests.teaching as f64,
    ]
}
