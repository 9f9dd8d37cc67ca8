//! Blended ranker — combines model probability with rule-based fit
//! signals and turns raw scores into the ranked role list.
//!
//! One `RoleScorer` trait, two implementations: `ModelBlendedScorer` when
//! per-role probabilities are available and `RuleFallbackScorer` when they
//! are not. They deliberately use different blend weights and temperatures
//! (the fallback redistributes the missing ML term onto skill fit and a
//! risk-tolerance signal), so they are not expected to reproduce identical
//! numbers — only the same ranking shape and output schema. Everything
//! downstream of the raw score (softmax, tie-break, truncation,
//! renormalization, activation) is shared so the two paths cannot
//! silently diverge.

use serde::{Deserialize, Serialize};

use crate::catalog::{RoleCatalog, DEFAULT_ROLES};
use crate::model::ModelScores;
use crate::profile::Profile;
use crate::sentiment::sentiment_positivity;

/// How many roles a recommendation returns.
pub const TOP_K: usize = 5;

const MODEL_TEMPERATURE: f64 = 0.7;
const FALLBACK_TEMPERATURE: f64 = 0.8;

/// One ranked role with its normalized share of the returned set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedRole {
    pub role: String,
    pub score: f64,
}

/// A candidate role with its blended raw score, before softmax.
#[derive(Debug, Clone)]
pub struct ScoredRole {
    pub role: String,
    pub raw: f64,
}

/// Scoring backend seam. Implementations produce one raw score per
/// candidate role, in catalog order; ranking is shared.
pub trait RoleScorer {
    fn score_roles(&self, profile: &Profile, catalog: &RoleCatalog) -> Vec<ScoredRole>;
    fn temperature(&self) -> f64;
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// Shared rule sub-scores, each in [0, 1]
// ────────────────────────────────────────────────────────────────────────────

/// Fraction of the role's required skills the user already has; 0 when
/// the catalog has no required-skill entry for the role.
pub fn skill_fit(profile: &Profile, catalog: &RoleCatalog, role: &str) -> f64 {
    let required = catalog.required_skills(role);
    if required.is_empty() {
        return 0.0;
    }
    let overlap = required
        .iter()
        .filter(|s| profile.skills.contains(s))
        .count();
    overlap as f64 / required.len().max(1) as f64
}

/// Average of the role's interest-axis pair, normalized by the maximum
/// combined slider score of 10. Unmapped roles read as neutral (3, 3).
pub fn interest_fit(profile: &Profile, catalog: &RoleCatalog, role: &str) -> f64 {
    let (a, b) = match catalog.entry(role).and_then(|e| e.interest_axes) {
        Some((a, b)) => (
            profile.interests.axis(a) as f64,
            profile.interests.axis(b) as f64,
        ),
        None => (3.0, 3.0),
    };
    (a + b) / 10.0
}

/// Half experience (capped at five years), half sentiment positivity.
pub fn experience_and_sentiment(profile: &Profile) -> f64 {
    let exp_norm = (profile.years_experience / 5.0).min(1.0);
    0.5 * exp_norm + 0.5 * sentiment_positivity(profile.sentiment)
}

// ────────────────────────────────────────────────────────────────────────────
// The two scorer backends
// ────────────────────────────────────────────────────────────────────────────

/// Model-backed blend: 0.6 ml + 0.25 skill + 0.10 interest + 0.05
/// experience-and-sentiment. Roles the model does not know score ml = 0.
pub struct ModelBlendedScorer<'a> {
    pub scores: &'a ModelScores,
}

impl RoleScorer for ModelBlendedScorer<'_> {
    fn score_roles(&self, profile: &Profile, catalog: &RoleCatalog) -> Vec<ScoredRole> {
        catalog
            .roles()
            .iter()
            .map(|entry| {
                let role = entry.role.as_str();
                let ml = self.scores.probability_for(role);
                let raw = 0.6 * ml
                    + 0.25 * skill_fit(profile, catalog, role)
                    + 0.10 * interest_fit(profile, catalog, role)
                    + 0.05 * experience_and_sentiment(profile);
                ScoredRole {
                    role: entry.role.clone(),
                    raw,
                }
            })
            .collect()
    }

    fn temperature(&self) -> f64 {
        MODEL_TEMPERATURE
    }

    fn backend(&self) -> &'static str {
        "model"
    }
}

/// Rule-only fallback: 0.55 skill + 0.25 interest + 0.10
/// experience-and-sentiment proxy + 0.10 risk fit. The heavier skill
/// weight and the risk term stand in for the missing ML probability.
pub struct RuleFallbackScorer;

impl RoleScorer for RuleFallbackScorer {
    fn score_roles(&self, profile: &Profile, catalog: &RoleCatalog) -> Vec<ScoredRole> {
        catalog
            .roles()
            .iter()
            .map(|entry| {
                let role = entry.role.as_str();
                let raw = 0.55 * skill_fit(profile, catalog, role)
                    + 0.25 * interest_fit(profile, catalog, role)
                    + 0.10 * experience_and_sentiment(profile)
                    + 0.10 * profile.risk_fit();
                ScoredRole {
                    role: entry.role.clone(),
                    raw,
                }
            })
            .collect()
    }

    fn temperature(&self) -> f64 {
        FALLBACK_TEMPERATURE
    }

    fn backend(&self) -> &'static str {
        "rules"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared ranking pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Temperature-scaled softmax over the candidate set actually scored.
/// Max-logit subtraction keeps the exponentials finite; the temperature
/// sharpens separation so the top choice dominates visually.
pub fn softmax(raw: &[f64], temperature: f64) -> Vec<f64> {
    if raw.is_empty() {
        return Vec::new();
    }
    let t = temperature.max(1e-6);
    let logits: Vec<f64> = raw.iter().map(|r| r / t).collect();
    let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
    let denom: f64 = exps.iter().sum();
    exps.iter().map(|e| e / denom).collect()
}

/// Runs the shared pipeline: softmax, stable descending sort (catalog
/// declaration order wins ties), top-5 truncation, and renormalization so
/// the returned scores sum to 1 over the returned set.
///
/// An empty candidate set degrades to the global default roles at uniform
/// score — the engine never returns an empty ranking.
pub fn rank(scorer: &dyn RoleScorer, profile: &Profile, catalog: &RoleCatalog) -> Vec<RankedRole> {
    let scored = scorer.score_roles(profile, catalog);
    if scored.is_empty() {
        return DEFAULT_ROLES
            .iter()
            .map(|role| RankedRole {
                role: role.to_string(),
                score: 1.0 / DEFAULT_ROLES.len() as f64,
            })
            .collect();
    }

    let raw: Vec<f64> = scored.iter().map(|s| s.raw).collect();
    let soft = softmax(&raw, scorer.temperature());

    let mut order: Vec<usize> = (0..scored.len()).collect();
    // Stable sort: equal scores keep catalog declaration order.
    order.sort_by(|&a, &b| {
        soft[b]
            .partial_cmp(&soft[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order.truncate(TOP_K);

    let kept: f64 = order.iter().map(|&i| soft[i]).sum();
    order
        .into_iter()
        .map(|i| RankedRole {
            role: scored[i].role.clone(),
            score: soft[i] / kept,
        })
        .collect()
}

/// Roles clearing their tuned threshold on the *raw* model probabilities
/// (never the softmax scores). Empty — including the whole fallback path,
/// which has no probabilities — degrades to the top-ranked role.
pub fn activated_roles(scores: Option<&ModelScores>, ranked: &[RankedRole]) -> Vec<String> {
    let mut activated: Vec<String> = match scores {
        Some(s) => s
            .roles
            .iter()
            .zip(&s.probabilities)
            .zip(&s.thresholds)
            .filter(|((_, &p), &t)| p >= t)
            .map(|((role, _), _)| role.clone())
            .collect(),
        None => Vec::new(),
    };
    if activated.is_empty() {
        if let Some(top) = ranked.first() {
            activated.push(top.role.clone());
        }
    }
    activated
}
