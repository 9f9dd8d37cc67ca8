//! The recommendation engine — one entry point, `recommend`, that wires
//! every stage together: model scoring (or fallback), blended ranking,
//! activation, skill gap, learning plan, and market trend.
//!
//! `recommend` never fails. A missing or erroring model backend routes
//! the request to the rule-based scorer; an empty catalog degrades to
//! the default roles. The history append is a side effect recorded
//! after scoring and does not influence the result.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::catalog::{RoleCatalog, TrendLabel};
use crate::history::{History, HistoryRecord};
use crate::model::{ModelScores, ProbabilitySource};
use crate::plan::{learning_plan, skill_gap, PlanStep, SkillGap};
use crate::profile::Profile;
use crate::ranker::{
    activated_roles, rank, ModelBlendedScorer, RankedRole, RoleScorer, RuleFallbackScorer,
};
use crate::trend::trend_series;

/// Everything one recommendation call produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Top roles, highest share first; scores sum to 1 over this set.
    pub ranked: Vec<RankedRole>,
    /// Roles whose raw model probability cleared its tuned threshold;
    /// never empty.
    pub activated_roles: Vec<String>,
    /// Gap against the top-ranked role.
    pub skill_gap: SkillGap,
    pub learning_plan: Vec<PlanStep>,
    /// Trend label per returned role.
    pub market_trend: BTreeMap<String, TrendLabel>,
    /// Synthetic 5-period openings series per returned role.
    pub market_trend_values: BTreeMap<String, [i64; 5]>,
    /// Which scorer produced the ranking: "model" or "rules".
    pub scorer_backend: String,
}

pub struct Engine {
    catalog: RoleCatalog,
    model: Option<Arc<dyn ProbabilitySource>>,
    history: History,
}

impl Engine {
    pub fn new(catalog: RoleCatalog, model: Option<Arc<dyn ProbabilitySource>>) -> Self {
        if model.is_none() {
            warn!("no probability model configured, every request will use the rule fallback");
        }
        Self {
            catalog,
            model,
            history: History::new(),
        }
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Scores one profile. Infallible by construction: every failure mode
    /// has a defined degraded output.
    pub async fn recommend(&self, profile: &Profile) -> Recommendation {
        let profile = profile.clone().sanitize();

        let scores = match &self.model {
            Some(model) => match model.score(&profile).await {
                Ok(scores) => Some(scores),
                Err(e) => {
                    warn!(backend = model.backend(), error = %e, "model scoring failed, falling back to rules");
                    None
                }
            },
            None => None,
        };

        let recommendation = self.assemble(&profile, scores.as_ref());

        self.history.append(HistoryRecord {
            profile_ref: profile.profile_ref,
            top_roles: recommendation
                .ranked
                .iter()
                .map(|r| r.role.clone())
                .collect(),
            scorer_backend: recommendation.scorer_backend.clone(),
            timestamp: chrono::Utc::now(),
        });

        info!(
            profile_ref = %profile.profile_ref,
            backend = recommendation.scorer_backend,
            top = recommendation.ranked.first().map(|r| r.role.as_str()).unwrap_or(""),
            "recommendation produced"
        );
        recommendation
    }

    fn assemble(&self, profile: &Profile, scores: Option<&ModelScores>) -> Recommendation {
        let (ranked, backend) = match scores {
            Some(scores) => {
                let scorer = ModelBlendedScorer { scores };
                (rank(&scorer, profile, &self.catalog), scorer.backend())
            }
            None => {
                let scorer = RuleFallbackScorer;
                (rank(&scorer, profile, &self.catalog), scorer.backend())
            }
        };

        let activated = activated_roles(scores, &ranked);

        // Everything downstream keys off the top-ranked role. rank()
        // guarantees a non-empty list, so the unwrap_or arm is for
        // robustness, not an expected path.
        let top_role = ranked
            .first()
            .map(|r| r.role.clone())
            .unwrap_or_else(|| "Software Developer".to_string());

        let gap = skill_gap(profile, &self.catalog, &top_role);
        let plan = learning_plan(&gap.missing, &self.catalog);

        let mut market_trend = BTreeMap::new();
        let mut market_trend_values = BTreeMap::new();
        for r in &ranked {
            let trend = self.catalog.trend(&r.role);
            market_trend.insert(r.role.clone(), trend);
            market_trend_values.insert(
                r.role.clone(),
                trend_series(&r.role, trend, self.catalog.growth(&r.role)),
            );
        }

        Recommendation {
            ranked,
            activated_roles: activated,
            skill_gap: gap,
            learning_plan: plan,
            market_trend,
            market_trend_values,
            scorer_backend: backend.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{GrowthParameters, RoleEntry};
    use crate::errors::EngineError;
    use crate::profile::InterestAxis;
    use async_trait::async_trait;
    use std::collections::HashMap;

    fn catalog() -> RoleCatalog {
        let role = |name: &str, skills: &[&str], trend, axes| RoleEntry {
            role: name.to_string(),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            growth: Some(GrowthParameters {
                annual_openings: 10_000,
                total_jobs: 100_000,
                growth_rate: 0.2,
            }),
            trend,
            interest_axes: axes,
        };
        RoleCatalog::new(
            vec![
                role(
                    "Data Analyst",
                    &["sql", "statistics", "excel"],
                    TrendLabel::Stable,
                    Some((InterestAxis::Data, InterestAxis::Programming)),
                ),
                role(
                    "UX/UI Designer",
                    &["figma", "ui_design"],
                    TrendLabel::Rising,
                    Some((InterestAxis::Design, InterestAxis::Management)),
                ),
            ],
            HashMap::new(),
        )
    }

    struct FailingModel;

    #[async_trait]
    impl ProbabilitySource for FailingModel {
        async fn score(&self, _profile: &Profile) -> Result<ModelScores, EngineError> {
            Err(EngineError::ModelUnavailable("down for the test".to_string()))
        }

        fn backend(&self) -> &'static str {
            "local"
        }
    }

    struct FixedModel(Vec<f64>);

    #[async_trait]
    impl ProbabilitySource for FixedModel {
        async fn score(&self, _profile: &Profile) -> Result<ModelScores, EngineError> {
            Ok(ModelScores {
                roles: vec!["Data Analyst".to_string(), "UX/UI Designer".to_string()],
                probabilities: self.0.clone(),
                thresholds: vec![0.5, 0.5],
            })
        }

        fn backend(&self) -> &'static str {
            "local"
        }
    }

    fn analyst() -> Profile {
        Profile {
            skills: vec!["sql".to_string(), "statistics".to_string()],
            years_experience: 3.0,
            ..Profile::default()
        }
    }

    #[tokio::test]
    async fn test_no_model_uses_rules_backend() {
        let engine = Engine::new(catalog(), None);
        let rec = engine.recommend(&analyst()).await;
        assert_eq!(rec.scorer_backend, "rules");
        assert_eq!(rec.ranked[0].role, "Data Analyst");
        assert!(!rec.activated_roles.is_empty());
    }

    #[tokio::test]
    async fn test_failing_model_degrades_to_rules() {
        let engine = Engine::new(catalog(), Some(Arc::new(FailingModel)));
        let rec = engine.recommend(&analyst()).await;
        assert_eq!(rec.scorer_backend, "rules");
        // Fallback has no probabilities: activation degrades to top role.
        assert_eq!(rec.activated_roles, vec![rec.ranked[0].role.clone()]);
    }

    #[tokio::test]
    async fn test_model_path_reports_model_backend() {
        let engine = Engine::new(catalog(), Some(Arc::new(FixedModel(vec![0.9, 0.1]))));
        let rec = engine.recommend(&analyst()).await;
        assert_eq!(rec.scorer_backend, "model");
        assert_eq!(rec.ranked[0].role, "Data Analyst");
        assert_eq!(rec.activated_roles, vec!["Data Analyst"]);
    }

    #[tokio::test]
    async fn test_downstream_keys_off_top_role() {
        let engine = Engine::new(catalog(), Some(Arc::new(FixedModel(vec![0.05, 0.95]))));
        let rec = engine.recommend(&analyst()).await;
        assert_eq!(rec.ranked[0].role, "UX/UI Designer");
        assert_eq!(rec.skill_gap.missing, vec!["figma", "ui_design"]);
        assert_eq!(rec.market_trend["UX/UI Designer"], TrendLabel::Rising);
        assert_eq!(rec.market_trend_values["UX/UI Designer"][4], 10_000);
        // Trend maps cover every returned role.
        assert_eq!(rec.market_trend.len(), rec.ranked.len());
    }

    #[tokio::test]
    async fn test_scores_sum_to_one_and_history_records() {
        let engine = Engine::new(catalog(), None);
        let rec = engine.recommend(&analyst()).await;
        let sum: f64 = rec.ranked.iter().map(|r| r.score).sum();
        assert!((sum - 1.0).abs() < 1e-6);

        assert_eq!(engine.history().len(), 1);
        let record = &engine.history().all()[0];
        assert_eq!(record.top_roles[0], rec.ranked[0].role);
        assert_eq!(record.scorer_backend, "rules");
    }

    #[tokio::test]
    async fn test_empty_catalog_still_answers() {
        let engine = Engine::new(RoleCatalog::new(Vec::new(), HashMap::new()), None);
        let rec = engine.recommend(&analyst()).await;
        assert_eq!(rec.ranked.len(), 3);
        assert_eq!(rec.ranked[0].role, "Software Developer");
        assert!(!rec.activated_roles.is_empty());
        // Unknown roles: empty gap, default trend, deterministic series.
        assert!(rec.skill_gap.required.is_empty());
        assert_eq!(rec.market_trend["Software Developer"], TrendLabel::Stable);
        assert_eq!(
            rec.market_trend_values["Software Developer"],
            trend_series("Software Developer", TrendLabel::Stable, None)
        );
    }
}
