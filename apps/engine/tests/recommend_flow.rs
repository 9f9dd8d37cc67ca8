//! End-to-end recommendation flow against the shipped role catalog.

use std::path::PathBuf;
use std::sync::Arc;

use compass_engine::catalog::RoleCatalog;
use compass_engine::engine::Engine;
use compass_engine::model::train::{train, TrainOptions, TrainingRecord};
use compass_engine::model::LocalModel;
use compass_engine::profile::{Interests, Profile, Sentiment};

fn workspace_configs() -> (PathBuf, PathBuf) {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");
    (
        root.join("configs/role_catalog.json"),
        root.join("configs/skill_courses.json"),
    )
}

fn shipped_catalog() -> RoleCatalog {
    let (catalog, courses) = workspace_configs();
    RoleCatalog::load(&catalog, &courses).expect("shipped catalog must parse")
}

fn data_profile() -> Profile {
    Profile {
        skills: vec![
            "python".to_string(),
            "sql".to_string(),
            "statistics".to_string(),
            "pandas".to_string(),
            "excel".to_string(),
        ],
        years_experience: 3.0,
        sentiment: Sentiment::Happy,
        interests: Interests {
            data: 5,
            programming: 4,
            ..Interests::default()
        },
        ..Profile::default()
    }
}

fn design_profile() -> Profile {
    Profile {
        skills: vec![
            "figma".to_string(),
            "ui_design".to_string(),
            "ux_research".to_string(),
        ],
        years_experience: 1.0,
        interests: Interests {
            design: 5,
            research: 4,
            data: 1,
            programming: 1,
            ..Interests::default()
        },
        ..Profile::default()
    }
}

fn training_set() -> Vec<TrainingRecord> {
    let mut records = Vec::new();
    for _ in 0..25 {
        records.push(TrainingRecord {
            profile: data_profile(),
            labels: vec!["Data Analyst".to_string(), "Data Scientist".to_string()],
        });
        records.push(TrainingRecord {
            profile: design_profile(),
            labels: vec!["UX/UI Designer".to_string()],
        });
    }
    records
}

#[tokio::test]
async fn fallback_ranking_has_full_shape() {
    let engine = Engine::new(shipped_catalog(), None);
    let rec = engine.recommend(&data_profile()).await;

    assert!(!rec.ranked.is_empty() && rec.ranked.len() <= 5);
    let sum: f64 = rec.ranked.iter().map(|r| r.score).sum();
    assert!((sum - 1.0).abs() < 1e-6, "scores must sum to 1, got {sum}");
    assert!(!rec.activated_roles.is_empty());
    assert_eq!(rec.scorer_backend, "rules");
    assert_eq!(rec.market_trend.len(), rec.ranked.len());
    assert_eq!(rec.market_trend_values.len(), rec.ranked.len());
    for series in rec.market_trend_values.values() {
        assert_eq!(series.len(), 5);
    }
    assert!(rec.learning_plan.len() <= 4);
}

#[tokio::test]
async fn data_profile_ranks_data_roles_first() {
    let engine = Engine::new(shipped_catalog(), None);
    let rec = engine.recommend(&data_profile()).await;
    assert_eq!(rec.ranked[0].role, "Data Analyst");
}

#[tokio::test]
async fn design_profile_ranks_designer_first() {
    let engine = Engine::new(shipped_catalog(), None);
    let rec = engine.recommend(&design_profile()).await;
    assert_eq!(rec.ranked[0].role, "UX/UI Designer");
}

#[tokio::test]
async fn model_and_fallback_share_output_schema() {
    let artifact = train(&training_set(), TrainOptions::default()).expect("training must succeed");
    let with_model = Engine::new(shipped_catalog(), Some(Arc::new(LocalModel::new(artifact))));
    let without = Engine::new(shipped_catalog(), None);

    let a = with_model.recommend(&data_profile()).await;
    let b = without.recommend(&data_profile()).await;

    assert_eq!(a.scorer_backend, "model");
    assert_eq!(b.scorer_backend, "rules");
    for rec in [&a, &b] {
        assert!(!rec.ranked.is_empty() && rec.ranked.len() <= 5);
        let sum: f64 = rec.ranked.iter().map(|r| r.score).sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(!rec.activated_roles.is_empty());
    }
    // Same serialized shape either way.
    let a_json = serde_json::to_value(&a).unwrap();
    let b_json = serde_json::to_value(&b).unwrap();
    let keys = |v: &serde_json::Value| {
        let mut k: Vec<String> = v.as_object().unwrap().keys().cloned().collect();
        k.sort();
        k
    };
    assert_eq!(keys(&a_json), keys(&b_json));
}

#[tokio::test]
async fn recommendation_is_deterministic() {
    let engine = Engine::new(shipped_catalog(), None);
    let a = engine.recommend(&data_profile()).await;
    let b = engine.recommend(&data_profile()).await;
    let roles = |r: &compass_engine::engine::Recommendation| {
        r.ranked.iter().map(|x| x.role.clone()).collect::<Vec<_>>()
    };
    assert_eq!(roles(&a), roles(&b));
    assert_eq!(a.market_trend_values, b.market_trend_values);
}

#[tokio::test]
async fn skill_gap_feeds_learning_plan() {
    let engine = Engine::new(shipped_catalog(), None);
    let rec = engine.recommend(&data_profile()).await;
    // Plan steps come from the head of the missing list, in order.
    for (step, missing) in rec.learning_plan.iter().zip(&rec.skill_gap.missing) {
        assert_eq!(&step.skill, missing);
        assert!(!step.course.is_empty());
        assert!(step.weeks > 0);
    }
}

#[tokio::test]
async fn analyst_scenario_surfaces_data_roles() {
    // skills {python, sql, statistics}, UG, 2 years.
    let profile = Profile {
        skills: vec![
            "python".to_string(),
            "sql".to_string(),
            "statistics".to_string(),
        ],
        years_experience: 2.0,
        ..Profile::default()
    };
    let catalog = shipped_catalog();
    let engine = Engine::new(catalog, None);
    let rec = engine.recommend(&profile).await;

    let top: Vec<&str> = rec.ranked.iter().map(|r| r.role.as_str()).collect();
    assert!(top.contains(&"Data Analyst") || top.contains(&"Data Scientist"), "{top:?}");

    let sanitized = profile.sanitize();
    let catalog = shipped_catalog();
    assert!(compass_engine::ranker::skill_fit(&sanitized, &catalog, "Data Analyst") > 0.0);
    assert!(compass_engine::ranker::skill_fit(&sanitized, &catalog, "Data Scientist") > 0.0);
}

#[tokio::test]
async fn empty_profile_scenario_returns_five_roles() {
    let engine = Engine::new(shipped_catalog(), None);
    let rec = engine.recommend(&Profile::default()).await;
    assert_eq!(rec.ranked.len(), 5);
    // No skills at all: everything the top role requires is missing.
    assert_eq!(rec.skill_gap.missing, rec.skill_gap.required);
    assert!(rec.skill_gap.have.is_empty());
}

#[tokio::test]
async fn history_grows_per_request() {
    let engine = Engine::new(shipped_catalog(), None);
    assert!(engine.history().is_empty());
    engine.recommend(&data_profile()).await;
    engine.recommend(&design_profile()).await;
    assert_eq!(engine.history().len(), 2);
    let records = engine.history().all();
    assert_eq!(records[1].top_roles[0], "UX/UI Designer");
}
