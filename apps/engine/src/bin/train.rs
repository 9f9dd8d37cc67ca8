//! Offline training CLI.
//!
//! `train fit` fits the one-vs-rest model from a labeled JSON/JSONL
//! dataset and writes the artifact the serve binary loads. `train synth`
//! generates a seeded synthetic dataset from the role catalog, for
//! bootstrapping before real labeled data exists.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use compass_engine::catalog::RoleCatalog;
use compass_engine::model::train::{train, TrainOptions, TrainingRecord};
use compass_engine::profile::{Education, Profile};

#[derive(Parser)]
#[command(name = "train", about = "Train the role recommendation model")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit the model from a labeled dataset and write the artifact.
    Fit {
        /// Labeled dataset: a JSON array or JSONL of profile rows with a
        /// `labels` field.
        #[arg(long)]
        data: PathBuf,
        /// Where to write the model artifact.
        #[arg(long, default_value = "configs/model.json")]
        out: PathBuf,
        #[arg(long, default_value_t = 0.2)]
        test_size: f64,
        #[arg(long, default_value_t = 300)]
        epochs: usize,
        #[arg(long, default_value_t = 0.1)]
        learning_rate: f64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Generate a seeded synthetic labeled dataset from the role catalog.
    Synth {
        #[arg(long, default_value = "configs/role_catalog.json")]
        catalog: PathBuf,
        #[arg(long, default_value = "configs/skill_courses.json")]
        courses: PathBuf,
        #[arg(long, default_value_t = 2500)]
        rows: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Output JSONL path.
        #[arg(long, default_value = "data/synthetic_profiles.jsonl")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match Cli::parse().command {
        Command::Fit {
            data,
            out,
            test_size,
            epochs,
            learning_rate,
            seed,
        } => {
            let records = load_records(&data)?;
            info!(rows = records.len(), "dataset loaded");
            let opts = TrainOptions {
                test_size,
                epochs,
                learning_rate,
                seed,
                ..TrainOptions::default()
            };
            let artifact = train(&records, opts)?;
            info!(
                roles = artifact.roles.len(),
                hamming_loss = artifact.metrics.hamming_loss,
                precision_at_3 = artifact.metrics.precision_at_3,
                recall_at_3 = artifact.metrics.recall_at_3,
                "training complete"
            );
            artifact.save(&out)?;
            info!(path = %out.display(), "artifact written");
        }
        Command::Synth {
            catalog,
            courses,
            rows,
            seed,
            out,
        } => {
            let catalog = RoleCatalog::load(&catalog, &courses)?;
            let records = synthesize(&catalog, rows, seed);
            write_jsonl(&out, &records)?;
            info!(rows = records.len(), path = %out.display(), "synthetic dataset written");
        }
    }
    Ok(())
}

/// Accepts either a JSON array or JSONL, so both hand-curated and
/// generated datasets load with the same flag.
fn load_records(path: &PathBuf) -> Result<Vec<TrainingRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read dataset {}", path.display()))?;
    if raw.trim_start().starts_with('[') {
        serde_json::from_str(&raw).context("invalid JSON dataset")
    } else {
        raw.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).context("invalid JSONL row"))
            .collect()
    }
}

fn write_jsonl(path: &PathBuf, records: &[TrainingRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let mut buf = String::new();
    for r in records {
        buf.push_str(&serde_json::to_string(r)?);
        buf.push('\n');
    }
    std::fs::write(path, buf).with_context(|| format!("cannot write {}", path.display()))
}

/// Samples 3..=8 skills per row from the catalog's skill universe, labels
/// the row with the best-overlapping role (uniform noise breaks ties so
/// weakly-matched rows vary), and fills the rest of the profile randomly.
fn synthesize(catalog: &RoleCatalog, rows: usize, seed: u64) -> Vec<TrainingRecord> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut skill_pool: Vec<String> = Vec::new();
    for entry in catalog.roles() {
        for s in &entry.required_skills {
            if !skill_pool.contains(s) {
                skill_pool.push(s.clone());
            }
        }
    }

    let mut records = Vec::with_capacity(rows);
    for _ in 0..rows {
        let count = rng.gen_range(3..=8).min(skill_pool.len().max(1));
        let mut skills = skill_pool.clone();
        skills.shuffle(&mut rng);
        skills.truncate(count);

        let label = catalog
            .roles()
            .iter()
            .map(|entry| {
                let overlap = entry
                    .required_skills
                    .iter()
                    .filter(|s| skills.contains(s))
                    .count() as f64;
                (entry.role.clone(), overlap + rng.gen_range(0.0..1.5))
            })
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(role, _)| role);

        let profile = Profile {
            age: rng.gen_range(18..=45),
            education: sample_education(&mut rng),
            years_experience: rng.gen_range(0..=15) as f64,
            risk_taking: rng.gen_range(1..=5),
            motivation_score: rng.gen_range(30..=100),
            skills,
            ..Profile::default()
        };

        records.push(TrainingRecord {
            profile,
            labels: label.into_iter().collect(),
        });
    }
    records
}

/// Education split: 25% bootcamp, 45% undergrad, 20% postgrad, 10% PhD.
fn sample_education(rng: &mut StdRng) -> Education {
    match rng.gen_range(0.0..1.0) {
        x if x < 0.25 => Education::Bootcamp,
        x if x < 0.70 => Education::UG,
        x if x < 0.90 => Education::PG,
        _ => Education::PhD,
    }
}
