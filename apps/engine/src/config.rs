use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables. Everything
/// has a default; nothing is required, because the engine degrades rather
/// than refusing to start.
#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_path: PathBuf,
    pub courses_path: PathBuf,
    pub model_path: PathBuf,
    /// Remote prediction service base URL. When set it takes precedence
    /// over the local artifact.
    pub model_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            catalog_path: env_path("CATALOG_PATH", "configs/role_catalog.json"),
            courses_path: env_path("COURSES_PATH", "configs/skill_courses.json"),
            model_path: env_path("MODEL_PATH", "configs/model.json"),
            model_url: std::env::var("MODEL_URL").ok().filter(|s| !s.is_empty()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .into()
}
