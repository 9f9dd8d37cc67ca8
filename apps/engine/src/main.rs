use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use compass_engine::catalog::RoleCatalog;
use compass_engine::config::Config;
use compass_engine::engine::Engine;
use compass_engine::model::remote::RemoteModel;
use compass_engine::model::{LocalModel, ModelArtifact, ProbabilitySource};
use compass_engine::routes::build_router;
use compass_engine::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Compass engine v{}", env!("CARGO_PKG_VERSION"));

    let catalog = RoleCatalog::load(&config.catalog_path, &config.courses_path)?;

    // Model backend: remote URL wins, then the local artifact. A missing
    // or broken model is a degraded start, not a failed one.
    let model: Option<Arc<dyn ProbabilitySource>> = match &config.model_url {
        Some(url) => match RemoteModel::new(url.clone()) {
            Ok(remote) => {
                info!(%url, "using remote probability model");
                Some(Arc::new(remote))
            }
            Err(e) => {
                warn!(%url, error = %e, "remote model unusable, serving rule-based only");
                None
            }
        },
        None => match ModelArtifact::load(&config.model_path) {
            Ok(artifact) => {
                info!(
                    roles = artifact.roles.len(),
                    trained_at = %artifact.trained_at,
                    "local model artifact loaded"
                );
                Some(Arc::new(LocalModel::new(artifact)))
            }
            Err(e) => {
                warn!(
                    path = %config.model_path.display(),
                    error = %e,
                    "no usable model artifact, serving rule-based only"
                );
                None
            }
        },
    };

    let engine = Arc::new(Engine::new(catalog, model));
    let state = AppState {
        engine,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
