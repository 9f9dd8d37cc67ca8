use std::sync::Arc;

use crate::config::Config;
use crate::engine::Engine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub config: Config,
}
