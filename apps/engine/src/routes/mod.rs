pub mod health;
pub mod recommend;
pub mod sentiment;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/recommend", post(recommend::handle_recommend))
        .route(
            "/api/v1/recommendations/history",
            get(recommend::handle_history),
        )
        .route("/api/v1/sentiment", post(sentiment::handle_sentiment))
        .with_state(state)
}
