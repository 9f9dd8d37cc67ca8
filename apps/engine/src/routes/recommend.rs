//! Recommendation endpoints: score a profile, list past recommendations.

use axum::extract::State;
use axum::Json;

use crate::engine::Recommendation;
use crate::errors::AppError;
use crate::history::HistoryRecord;
use crate::profile::Profile;
use crate::state::AppState;

/// POST /api/v1/recommend
/// Scores one profile. The body is deserialized leniently — malformed
/// individual fields fall back to defaults — so only structurally invalid
/// JSON is rejected.
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(profile): Json<Profile>,
) -> Result<Json<Recommendation>, AppError> {
    let recommendation = state.engine.recommend(&profile).await;
    Ok(Json(recommendation))
}

/// GET /api/v1/recommendations/history
/// Recommendations made since the process started, oldest first.
pub async fn handle_history(State(state): State<AppState>) -> Json<Vec<HistoryRecord>> {
    Json(state.engine.history().all())
}
