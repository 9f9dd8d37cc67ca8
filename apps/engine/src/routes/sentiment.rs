//! Free-text sentiment endpoint, used by the intake form to pre-fill the
//! profile's sentiment field from a short "how do you feel about work"
//! answer.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::sentiment::{analyze_text, TextSentiment};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SentimentRequest {
    pub text: String,
}

/// POST /api/v1/sentiment
pub async fn handle_sentiment(
    State(_state): State<AppState>,
    Json(request): Json<SentimentRequest>,
) -> Result<Json<TextSentiment>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text must not be empty".to_string()));
    }
    Ok(Json(analyze_text(&request.text)))
}
