//! Public statistics endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::ApiError;
use crate::state::AppState;

/// Aggregate landing-page statistics; unauthenticated.
pub async fn public_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.db.stats.public_stats().await?;
    Ok(Json(stats))
}
