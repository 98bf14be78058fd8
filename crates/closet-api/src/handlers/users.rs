//! User profile endpoints.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use closet_core::defaults::{MAX_NAME_LEN, MAX_TEXT_LEN};
use closet_core::sanitize::{clean_text, clean_url};
use closet_core::{UpdateProfileRequest, UserRepository};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn get_profile(auth: RequireAuth) -> impl IntoResponse {
    Json(auth.user)
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(mut req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(name) = &req.name {
        let name = clean_text(name, MAX_NAME_LEN);
        if name.is_empty() {
            return Err(ApiError::BadRequest("Name cannot be empty".to_string()));
        }
        req.name = Some(name);
    }
    req.avatar = clean_url(req.avatar.as_deref(), MAX_TEXT_LEN);

    let user = state.db.users.update_profile(auth.user.id, req).await?;
    Ok(Json(user))
}
