//! Login flow endpoints.
//!
//! Google is the only identity provider. The callback never exposes the
//! session token in a URL: it issues a single-use handoff code and the
//! frontend exchanges it over POST (see `services::auth_codes`).

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::Json;
use serde::Deserialize;
use tracing::{error, info, warn};

use closet_core::UserRepository;

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeCodeRequest {
    pub code: Option<String>,
}

/// Send the browser to Google's consent screen.
pub async fn google_login(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let Some(oauth) = &state.oauth else {
        return Err(ApiError::Internal(
            "Google sign-in is not configured".to_string(),
        ));
    };
    Ok(Redirect::temporary(&oauth.authorize_url()))
}

/// Provider redirect target. Always redirects back to the frontend; failures
/// land on the login page with an error flag rather than an API error body.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> impl IntoResponse {
    let failure = format!("{}/login?error=auth_failed", state.frontend_url);

    let Some(oauth) = &state.oauth else {
        error!("OAuth callback hit but Google sign-in is not configured");
        return Redirect::temporary(&failure);
    };
    if let Some(provider_error) = &query.error {
        warn!(error = %provider_error, "Google sign-in denied by provider");
        return Redirect::temporary(&failure);
    }
    let Some(code) = &query.code else {
        warn!("OAuth callback missing authorization code");
        return Redirect::temporary(&failure);
    };

    let profile = match oauth.fetch_profile(code).await {
        Ok(profile) => profile,
        Err(e) => {
            error!(error = %e, "Failed to resolve Google profile");
            return Redirect::temporary(&failure);
        }
    };

    let user = match state.db.users.find_or_create(profile).await {
        Ok(user) => user,
        Err(e) => {
            error!(error = %e, "Failed to find or create user");
            return Redirect::temporary(&failure);
        }
    };

    let token = match state.db.users.issue_session(user.id).await {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, user_id = %user.id, "Failed to issue session");
            return Redirect::temporary(&failure);
        }
    };

    let handoff = state.auth_codes.issue(token).await;
    info!(user_id = %user.id, "Login handoff issued");
    Redirect::temporary(&format!(
        "{}/auth/callback?code={}",
        state.frontend_url, handoff
    ))
}

/// Exchange a handoff code for the session token, single use.
pub async fn exchange_code(
    State(state): State<AppState>,
    Json(req): Json<ExchangeCodeRequest>,
) -> impl IntoResponse {
    let Some(code) = req.code.as_deref().map(str::trim).filter(|c| !c.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Code is required" })),
        );
    };

    match state.auth_codes.consume(code).await {
        Some(token) => {
            info!("Login handoff code exchanged");
            (StatusCode::OK, Json(serde_json::json!({ "token": token })))
        }
        None => {
            warn!("Login handoff exchange failed");
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "Invalid or expired code",
                    "hint": "This code may have already been used. If you are already \
                             logged in, please refresh the page.",
                })),
            )
        }
    }
}

/// The authenticated user's account.
pub async fn me(auth: RequireAuth) -> impl IntoResponse {
    Json(serde_json::json!({ "user": auth.user }))
}

/// Revoke the presented session. Idempotent.
pub async fn logout(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    state.db.users.revoke_session(&auth.token).await?;
    info!(user_id = %auth.user.id, "Session revoked");
    Ok(Json(serde_json::json!({
        "message": "Logged out successfully"
    })))
}
