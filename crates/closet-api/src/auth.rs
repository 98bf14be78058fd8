//! Authentication extractors.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use closet_core::{User, UserRepository};

use crate::error::ApiError;
use crate::state::AppState;

/// Extractor for optionally-authenticated requests.
///
/// Validates a Bearer session token if one is presented; an absent or
/// invalid token yields `user: None` rather than a rejection.
#[derive(Debug, Clone)]
pub struct Auth {
    pub user: Option<User>,
    pub token: Option<String>,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                Some(header.trim_start_matches("Bearer ").trim().to_string())
            }
            _ => None,
        };

        let user = match &token {
            Some(token) => state.db.users.validate_session(token).await?,
            None => None,
        };

        Ok(Auth { user, token })
    }
}

/// Extractor that requires a valid, unexpired session.
///
/// Use this for endpoints that must have an authenticated user.
#[derive(Debug, Clone)]
pub struct RequireAuth {
    pub user: User,
    pub token: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = Auth::from_request_parts(parts, state).await?;

        match (auth.user, auth.token) {
            (Some(user), Some(token)) => Ok(RequireAuth { user, token }),
            _ => Err(ApiError::Unauthorized("Not authenticated".to_string())),
        }
    }
}
