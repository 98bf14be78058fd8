//! Testimonial endpoints.
//!
//! Submissions require a session; the public feed does not. New testimonials
//! enter unapproved and only show up once moderated.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use closet_core::defaults::{MAX_NAME_LEN, MAX_SHORT_LEN, MAX_TEXT_LEN};
use closet_core::sanitize::{clean_opt, clean_text};
use closet_core::{CreateTestimonialRequest, TestimonialRepository};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// Number of testimonials shown on the landing page.
const PUBLIC_FEED_LIMIT: i64 = 10;

pub async fn public_testimonials(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let feed = state.db.testimonials.public_feed(PUBLIC_FEED_LIMIT).await?;
    Ok(Json(feed))
}

pub async fn create_testimonial(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(mut req): Json<CreateTestimonialRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.name = clean_text(&req.name, MAX_NAME_LEN);
    if req.name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    req.role = clean_opt(req.role.as_deref(), MAX_SHORT_LEN);
    req.comment = clean_text(&req.comment, MAX_TEXT_LEN);
    if req.comment.is_empty() {
        return Err(ApiError::BadRequest("Comment is required".to_string()));
    }

    let testimonial = state.db.testimonials.insert(auth.user.id, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Thank you for your feedback! Your testimonial is pending review.",
            "testimonial": testimonial,
        })),
    ))
}
