//! Outfit endpoints.
//!
//! Every referenced clothing item must belong to the requesting user; an
//! outfit can never point into someone else's closet.

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use closet_core::defaults::{MAX_NAME_LEN, MAX_TAGS, MAX_TAG_LEN, MAX_TEXT_LEN};
use closet_core::sanitize::{clean_opt, clean_tags, clean_text, clean_url};
use closet_core::{
    ClothingRepository, CreateOutfitRequest, ListOutfitsRequest, OutfitRepository,
    UpdateOutfitRequest,
};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::state::AppState;

const ITEMS_NOT_FOUND: &str = "Some clothing items were not found or don't belong to you. \
     Please select valid items from your closet.";

fn validate_rating(rating: Option<i32>) -> Result<(), ApiError> {
    if let Some(r) = rating {
        if !(1..=5).contains(&r) {
            return Err(ApiError::BadRequest(
                "Rating must be between 1 and 5".to_string(),
            ));
        }
    }
    Ok(())
}

/// Verify that every id in `items` resolves to a clothing item owned by the
/// user. Duplicates are collapsed before the check.
async fn validate_items(
    state: &AppState,
    user_id: Uuid,
    items: &[Uuid],
) -> Result<(), ApiError> {
    let unique: HashSet<Uuid> = items.iter().copied().collect();
    let ids: Vec<Uuid> = unique.into_iter().collect();
    let found = state.db.clothing.fetch_many(user_id, &ids).await?;
    if found.len() != ids.len() {
        return Err(ApiError::BadRequest(ITEMS_NOT_FOUND.to_string()));
    }
    Ok(())
}

fn sanitize_create(mut req: CreateOutfitRequest) -> Result<CreateOutfitRequest, ApiError> {
    req.name = clean_text(&req.name, MAX_NAME_LEN);
    if req.name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    req.description = clean_opt(req.description.as_deref(), MAX_TEXT_LEN);
    req.image_url = clean_url(req.image_url.as_deref(), MAX_TEXT_LEN);
    req.tags = clean_tags(req.tags, MAX_TAG_LEN, MAX_TAGS);
    validate_rating(req.rating)?;
    Ok(req)
}

fn sanitize_update(mut req: UpdateOutfitRequest) -> Result<UpdateOutfitRequest, ApiError> {
    if let Some(name) = &req.name {
        let name = clean_text(name, MAX_NAME_LEN);
        if name.is_empty() {
            return Err(ApiError::BadRequest("Name cannot be empty".to_string()));
        }
        req.name = Some(name);
    }
    req.description = clean_opt(req.description.as_deref(), MAX_TEXT_LEN);
    req.image_url = clean_url(req.image_url.as_deref(), MAX_TEXT_LEN);
    req.tags = req.tags.map(|t| clean_tags(t, MAX_TAG_LEN, MAX_TAGS));
    validate_rating(req.rating)?;
    Ok(req)
}

pub async fn list_outfits(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(req): Query<ListOutfitsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.db.outfits.list(auth.user.id, req).await?;
    Ok(Json(page))
}

pub async fn create_outfit(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<CreateOutfitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let req = sanitize_create(req)?;
    validate_items(&state, auth.user.id, &req.items).await?;
    let outfit = state.db.outfits.insert(auth.user.id, req).await?;
    Ok((StatusCode::CREATED, Json(outfit)))
}

pub async fn get_outfit(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let outfit = state.db.outfits.fetch(auth.user.id, id).await?;
    Ok(Json(outfit))
}

pub async fn update_outfit(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOutfitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let req = sanitize_update(req)?;
    if let Some(items) = &req.items {
        validate_items(&state, auth.user.id, items).await?;
    }
    let outfit = state.db.outfits.update(auth.user.id, id, req).await?;
    Ok(Json(outfit))
}

pub async fn delete_outfit(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.outfits.delete(auth.user.id, id).await?;
    Ok(Json(serde_json::json!({
        "message": "Outfit deleted successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rating_bounds() {
        assert!(validate_rating(None).is_ok());
        assert!(validate_rating(Some(1)).is_ok());
        assert!(validate_rating(Some(5)).is_ok());
        assert!(validate_rating(Some(0)).is_err());
        assert!(validate_rating(Some(6)).is_err());
    }

    #[test]
    fn test_sanitize_create_requires_name() {
        let req = CreateOutfitRequest {
            name: "  ".to_string(),
            description: None,
            items: vec![],
            image_url: None,
            tags: vec![],
            seasons: vec![],
            occasions: vec![],
            rating: None,
            is_favorite: false,
        };
        assert!(matches!(
            sanitize_create(req),
            Err(ApiError::BadRequest(_))
        ));
    }
}
