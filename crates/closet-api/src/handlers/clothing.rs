//! Clothing item endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use closet_core::defaults::{MAX_NAME_LEN, MAX_SHORT_LEN, MAX_TAGS, MAX_TAG_LEN, MAX_TEXT_LEN};
use closet_core::sanitize::{clean_opt, clean_tags, clean_text, clean_url};
use closet_core::{
    ClothingRepository, CreateClothingRequest, ListClothingRequest, UpdateClothingRequest,
};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::state::AppState;

fn sanitize_create(mut req: CreateClothingRequest) -> Result<CreateClothingRequest, ApiError> {
    req.name = clean_text(&req.name, MAX_NAME_LEN);
    if req.name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    req.color = clean_text(&req.color, MAX_SHORT_LEN);
    if req.color.is_empty() {
        return Err(ApiError::BadRequest("Color is required".to_string()));
    }
    req.brand = clean_opt(req.brand.as_deref(), MAX_SHORT_LEN);
    req.size = clean_opt(req.size.as_deref(), MAX_SHORT_LEN);
    req.image_url = clean_url(req.image_url.as_deref(), MAX_TEXT_LEN);
    req.tags = clean_tags(req.tags, MAX_TAG_LEN, MAX_TAGS);
    Ok(req)
}

fn sanitize_update(mut req: UpdateClothingRequest) -> Result<UpdateClothingRequest, ApiError> {
    if let Some(name) = &req.name {
        let name = clean_text(name, MAX_NAME_LEN);
        if name.is_empty() {
            return Err(ApiError::BadRequest("Name cannot be empty".to_string()));
        }
        req.name = Some(name);
    }
    if let Some(color) = &req.color {
        let color = clean_text(color, MAX_SHORT_LEN);
        if color.is_empty() {
            return Err(ApiError::BadRequest("Color cannot be empty".to_string()));
        }
        req.color = Some(color);
    }
    req.brand = clean_opt(req.brand.as_deref(), MAX_SHORT_LEN);
    req.size = clean_opt(req.size.as_deref(), MAX_SHORT_LEN);
    req.image_url = clean_url(req.image_url.as_deref(), MAX_TEXT_LEN);
    req.tags = req.tags.map(|t| clean_tags(t, MAX_TAG_LEN, MAX_TAGS));
    Ok(req)
}

pub async fn list_clothing(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(req): Query<ListClothingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.db.clothing.list(auth.user.id, req).await?;
    Ok(Json(page))
}

pub async fn create_clothing(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<CreateClothingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let req = sanitize_create(req)?;
    let item = state.db.clothing.insert(auth.user.id, req).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_clothing(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.db.clothing.fetch(auth.user.id, id).await?;
    Ok(Json(item))
}

pub async fn update_clothing(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateClothingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let req = sanitize_update(req)?;
    let item = state.db.clothing.update(auth.user.id, id, req).await?;
    Ok(Json(item))
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.db.clothing.toggle_favorite(auth.user.id, id).await?;
    Ok(Json(item))
}

pub async fn delete_clothing(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.clothing.delete(auth.user.id, id).await?;
    Ok(Json(serde_json::json!({
        "message": "Clothing item deleted successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use closet_core::Category;

    fn base_request() -> CreateClothingRequest {
        CreateClothingRequest {
            name: "Denim jacket".to_string(),
            category: Category::Outerwear,
            color: "blue".to_string(),
            brand: None,
            size: None,
            image_url: None,
            tags: vec![],
            seasons: vec![],
            occasions: vec![],
            is_favorite: false,
        }
    }

    #[test]
    fn test_sanitize_create_strips_markup() {
        let mut req = base_request();
        req.name = "<b>Denim</b> jacket".to_string();
        req.tags = vec!["<i>casual</i>".to_string()];

        let cleaned = sanitize_create(req).unwrap();
        assert_eq!(cleaned.name, "Denim jacket");
        assert_eq!(cleaned.tags, vec!["casual"]);
    }

    #[test]
    fn test_sanitize_create_rejects_empty_name() {
        let mut req = base_request();
        req.name = "<p></p>".to_string();
        assert!(matches!(
            sanitize_create(req),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_sanitize_update_keeps_absent_fields() {
        let req = UpdateClothingRequest::default();
        let cleaned = sanitize_update(req).unwrap();
        assert!(cleaned.name.is_none());
        assert!(cleaned.tags.is_none());
    }
}
