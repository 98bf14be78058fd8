//! Calendar endpoints.
//!
//! Scheduling an outfit with a location captures a weather snapshot and
//! returns styling suggestions alongside the event. Weather failures never
//! block scheduling; the event is simply stored without a snapshot.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use closet_core::defaults::{MAX_LOCATION_LEN, MAX_TEXT_LEN};
use closet_core::sanitize::clean_opt;
use closet_core::{
    suggest, CalendarRepository, ClothingItem, CreateCalendarEventRequest, Error,
    ListCalendarEventsRequest, Occasion, Outfit, OutfitRepository, UpdateCalendarEventRequest,
    WeatherObservation,
};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::state::AppState;

const OUTFIT_NOT_FOUND: &str =
    "Outfit not found. Please select a valid outfit from your collection.";

/// Resolve the outfit an event points at, owned by the requesting user.
async fn require_outfit(
    state: &AppState,
    user_id: Uuid,
    outfit_id: Uuid,
) -> Result<Outfit, ApiError> {
    match state.db.outfits.fetch(user_id, outfit_id).await {
        Ok(outfit) => Ok(outfit),
        Err(Error::OutfitNotFound(_)) => Err(ApiError::NotFound(OUTFIT_NOT_FOUND.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Fetch a weather snapshot for the event's location, if possible.
///
/// Lookup failures are logged and swallowed; the caller proceeds without
/// a snapshot.
async fn snapshot_weather(state: &AppState, location: &str) -> Option<WeatherObservation> {
    let client = state.weather.as_ref()?;
    match client.fetch_by_location(location).await {
        Ok(observation) => Some(observation),
        Err(e) => {
            warn!(location = %location, error = %e, "Weather snapshot failed");
            None
        }
    }
}

pub async fn list_calendar_events(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(req): Query<ListCalendarEventsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let (Some(start), Some(end)) = (req.start_date, req.end_date) {
        if end < start {
            return Err(ApiError::BadRequest(
                "End date must be after start date.".to_string(),
            ));
        }
    }
    let page = state.db.calendar.list(auth.user.id, req).await?;
    Ok(Json(page))
}

pub async fn get_calendar_event(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state.db.calendar.fetch(auth.user.id, id).await?;
    Ok(Json(event))
}

pub async fn get_calendar_event_by_date(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(date): Path<NaiveDate>,
) -> Result<impl IntoResponse, ApiError> {
    match state.db.calendar.fetch_by_date(auth.user.id, date).await {
        Ok(event) => Ok(Json(event)),
        Err(Error::NotFound(_)) => Err(ApiError::NotFound(
            "No outfit scheduled for this date.".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn create_calendar_event(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(mut req): Json<CreateCalendarEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.location = clean_opt(req.location.as_deref(), MAX_LOCATION_LEN);
    req.notes = clean_opt(req.notes.as_deref(), MAX_TEXT_LEN);

    let outfit = require_outfit(&state, auth.user.id, req.outfit_id).await?;

    let mut style_suggestions: Vec<String> = Vec::new();
    if let Some(location) = &req.location {
        if let Some(weather) = snapshot_weather(&state, location).await {
            style_suggestions = suggest(&weather, req.occasion, &outfit.items);
            req.weather = Some(weather);
        }
    }

    let event = state.db.calendar.insert(auth.user.id, req).await?;
    let full = state.db.calendar.fetch(auth.user.id, event.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "event": full,
            "style_suggestions": style_suggestions,
        })),
    ))
}

pub async fn update_calendar_event(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(mut req): Json<UpdateCalendarEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.location = clean_opt(req.location.as_deref(), MAX_LOCATION_LEN);
    req.notes = clean_opt(req.notes.as_deref(), MAX_TEXT_LEN);

    if let Some(outfit_id) = req.outfit_id {
        require_outfit(&state, auth.user.id, outfit_id).await?;
    }

    // A new location refreshes the snapshot; otherwise the stored one stands.
    if let Some(location) = &req.location {
        req.weather = snapshot_weather(&state, location).await;
    }

    let event = state.db.calendar.update(auth.user.id, id, req).await?;
    let full = state.db.calendar.fetch(auth.user.id, event.id).await?;
    Ok(Json(serde_json::json!({ "event": full })))
}

pub async fn delete_calendar_event(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.calendar.delete(auth.user.id, id).await?;
    Ok(Json(serde_json::json!({
        "message": "Calendar event deleted successfully"
    })))
}

// =============================================================================
// STYLE SUGGESTIONS
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SuggestionsRequest {
    pub location: Option<String>,
    pub occasion: Option<Occasion>,
    pub outfit_id: Option<Uuid>,
}

/// On-demand styling suggestions for a location, optionally tuned to the
/// contents of one of the user's outfits.
pub async fn get_style_suggestions(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<SuggestionsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let location = match req.location.as_deref().map(str::trim) {
        Some(l) if !l.is_empty() => l.to_string(),
        _ => {
            return Err(ApiError::BadRequest(
                "Location is required to get weather-based style suggestions.".to_string(),
            ))
        }
    };

    let Some(client) = &state.weather else {
        return Err(ApiError::Internal(
            "Weather service is not configured. Please contact support.".to_string(),
        ));
    };

    let weather = match client.fetch_by_location(&location).await {
        Ok(observation) => observation,
        Err(e) => {
            warn!(location = %location, error = %e, "Weather lookup failed");
            return Err(ApiError::BadRequest(format!(
                "Unable to fetch weather data for \"{location}\". Please try:\n\
                 - Adding country code (e.g., \"Manila, PH\" or \"New York, US\")\n\
                 - Using full city name (e.g., \"Manila, Philippines\")\n\
                 - Checking if the city name is spelled correctly\n\n\
                 Note: Weather suggestions are optional and you can still schedule outfits \
                 without them."
            )));
        }
    };

    // Outfit context sharpens the suggestions; an invalid id just means no
    // context, matching how the event endpoints tolerate a deleted outfit.
    let items: Vec<ClothingItem> = match req.outfit_id {
        Some(outfit_id) => match state.db.outfits.fetch(auth.user.id, outfit_id).await {
            Ok(outfit) => outfit.items,
            Err(Error::OutfitNotFound(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        },
        None => Vec::new(),
    };

    let occasion = req.occasion.unwrap_or_default();
    let suggestions = suggest(&weather, occasion, &items);

    Ok(Json(serde_json::json!({
        "weather": weather,
        "suggestions": suggestions,
        "occasion": occasion,
    })))
}
