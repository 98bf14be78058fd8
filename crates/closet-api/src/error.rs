//! API error type and HTTP status mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use closet_db::DATE_TAKEN_MESSAGE;

/// API error type with proper HTTP status codes.
#[derive(Debug)]
pub enum ApiError {
    Database(closet_core::Error),
    Internal(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl From<closet_core::Error> for ApiError {
    fn from(err: closet_core::Error) -> Self {
        match &err {
            closet_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            closet_core::Error::ClothingNotFound(_)
            | closet_core::Error::OutfitNotFound(_)
            | closet_core::Error::CalendarEventNotFound(_) => ApiError::NotFound(err.to_string()),
            closet_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            closet_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg.clone()),
            closet_core::Error::Forbidden(msg) => ApiError::Forbidden(msg.clone()),
            closet_core::Error::Weather(msg) => ApiError::BadRequest(msg.clone()),
            closet_core::Error::Database(sqlx_err) => {
                let msg = sqlx_err.to_string();
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    // Provide user-friendly error messages for known constraints
                    let friendly_msg = if msg.contains("uq_calendar_event_user_date") {
                        DATE_TAKEN_MESSAGE.to_string()
                    } else if msg.contains("app_user_email_key") {
                        "An account with this email already exists".to_string()
                    } else {
                        msg
                    };
                    return ApiError::Conflict(friendly_msg);
                }
                if msg.contains("foreign key") {
                    return ApiError::BadRequest(msg);
                }
                ApiError::Database(err)
            }
            _ => ApiError::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_variants_map_to_404() {
        let err: ApiError = closet_core::Error::ClothingNotFound(uuid::Uuid::nil()).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = closet_core::Error::OutfitNotFound(uuid::Uuid::nil()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_invalid_input_maps_to_bad_request() {
        let err: ApiError =
            closet_core::Error::InvalidInput("rating out of range".to_string()).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_weather_maps_to_bad_request() {
        let err: ApiError = closet_core::Error::Weather("city not found".to_string()).into();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn test_calendar_date_collision_maps_to_409() {
        // Postgres reports a unique violation; the repository passes it
        // through untranslated so this is the only place it becomes a 409.
        let db_err = sqlx::Error::Protocol(
            "duplicate key value violates unique constraint \
             \"uq_calendar_event_user_date\""
                .to_string(),
        );
        let err: ApiError = closet_core::Error::Database(db_err).into();
        match err {
            ApiError::Conflict(msg) => assert_eq!(msg, DATE_TAKEN_MESSAGE),
            other => panic!("expected Conflict, got {other:?}"),
        }
    }
}
