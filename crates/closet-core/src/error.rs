//! Error types for Digital Closet.

use thiserror::Error;

/// Result type alias using Digital Closet's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Digital Closet operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Clothing item not found
    #[error("Clothing item not found: {0}")]
    ClothingNotFound(uuid::Uuid),

    /// Outfit not found
    #[error("Outfit not found: {0}")]
    OutfitNotFound(uuid::Uuid),

    /// Calendar event not found
    #[error("Calendar event not found: {0}")]
    CalendarEventNotFound(uuid::Uuid),

    /// Weather lookup failed
    #[error("Weather error: {0}")]
    Weather(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Authentication/authorization failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (authenticated but not authorized)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_clothing_not_found() {
        let id = Uuid::nil();
        let err = Error::ClothingNotFound(id);
        assert_eq!(err.to_string(), format!("Clothing item not found: {}", id));
    }

    #[test]
    fn test_error_display_outfit_not_found() {
        let id = Uuid::new_v4();
        let err = Error::OutfitNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_display_weather() {
        let err = Error::Weather("location not found".to_string());
        assert_eq!(err.to_string(), "Weather error: location not found");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("rating out of range".to_string());
        assert_eq!(err.to_string(), "Invalid input: rating out of range");
    }

    #[test]
    fn test_error_display_unauthorized() {
        let err = Error::Unauthorized("invalid token".to_string());
        assert_eq!(err.to_string(), "Unauthorized: invalid token");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
