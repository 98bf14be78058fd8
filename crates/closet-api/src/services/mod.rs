//! Supporting services for the API server.

pub mod auth_codes;
pub mod google;

pub use auth_codes::AuthCodeCache;
pub use google::GoogleOAuth;
