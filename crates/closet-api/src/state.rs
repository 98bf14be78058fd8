//! Shared application state.

use std::sync::Arc;

use closet_db::Database;
use closet_weather::WeatherClient;

use crate::services::{AuthCodeCache, GoogleOAuth};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    /// Weather client; `None` when `WEATHER_API_KEY` is not configured.
    /// Weather-dependent features degrade instead of blocking startup.
    pub weather: Option<WeatherClient>,
    /// Google OAuth client; `None` when provider credentials are missing.
    pub oauth: Option<GoogleOAuth>,
    /// Pending login handoff codes.
    pub auth_codes: AuthCodeCache,
    /// Frontend base URL for post-login redirects.
    pub frontend_url: String,
}
