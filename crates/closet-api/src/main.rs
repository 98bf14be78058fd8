//! Digital Closet API server.
//!
//! Wardrobe cataloguing, outfit composition, calendar scheduling with
//! weather-aware styling suggestions, and Google sign-in.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use uuid::Uuid;

use closet_db::Database;
use closet_weather::WeatherClient;

mod auth;
mod error;
mod handlers;
mod services;
mod state;

use services::{AuthCodeCache, GoogleOAuth};
use state::AppState;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically — useful for
/// log correlation and debugging production incidents.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// CORS
// =============================================================================

fn parse_allowed_origins() -> Vec<HeaderValue> {
    let origins_str = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://localhost:3000".to_string());

    if origins_str.trim().is_empty() {
        // Default origins
        return vec![
            HeaderValue::from_static("http://localhost:5173"),
            HeaderValue::from_static("http://localhost:3000"),
        ];
    }

    origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

// =============================================================================
// HEALTH
// =============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "closet-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "closet_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "closet_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("closet-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            } else {
                layer = layer.with_ansi(false); // no ANSI in files
            }
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Get configuration from environment
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/closet".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "5000".to_string())
        .parse()
        .unwrap_or(5000);
    let frontend_url = std::env::var("FRONTEND_URL")
        .unwrap_or_else(|_| "http://localhost:5173".to_string())
        .trim_end_matches('/')
        .to_string();

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    // Weather is optional: without a key, scheduling still works and the
    // suggestions endpoint reports the service as unconfigured.
    let weather = match WeatherClient::from_env() {
        Ok(client) => {
            info!("Weather client initialized");
            let cache = client.cache();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(std::time::Duration::from_secs(
                    closet_core::defaults::WEATHER_CACHE_TTL_SECS,
                ));
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    cache.sweep().await;
                }
            });
            Some(client)
        }
        Err(e) => {
            warn!(error = %e, "Weather client disabled");
            None
        }
    };

    let oauth = match GoogleOAuth::from_env() {
        Ok(client) => {
            info!("Google OAuth client initialized");
            Some(client)
        }
        Err(e) => {
            warn!(error = %e, "Google sign-in disabled");
            None
        }
    };

    // Login handoff codes and their periodic sweeper
    let auth_codes = AuthCodeCache::new();
    let _sweeper_handle = auth_codes.spawn_sweeper();

    let state = AppState {
        db: Arc::new(db),
        weather,
        oauth,
        auth_codes,
        frontend_url,
    };

    let app = Router::new()
        // System
        .route("/health", get(health_check))
        // Auth
        .route("/api/auth/google", get(handlers::auth::google_login))
        .route(
            "/api/auth/google/callback",
            get(handlers::auth::google_callback),
        )
        .route(
            "/api/auth/exchange-code",
            post(handlers::auth::exchange_code),
        )
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/logout", post(handlers::auth::logout))
        // Clothing
        .route(
            "/api/clothing",
            get(handlers::clothing::list_clothing).post(handlers::clothing::create_clothing),
        )
        .route(
            "/api/clothing/:id",
            get(handlers::clothing::get_clothing)
                .put(handlers::clothing::update_clothing)
                .delete(handlers::clothing::delete_clothing),
        )
        .route(
            "/api/clothing/:id/favorite",
            patch(handlers::clothing::toggle_favorite),
        )
        // Outfits
        .route(
            "/api/outfits",
            get(handlers::outfits::list_outfits).post(handlers::outfits::create_outfit),
        )
        .route(
            "/api/outfits/:id",
            get(handlers::outfits::get_outfit)
                .put(handlers::outfits::update_outfit)
                .delete(handlers::outfits::delete_outfit),
        )
        // Calendar
        .route(
            "/api/calendar",
            get(handlers::calendar::list_calendar_events)
                .post(handlers::calendar::create_calendar_event),
        )
        .route(
            "/api/calendar/suggestions",
            post(handlers::calendar::get_style_suggestions),
        )
        .route(
            "/api/calendar/date/:date",
            get(handlers::calendar::get_calendar_event_by_date),
        )
        .route(
            "/api/calendar/:id",
            get(handlers::calendar::get_calendar_event)
                .put(handlers::calendar::update_calendar_event)
                .delete(handlers::calendar::delete_calendar_event),
        )
        // Users
        .route(
            "/api/users/profile",
            get(handlers::users::get_profile).put(handlers::users::update_profile),
        )
        // Notifications
        .route(
            "/api/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/api/notifications/mark-all-read",
            post(handlers::notifications::mark_all_read),
        )
        .route(
            "/api/notifications/:id/read",
            post(handlers::notifications::mark_read),
        )
        // Testimonials
        .route(
            "/api/testimonials/public",
            get(handlers::testimonials::public_testimonials),
        )
        .route(
            "/api/testimonials",
            post(handlers::testimonials::create_testimonial),
        )
        // Stats
        .route("/api/stats/public", get(handlers::stats::public_stats))
        // Middleware
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer({
            let allowed_origins = parse_allowed_origins();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600))
        })
        // JSON bodies only; image uploads live in object storage, not here
        .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024)) // 2 MB
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
