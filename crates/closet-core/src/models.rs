//! Domain models for Digital Closet.
//!
//! Record types map 1:1 onto database rows; request types carry the fields a
//! client may supply. Closed enumerations (category, season, occasion) are
//! stored as lowercase text and round-trip through `as_str`/`parse_str`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;
use crate::{Error, Result};

/// Generate a time-ordered UUIDv7 for new records.
pub fn new_v7() -> Uuid {
    Uuid::now_v7()
}

// =============================================================================
// CLOSED ENUMERATIONS
// =============================================================================

/// Clothing item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Top,
    Bottom,
    Dress,
    Outerwear,
    Shoes,
    Accessories,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Top => "top",
            Category::Bottom => "bottom",
            Category::Dress => "dress",
            Category::Outerwear => "outerwear",
            Category::Shoes => "shoes",
            Category::Accessories => "accessories",
            Category::Other => "other",
        }
    }

    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "top" => Ok(Category::Top),
            "bottom" => Ok(Category::Bottom),
            "dress" => Ok(Category::Dress),
            "outerwear" => Ok(Category::Outerwear),
            "shoes" => Ok(Category::Shoes),
            "accessories" => Ok(Category::Accessories),
            "other" => Ok(Category::Other),
            other => Err(Error::InvalidInput(format!("Unknown category: {}", other))),
        }
    }
}

/// Season tag for items and outfits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
            Season::Winter => "winter",
        }
    }

    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "fall" => Ok(Season::Fall),
            "winter" => Ok(Season::Winter),
            other => Err(Error::InvalidInput(format!("Unknown season: {}", other))),
        }
    }
}

/// Social context of an outfit or scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Occasion {
    #[default]
    Casual,
    Formal,
    Sporty,
    Party,
    Work,
    Other,
}

impl Occasion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Occasion::Casual => "casual",
            Occasion::Formal => "formal",
            Occasion::Sporty => "sporty",
            Occasion::Party => "party",
            Occasion::Work => "work",
            Occasion::Other => "other",
        }
    }

    /// Parse an occasion tag. "workout" is accepted as an alias for sporty.
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "casual" => Ok(Occasion::Casual),
            "formal" => Ok(Occasion::Formal),
            "sporty" | "workout" => Ok(Occasion::Sporty),
            "party" => Ok(Occasion::Party),
            "work" => Ok(Occasion::Work),
            "other" => Ok(Occasion::Other),
            other => Err(Error::InvalidInput(format!("Unknown occasion: {}", other))),
        }
    }
}

// =============================================================================
// CLOTHING
// =============================================================================

/// A catalogued clothing item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClothingItem {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub category: Category,
    pub color: String,
    pub brand: Option<String>,
    pub size: Option<String>,
    /// URL of the item image (object storage is external; only the URL is kept).
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub seasons: Vec<Season>,
    pub occasions: Vec<Occasion>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a clothing item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClothingRequest {
    pub name: String,
    pub category: Category,
    pub color: String,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default)]
    pub occasions: Vec<Occasion>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Partial update for a clothing item; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClothingRequest {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub color: Option<String>,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub image_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub seasons: Option<Vec<Season>>,
    pub occasions: Option<Vec<Occasion>>,
    pub is_favorite: Option<bool>,
}

/// Filters for listing clothing items.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListClothingRequest {
    pub category: Option<Category>,
    pub favorite: Option<bool>,
    /// Case-insensitive substring match over name, brand, and tags.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// =============================================================================
// OUTFITS
// =============================================================================

/// A composed outfit with its resolved clothing items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outfit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub items: Vec<ClothingItem>,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
    pub seasons: Vec<Season>,
    pub occasions: Vec<Occasion>,
    pub rating: Option<i32>,
    pub is_favorite: bool,
    pub worn_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create an outfit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOutfitRequest {
    pub name: String,
    pub description: Option<String>,
    /// Clothing item ids; all must belong to the requesting user.
    pub items: Vec<Uuid>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub seasons: Vec<Season>,
    #[serde(default)]
    pub occasions: Vec<Occasion>,
    pub rating: Option<i32>,
    #[serde(default)]
    pub is_favorite: bool,
}

/// Partial update for an outfit; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOutfitRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub items: Option<Vec<Uuid>>,
    pub image_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub seasons: Option<Vec<Season>>,
    pub occasions: Option<Vec<Occasion>>,
    pub rating: Option<i32>,
    pub is_favorite: Option<bool>,
    pub worn_date: Option<NaiveDate>,
}

/// Filters for listing outfits.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListOutfitsRequest {
    pub occasion: Option<Occasion>,
    pub season: Option<Season>,
    pub favorite: Option<bool>,
    /// Case-insensitive substring match over name, description, and tags.
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// =============================================================================
// WEATHER
// =============================================================================

/// A weather observation for a location, as returned by the weather
/// collaborator and snapshotted onto calendar events.
///
/// Every field is optional; the suggestion engine applies documented defaults
/// for anything missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct WeatherObservation {
    /// Rounded temperature in Celsius.
    pub temperature: Option<i32>,
    /// Short classifier, e.g. "Rain", "Clear", "Clouds".
    pub condition: Option<String>,
    /// Longer human-readable description.
    pub description: Option<String>,
    /// Relative humidity, 0-100.
    pub humidity: Option<i32>,
    /// Wind speed in m/s.
    pub wind_speed: Option<f64>,
    /// Provider icon code.
    pub icon: Option<String>,
}

// =============================================================================
// CALENDAR
// =============================================================================

/// An outfit scheduled on a calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub outfit_id: Uuid,
    pub date: NaiveDate,
    pub occasion: Occasion,
    pub location: Option<String>,
    pub notes: Option<String>,
    /// Weather snapshot taken when the event was created or last updated
    /// with a location.
    pub weather: Option<WeatherObservation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A calendar event with its outfit resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventFull {
    #[serde(flatten)]
    pub event: CalendarEvent,
    pub outfit: Option<Outfit>,
}

/// Request to schedule an outfit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCalendarEventRequest {
    pub outfit_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub occasion: Occasion,
    pub location: Option<String>,
    pub notes: Option<String>,
    /// Filled in by the server when a location is given; not client-settable.
    #[serde(skip)]
    pub weather: Option<WeatherObservation>,
}

/// Partial update for a calendar event; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCalendarEventRequest {
    pub outfit_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub occasion: Option<Occasion>,
    pub location: Option<String>,
    pub notes: Option<String>,
    #[serde(skip)]
    pub weather: Option<WeatherObservation>,
}

/// Filters for listing calendar events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListCalendarEventsRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// =============================================================================
// USERS & SESSIONS
// =============================================================================

/// UI theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Per-user preferences, stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default = "default_notifications_enabled")]
    pub notifications_enabled: bool,
    #[serde(default = "default_notification_time")]
    pub notification_time: String,
    #[serde(default)]
    pub theme: Theme,
}

fn default_notifications_enabled() -> bool {
    true
}

fn default_notification_time() -> String {
    "09:00".to_string()
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            notification_time: default_notification_time(),
            theme: Theme::System,
        }
    }
}

/// An application user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub provider: String,
    pub onboarding_completed: bool,
    pub preferences: UserPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity asserted by the login provider, used for find-or-create.
#[derive(Debug, Clone)]
pub struct ProviderProfile {
    pub google_id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

/// Partial preferences update; absent fields keep their stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferencesPatch {
    pub notifications_enabled: Option<bool>,
    pub notification_time: Option<String>,
    pub theme: Option<Theme>,
}

impl PreferencesPatch {
    /// Merge this patch over existing preferences.
    pub fn apply(&self, base: &UserPreferences) -> UserPreferences {
        UserPreferences {
            notifications_enabled: self
                .notifications_enabled
                .unwrap_or(base.notifications_enabled),
            notification_time: self
                .notification_time
                .clone()
                .unwrap_or_else(|| base.notification_time.clone()),
            theme: self.theme.unwrap_or(base.theme),
        }
    }
}

/// Profile update request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub onboarding_completed: Option<bool>,
    pub preferences: Option<PreferencesPatch>,
}

// =============================================================================
// TESTIMONIALS
// =============================================================================

/// A user testimonial shown on the landing page once approved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub role: String,
    pub rating: i32,
    pub comment: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to submit a testimonial.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTestimonialRequest {
    pub name: String,
    pub role: Option<String>,
    pub rating: i32,
    pub comment: String,
}

/// Public testimonial shape (no ids, joined avatar).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicTestimonial {
    pub name: String,
    pub role: String,
    pub rating: i32,
    pub comment: String,
    pub avatar: Option<String>,
}

/// Public testimonial feed with aggregate rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestimonialFeed {
    pub testimonials: Vec<PublicTestimonial>,
    pub average_rating: f64,
    pub total_testimonials: i64,
}

// =============================================================================
// STATS
// =============================================================================

/// Public aggregate statistics (landing page).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicStats {
    pub total_users: i64,
    pub total_outfits: i64,
    pub total_clothing_items: i64,
    pub total_planned_outfits: i64,
    pub avg_outfits_per_user: i64,
    /// Users who joined in the last 30 days.
    pub recent_users: i64,
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Standardized pagination metadata for list responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Total number of items matching the query (across all pages).
    pub total: i64,
    /// Maximum number of items per page.
    pub limit: i64,
    /// Number of items skipped.
    pub offset: i64,
    /// True if more items are available after this page.
    pub has_more: bool,
}

/// Standardized list response wrapper with pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Page<T> {
    /// Create a paginated response; `has_more` is derived.
    pub fn new(data: Vec<T>, total: i64, limit: i64, offset: i64) -> Self {
        let has_more = offset + (data.len() as i64) < total;
        Self {
            data,
            pagination: PaginationMeta {
                total,
                limit,
                offset,
                has_more,
            },
        }
    }
}

/// Clamp requested limit/offset to sane bounds.
pub fn clamp_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit
        .unwrap_or(defaults::PAGE_LIMIT)
        .clamp(1, defaults::PAGE_LIMIT_MAX);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occasion_parse_aliases() {
        assert_eq!(Occasion::parse_str("sporty").unwrap(), Occasion::Sporty);
        assert_eq!(Occasion::parse_str("workout").unwrap(), Occasion::Sporty);
        assert_eq!(Occasion::parse_str("FORMAL").unwrap(), Occasion::Formal);
        assert!(Occasion::parse_str("brunch").is_err());
    }

    #[test]
    fn test_category_round_trip() {
        for c in [
            Category::Top,
            Category::Bottom,
            Category::Dress,
            Category::Outerwear,
            Category::Shoes,
            Category::Accessories,
            Category::Other,
        ] {
            assert_eq!(Category::parse_str(c.as_str()).unwrap(), c);
        }
    }

    #[test]
    fn test_preferences_patch_merges_over_base() {
        let base = UserPreferences::default();
        let patch = PreferencesPatch {
            theme: Some(Theme::Dark),
            ..Default::default()
        };
        let merged = patch.apply(&base);
        assert_eq!(merged.theme, Theme::Dark);
        assert!(merged.notifications_enabled);
        assert_eq!(merged.notification_time, "09:00");
    }

    #[test]
    fn test_preferences_deserialize_fills_defaults() {
        let prefs: UserPreferences = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs, UserPreferences::default());
    }

    #[test]
    fn test_clamp_page_bounds() {
        assert_eq!(clamp_page(None, None), (20, 0));
        assert_eq!(clamp_page(Some(500), Some(-3)), (100, 0));
        assert_eq!(clamp_page(Some(0), Some(40)), (1, 40));
    }

    #[test]
    fn test_page_has_more() {
        let page = Page::new(vec![1, 2, 3], 10, 3, 0);
        assert!(page.pagination.has_more);
        let page = Page::new(vec![1], 1, 20, 0);
        assert!(!page.pagination.has_more);
    }

    #[test]
    fn test_weather_observation_deserialize_partial() {
        let obs: WeatherObservation =
            serde_json::from_str(r#"{"temperature": 2, "condition": "Snow"}"#).unwrap();
        assert_eq!(obs.temperature, Some(2));
        assert_eq!(obs.condition.as_deref(), Some("Snow"));
        assert_eq!(obs.humidity, None);
    }
}
