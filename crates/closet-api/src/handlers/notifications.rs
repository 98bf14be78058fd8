//! Outfit reminder notifications.
//!
//! The feed is derived, not stored: it is the user's calendar events over the
//! next week, minus the ones they have dismissed. Dismissals are tracked as
//! read event ids on the account.

use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use closet_core::{CalendarEventFull, CalendarRepository, Occasion, UserRepository};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::state::AppState;

/// How far ahead the reminder feed looks, in days.
const REMINDER_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Serialize)]
struct Notification {
    id: Uuid,
    #[serde(rename = "type")]
    kind: &'static str,
    title: &'static str,
    message: String,
    date: NaiveDate,
    outfit_id: Option<Uuid>,
    outfit_name: Option<String>,
    outfit_image: Option<String>,
    location: Option<String>,
    occasion: Occasion,
    days_until: i64,
}

fn reminder_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today, today + Duration::days(REMINDER_WINDOW_DAYS))
}

fn reminder_message(outfit_name: Option<&str>, days_until: i64) -> String {
    let name = outfit_name.unwrap_or("an outfit");
    match days_until {
        0 => format!("You have \"{}\" scheduled today", name),
        1 => format!("You have \"{}\" scheduled in 1 day", name),
        n => format!("You have \"{}\" scheduled in {} days", name, n),
    }
}

fn to_notification(full: CalendarEventFull, today: NaiveDate) -> Notification {
    let days_until = (full.event.date - today).num_days();
    let outfit_name = full.outfit.as_ref().map(|o| o.name.clone());

    Notification {
        id: full.event.id,
        kind: "outfit_reminder",
        title: "Upcoming Outfit",
        message: reminder_message(outfit_name.as_deref(), days_until),
        date: full.event.date,
        outfit_id: full.outfit.as_ref().map(|o| o.id),
        outfit_name,
        outfit_image: full.outfit.and_then(|o| o.image_url),
        location: full.event.location,
        occasion: full.event.occasion,
        days_until,
    }
}

/// Upcoming outfit reminders, honoring the notifications preference.
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    if !auth.user.preferences.notifications_enabled {
        return Ok(Json(serde_json::json!({ "notifications": [] })));
    }

    let today = Utc::now().date_naive();
    let (from, to) = reminder_window(today);
    let events = state.db.calendar.upcoming(auth.user.id, from, to).await?;
    let read: HashSet<Uuid> = state
        .db
        .users
        .read_notifications(auth.user.id)
        .await?
        .into_iter()
        .collect();

    let notifications: Vec<Notification> = events
        .into_iter()
        .filter(|full| !read.contains(&full.event.id))
        .map(|full| to_notification(full, today))
        .collect();

    Ok(Json(serde_json::json!({ "notifications": notifications })))
}

/// Dismiss every reminder currently in the window.
pub async fn mark_all_read(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let today = Utc::now().date_naive();
    let (from, to) = reminder_window(today);
    let events = state.db.calendar.upcoming(auth.user.id, from, to).await?;
    let ids: Vec<Uuid> = events.iter().map(|full| full.event.id).collect();

    state
        .db
        .users
        .mark_notifications_read(auth.user.id, &ids)
        .await?;
    Ok(Json(serde_json::json!({
        "message": "All notifications marked as read"
    })))
}

/// Dismiss a single reminder.
pub async fn mark_read(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .db
        .users
        .mark_notifications_read(auth.user.id, &[id])
        .await?;
    Ok(Json(serde_json::json!({
        "message": "Notification marked as read"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reminder_message_day_forms() {
        assert_eq!(
            reminder_message(Some("Rainy day fit"), 0),
            "You have \"Rainy day fit\" scheduled today"
        );
        assert_eq!(
            reminder_message(Some("Rainy day fit"), 1),
            "You have \"Rainy day fit\" scheduled in 1 day"
        );
        assert_eq!(
            reminder_message(Some("Rainy day fit"), 3),
            "You have \"Rainy day fit\" scheduled in 3 days"
        );
    }

    #[test]
    fn test_reminder_message_unnamed_outfit() {
        assert_eq!(
            reminder_message(None, 2),
            "You have \"an outfit\" scheduled in 2 days"
        );
    }

    #[test]
    fn test_reminder_window_is_one_week_inclusive() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let (from, to) = reminder_window(today);
        assert_eq!(from, today);
        assert_eq!(to, NaiveDate::from_ymd_opt(2026, 9, 5).unwrap());
    }
}
