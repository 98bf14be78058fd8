//! Calendar event repository implementation.
//!
//! At most one event per user per date, enforced by the
//! `uq_calendar_event_user_date` unique constraint. Weather snapshots are
//! stored as JSONB alongside the event.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use closet_core::{
    clamp_page, new_v7, CalendarEvent, CalendarEventFull, CalendarRepository,
    CreateCalendarEventRequest, Error, ListCalendarEventsRequest, Occasion, Outfit, Page, Result,
    UpdateCalendarEventRequest, WeatherObservation,
};

use crate::outfits::PgOutfitRepository;

/// PostgreSQL implementation of CalendarRepository.
pub struct PgCalendarRepository {
    pool: Pool<Postgres>,
    outfits: PgOutfitRepository,
}

const EVENT_COLUMNS: &str =
    "id, user_id, outfit_id, event_date, occasion, location, notes, weather, \
     created_at, updated_at";

/// Message returned when a second event is scheduled on an occupied date.
/// The API layer maps the `uq_calendar_event_user_date` violation to a 409
/// carrying this text.
pub const DATE_TAKEN_MESSAGE: &str = "You already have an outfit scheduled for this date. \
     Please choose a different date or update the existing event.";

fn map_event_row(row: &sqlx::postgres::PgRow) -> CalendarEvent {
    let occasion: String = row.get("occasion");
    let weather: Option<serde_json::Value> = row.get("weather");

    CalendarEvent {
        id: row.get("id"),
        user_id: row.get("user_id"),
        outfit_id: row.get("outfit_id"),
        date: row.get("event_date"),
        occasion: Occasion::parse_str(&occasion).unwrap_or_default(),
        location: row.get("location"),
        notes: row.get("notes"),
        weather: weather.and_then(|v| serde_json::from_value::<WeatherObservation>(v).ok()),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn weather_json(weather: &Option<WeatherObservation>) -> Result<Option<serde_json::Value>> {
    weather
        .as_ref()
        .map(serde_json::to_value)
        .transpose()
        .map_err(Error::from)
}

impl PgCalendarRepository {
    /// Create a new PgCalendarRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        let outfits = PgOutfitRepository::new(pool.clone());
        Self { pool, outfits }
    }

    /// Resolve the outfit of a single event. A missing outfit is not an
    /// error: events keep a dangling reference if the outfit was deleted.
    async fn resolve_outfit(&self, user_id: Uuid, event: CalendarEvent) -> Result<CalendarEventFull> {
        use closet_core::OutfitRepository;

        let outfit = match self.outfits.fetch(user_id, event.outfit_id).await {
            Ok(outfit) => Some(outfit),
            Err(Error::OutfitNotFound(_)) => None,
            Err(e) => return Err(e),
        };
        Ok(CalendarEventFull { event, outfit })
    }
}

#[async_trait]
impl CalendarRepository for PgCalendarRepository {
    async fn insert(
        &self,
        user_id: Uuid,
        req: CreateCalendarEventRequest,
    ) -> Result<CalendarEvent> {
        let id = new_v7();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO calendar_event
                (id, user_id, outfit_id, event_date, occasion, location, notes, weather,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now(), now())
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(req.outfit_id)
        .bind(req.date)
        .bind(req.occasion.as_str())
        .bind(&req.location)
        .bind(&req.notes)
        .bind(weather_json(&req.weather)?)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_event_row(&row))
    }

    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<CalendarEventFull> {
        let row = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM calendar_event WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        let event = row
            .map(|r| map_event_row(&r))
            .ok_or(Error::CalendarEventNotFound(id))?;
        self.resolve_outfit(user_id, event).await
    }

    async fn fetch_by_date(&self, user_id: Uuid, date: NaiveDate) -> Result<CalendarEventFull> {
        let row = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM calendar_event WHERE user_id = $1 AND event_date = $2"
        ))
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        let event = row
            .map(|r| map_event_row(&r))
            .ok_or_else(|| Error::NotFound(format!("No outfit scheduled for {}", date)))?;
        self.resolve_outfit(user_id, event).await
    }

    async fn list(
        &self,
        user_id: Uuid,
        req: ListCalendarEventsRequest,
    ) -> Result<Page<CalendarEventFull>> {
        let (limit, offset) = clamp_page(req.limit, req.offset);

        let mut filters = String::new();
        let mut param_idx = 2;

        if req.start_date.is_some() {
            filters.push_str(&format!("AND event_date >= ${} ", param_idx));
            param_idx += 1;
        }
        if req.end_date.is_some() {
            filters.push_str(&format!("AND event_date <= ${} ", param_idx));
            param_idx += 1;
        }

        let count_sql =
            format!("SELECT COUNT(*) FROM calendar_event WHERE user_id = $1 {filters}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
        if let Some(d) = req.start_date {
            count_query = count_query.bind(d);
        }
        if let Some(d) = req.end_date {
            count_query = count_query.bind(d);
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let data_sql = format!(
            "SELECT {EVENT_COLUMNS} FROM calendar_event WHERE user_id = $1 {filters}\
             ORDER BY event_date ASC LIMIT ${} OFFSET ${}",
            param_idx,
            param_idx + 1
        );
        let mut data_query = sqlx::query(&data_sql).bind(user_id);
        if let Some(d) = req.start_date {
            data_query = data_query.bind(d);
        }
        if let Some(d) = req.end_date {
            data_query = data_query.bind(d);
        }
        let rows = data_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let events: Vec<CalendarEvent> = rows.iter().map(map_event_row).collect();
        let outfit_ids: Vec<Uuid> = events.iter().map(|e| e.outfit_id).collect();
        let mut outfits: std::collections::HashMap<Uuid, Outfit> =
            self.outfits.fetch_map(user_id, &outfit_ids).await?;

        let full = events
            .into_iter()
            .map(|event| {
                let outfit = outfits.remove(&event.outfit_id);
                CalendarEventFull { event, outfit }
            })
            .collect();
        Ok(Page::new(full, total, limit, offset))
    }

    async fn upcoming(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarEventFull>> {
        let rows = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM calendar_event \
             WHERE user_id = $1 AND event_date >= $2 AND event_date <= $3 \
             ORDER BY event_date ASC"
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let events: Vec<CalendarEvent> = rows.iter().map(map_event_row).collect();
        let outfit_ids: Vec<Uuid> = events.iter().map(|e| e.outfit_id).collect();
        let mut outfits = self.outfits.fetch_map(user_id, &outfit_ids).await?;

        Ok(events
            .into_iter()
            .map(|event| {
                let outfit = outfits.remove(&event.outfit_id);
                CalendarEventFull { event, outfit }
            })
            .collect())
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        req: UpdateCalendarEventRequest,
    ) -> Result<CalendarEvent> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE calendar_event SET
                outfit_id = COALESCE($3, outfit_id),
                event_date = COALESCE($4, event_date),
                occasion = COALESCE($5, occasion),
                location = COALESCE($6, location),
                notes = COALESCE($7, notes),
                weather = COALESCE($8, weather),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(req.outfit_id)
        .bind(req.date)
        .bind(req.occasion.map(|o| o.as_str()))
        .bind(&req.location)
        .bind(&req.notes)
        .bind(weather_json(&req.weather)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|r| map_event_row(&r))
            .ok_or(Error::CalendarEventNotFound(id))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM calendar_event WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::CalendarEventNotFound(id));
        }
        Ok(())
    }
}
