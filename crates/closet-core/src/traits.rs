//! Repository traits implemented by the persistence layer.
//!
//! Every operation is scoped to a `user_id`; a row owned by another user is
//! indistinguishable from a missing row (`NotFound`), so ids never leak
//! across accounts.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{
    CalendarEvent, CalendarEventFull, ClothingItem, CreateCalendarEventRequest,
    CreateClothingRequest, CreateOutfitRequest, CreateTestimonialRequest, ListCalendarEventsRequest,
    ListClothingRequest, ListOutfitsRequest, Outfit, Page, ProviderProfile, Testimonial,
    TestimonialFeed, UpdateCalendarEventRequest, UpdateClothingRequest, UpdateOutfitRequest,
    UpdateProfileRequest, User,
};
use crate::Result;

/// Clothing item CRUD and filtered listing.
#[async_trait]
pub trait ClothingRepository {
    async fn insert(&self, user_id: Uuid, req: CreateClothingRequest) -> Result<ClothingItem>;
    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<ClothingItem>;
    /// Fetch a set of items by id; silently omits ids that don't exist or
    /// belong to someone else (callers compare lengths to validate).
    async fn fetch_many(&self, user_id: Uuid, ids: &[Uuid]) -> Result<Vec<ClothingItem>>;
    async fn list(&self, user_id: Uuid, req: ListClothingRequest) -> Result<Page<ClothingItem>>;
    async fn update(&self, user_id: Uuid, id: Uuid, req: UpdateClothingRequest)
        -> Result<ClothingItem>;
    /// Flip the favorite flag in place and return the updated item.
    async fn toggle_favorite(&self, user_id: Uuid, id: Uuid) -> Result<ClothingItem>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()>;
}

/// Outfit CRUD and filtered listing; items are resolved on reads.
#[async_trait]
pub trait OutfitRepository {
    async fn insert(&self, user_id: Uuid, req: CreateOutfitRequest) -> Result<Outfit>;
    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<Outfit>;
    async fn list(&self, user_id: Uuid, req: ListOutfitsRequest) -> Result<Page<Outfit>>;
    async fn update(&self, user_id: Uuid, id: Uuid, req: UpdateOutfitRequest) -> Result<Outfit>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()>;
}

/// Calendar event CRUD; at most one event per user per date.
#[async_trait]
pub trait CalendarRepository {
    async fn insert(&self, user_id: Uuid, req: CreateCalendarEventRequest)
        -> Result<CalendarEvent>;
    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<CalendarEventFull>;
    async fn fetch_by_date(&self, user_id: Uuid, date: NaiveDate) -> Result<CalendarEventFull>;
    async fn list(
        &self,
        user_id: Uuid,
        req: ListCalendarEventsRequest,
    ) -> Result<Page<CalendarEventFull>>;
    /// All events in the inclusive date window, earliest first; feeds the
    /// notifications endpoint.
    async fn upcoming(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CalendarEventFull>>;
    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        req: UpdateCalendarEventRequest,
    ) -> Result<CalendarEvent>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()>;
}

/// Testimonial submission and the public feed.
#[async_trait]
pub trait TestimonialRepository {
    async fn insert(&self, user_id: Uuid, req: CreateTestimonialRequest) -> Result<Testimonial>;
    /// Approved testimonials, newest first, with the aggregate rating.
    async fn public_feed(&self, limit: i64) -> Result<TestimonialFeed>;
}

/// User accounts and bearer-token sessions.
#[async_trait]
pub trait UserRepository {
    /// Look a user up by provider identity, creating the account on first
    /// login and refreshing name/avatar on subsequent ones.
    async fn find_or_create(&self, profile: ProviderProfile) -> Result<User>;
    async fn fetch(&self, id: Uuid) -> Result<User>;
    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> Result<User>;
    /// Issue a session token for a user; returns the plaintext token.
    /// Only its hash is stored.
    async fn issue_session(&self, user_id: Uuid) -> Result<String>;
    /// Resolve a presented bearer token to its user, if valid and unexpired.
    async fn validate_session(&self, token: &str) -> Result<Option<User>>;
    /// Revoke the session behind a presented token. Idempotent.
    async fn revoke_session(&self, token: &str) -> Result<()>;
    /// Calendar event ids the user has dismissed notifications for.
    async fn read_notifications(&self, user_id: Uuid) -> Result<Vec<Uuid>>;
    /// Record event ids as read. Already-read ids are kept, not duplicated.
    async fn mark_notifications_read(&self, user_id: Uuid, event_ids: &[Uuid]) -> Result<()>;
}
