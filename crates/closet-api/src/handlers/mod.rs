//! HTTP request handlers, grouped by resource.

pub mod auth;
pub mod calendar;
pub mod clothing;
pub mod notifications;
pub mod outfits;
pub mod stats;
pub mod testimonials;
pub mod users;
