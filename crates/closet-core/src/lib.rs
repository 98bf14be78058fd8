//! # closet-core
//!
//! Core types, traits, and abstractions for Digital Closet.
//!
//! This crate provides:
//! - Domain models (clothing items, outfits, calendar events, users,
//!   testimonials) and their request/response types
//! - Repository traits implemented by `closet-db`
//! - The shared `Error`/`Result` types
//! - The pure weather suggestion engine
//! - Input sanitization helpers and centralized default constants

pub mod defaults;
pub mod error;
pub mod models;
pub mod sanitize;
pub mod suggestions;
pub mod traits;

pub use error::{Error, Result};
pub use models::*;
pub use suggestions::{suggest, WardrobeSignal};
pub use traits::{
    CalendarRepository, ClothingRepository, OutfitRepository, TestimonialRepository,
    UserRepository,
};
