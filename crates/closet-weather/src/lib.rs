//! # closet-weather
//!
//! OpenWeatherMap client for Digital Closet.
//!
//! Resolves a free-text location to a [`closet_core::WeatherObservation`],
//! with a 5-minute in-process cache keyed by location and a fallback retry
//! across location-format variants. Weather failures are reported, never
//! fatal: callers skip the suggestion engine when no observation is
//! available.

pub mod cache;
pub mod client;
pub mod types;

pub use cache::WeatherCache;
pub use client::{WeatherClient, DEFAULT_WEATHER_API_URL};
