//! Centralized default constants for Digital Closet.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates should reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for list endpoints.
pub const PAGE_LIMIT: i64 = 20;

/// Maximum page size for list endpoints.
pub const PAGE_LIMIT_MAX: i64 = 100;

// =============================================================================
// AUTH
// =============================================================================

/// Lifetime of a login handoff code before it expires (seconds).
pub const HANDOFF_CODE_TTL_SECS: u64 = 300;

/// Interval between handoff cache sweeps (seconds).
pub const HANDOFF_SWEEP_INTERVAL_SECS: u64 = 300;

/// Session token lifetime (days).
pub const SESSION_TOKEN_TTL_DAYS: i64 = 30;

/// Prefix for session tokens, so unknown token formats are rejected cheaply.
pub const SESSION_TOKEN_PREFIX: &str = "dc_tok_";

// =============================================================================
// WEATHER
// =============================================================================

/// TTL for cached weather observations (seconds).
pub const WEATHER_CACHE_TTL_SECS: u64 = 300;

/// Timeout for weather API requests (seconds).
pub const WEATHER_REQUEST_TIMEOUT_SECS: u64 = 5;

/// Assumed temperature (Celsius) when an observation has none.
pub const DEFAULT_TEMPERATURE_C: i32 = 20;

/// Assumed condition classifier when an observation has none.
pub const DEFAULT_CONDITION: &str = "clear";

/// Assumed relative humidity when an observation has none.
pub const DEFAULT_HUMIDITY: i32 = 50;

// =============================================================================
// INPUT LIMITS
// =============================================================================

/// Maximum length for item/outfit names.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length for free-text descriptions and notes.
pub const MAX_TEXT_LEN: usize = 500;

/// Maximum length for short fields (brand, color).
pub const MAX_SHORT_LEN: usize = 50;

/// Maximum length for a single tag.
pub const MAX_TAG_LEN: usize = 30;

/// Maximum number of tags per item or outfit.
pub const MAX_TAGS: usize = 10;

/// Maximum length for a location string.
pub const MAX_LOCATION_LEN: usize = 100;
