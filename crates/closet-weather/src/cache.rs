//! In-process TTL cache for weather observations.
//!
//! Keyed by the queried location string (normalized); entries expire after a
//! fixed TTL so a burst of scheduling activity for the same city hits the
//! upstream API once per window.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use closet_core::WeatherObservation;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// TTL cache for weather observations, cheap to clone.
#[derive(Clone)]
pub struct WeatherCache {
    inner: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
}

struct CacheEntry {
    observation: WeatherObservation,
    expires_at: Instant,
}

impl WeatherCache {
    /// Create a cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Normalize a location into a cache key.
    pub fn cache_key(location: &str) -> String {
        location.trim().to_lowercase()
    }

    /// Get a cached observation, if present and unexpired.
    pub async fn get(&self, location: &str) -> Option<WeatherObservation> {
        let key = Self::cache_key(location);
        let map = self.inner.read().await;
        let entry = map.get(&key)?;
        if Instant::now() >= entry.expires_at {
            return None;
        }
        debug!(location = %key, "Weather cache hit");
        Some(entry.observation.clone())
    }

    /// Store an observation under the location key.
    pub async fn set(&self, location: &str, observation: WeatherObservation) {
        let key = Self::cache_key(location);
        let mut map = self.inner.write().await;
        map.insert(
            key,
            CacheEntry {
                observation,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop expired entries. A stale entry is never served even without a
    /// sweep; this only bounds memory.
    pub async fn sweep(&self) {
        let now = Instant::now();
        let mut map = self.inner.write().await;
        let before = map.len();
        map.retain(|_, entry| entry.expires_at > now);
        let removed = before - map.len();
        if removed > 0 {
            debug!(removed, "Swept expired weather cache entries");
        }
    }

    /// Number of entries currently held (including expired-but-unswept).
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(temp: i32) -> WeatherObservation {
        WeatherObservation {
            temperature: Some(temp),
            ..Default::default()
        }
    }

    #[test]
    fn test_cache_key_normalization() {
        assert_eq!(WeatherCache::cache_key("  Manila "), "manila");
        assert_eq!(WeatherCache::cache_key("Quezon City"), "quezon city");
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_before_expiry() {
        let cache = WeatherCache::new(Duration::from_secs(300));
        cache.set("Manila", obs(31)).await;

        tokio::time::advance(Duration::from_secs(299)).await;
        let hit = cache.get("manila").await;
        assert_eq!(hit.unwrap().temperature, Some(31));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_not_served() {
        let cache = WeatherCache::new(Duration::from_secs(300));
        cache.set("Manila", obs(31)).await;

        tokio::time::advance(Duration::from_secs(300)).await;
        assert!(cache.get("Manila").await.is_none());
        // Entry is stale but unswept; still rejected on read.
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_expired() {
        let cache = WeatherCache::new(Duration::from_secs(300));
        cache.set("Manila", obs(31)).await;
        tokio::time::advance(Duration::from_secs(200)).await;
        cache.set("Cebu", obs(29)).await;

        tokio::time::advance(Duration::from_secs(100)).await;
        cache.sweep().await;
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("Cebu").await.is_some());
    }
}
