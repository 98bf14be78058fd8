//! One-time login handoff codes.
//!
//! After the OAuth provider redirects back to us, the session token cannot be
//! put in the redirect URL itself (it would land in browser history and
//! referrer logs). Instead the callback stores the token under a short-lived
//! single-use code and redirects with only the code; the frontend exchanges
//! it for the token over POST.
//!
//! Codes are 256 bits of CSPRNG output, hex encoded. A consumed, expired, or
//! never-issued code all fail identically, so a caller cannot probe which of
//! the three happened.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rand::RngCore;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use closet_core::defaults::{HANDOFF_CODE_TTL_SECS, HANDOFF_SWEEP_INTERVAL_SECS};

/// In-process store of pending login handoffs, cheap to clone.
#[derive(Clone)]
pub struct AuthCodeCache {
    inner: Arc<Mutex<HashMap<String, PendingHandoff>>>,
    ttl: Duration,
}

struct PendingHandoff {
    token: String,
    expires_at: Instant,
}

impl AuthCodeCache {
    /// Create a cache with the standard 5-minute code TTL.
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(HANDOFF_CODE_TTL_SECS))
    }

    /// Create a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Generate a fresh handoff code: 32 CSPRNG bytes, hex encoded.
    fn generate_code() -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Store a session token under a new single-use code and return the code.
    pub async fn issue(&self, token: String) -> String {
        let code = Self::generate_code();
        let mut map = self.inner.lock().await;
        map.insert(
            code.clone(),
            PendingHandoff {
                token,
                expires_at: Instant::now() + self.ttl,
            },
        );
        debug!(pending = map.len(), "Issued login handoff code");
        code
    }

    /// Redeem a code for its session token.
    ///
    /// The entry is removed under the lock before the token is returned, so
    /// exactly one caller can ever win a given code. An expired entry is
    /// removed and rejected; the caller sees the same `None` as for a code
    /// that never existed.
    pub async fn consume(&self, code: &str) -> Option<String> {
        let mut map = self.inner.lock().await;
        let entry = map.remove(code)?;
        if Instant::now() >= entry.expires_at {
            debug!("Rejected expired login handoff code");
            return None;
        }
        Some(entry.token)
    }

    /// Drop expired entries. Expired codes are already rejected on consume;
    /// this bounds memory for codes that are never redeemed.
    pub async fn sweep(&self) {
        let now = Instant::now();
        let mut map = self.inner.lock().await;
        let before = map.len();
        map.retain(|_, entry| entry.expires_at > now);
        let removed = before - map.len();
        if removed > 0 {
            debug!(removed, "Swept expired login handoff codes");
        }
    }

    /// Number of entries currently held (including expired-but-unswept).
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }

    /// Spawn the periodic sweeper task.
    pub fn spawn_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let cache = self.clone();
        info!(
            interval_secs = HANDOFF_SWEEP_INTERVAL_SECS,
            "Starting login handoff sweeper"
        );
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(Duration::from_secs(HANDOFF_SWEEP_INTERVAL_SECS));
            ticker.tick().await; // first tick completes immediately
            loop {
                ticker.tick().await;
                cache.sweep().await;
            }
        })
    }
}

impl Default for AuthCodeCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_format() {
        let code = AuthCodeCache::generate_code();
        assert_eq!(code.len(), 64);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(code, AuthCodeCache::generate_code());
    }

    #[tokio::test(start_paused = true)]
    async fn test_issue_then_consume() {
        let cache = AuthCodeCache::new();
        let code = cache.issue("dc_tok_abc".to_string()).await;

        assert_eq!(cache.consume(&code).await.as_deref(), Some("dc_tok_abc"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_code_is_single_use() {
        let cache = AuthCodeCache::new();
        let code = cache.issue("dc_tok_abc".to_string()).await;

        assert!(cache.consume(&code).await.is_some());
        assert!(cache.consume(&code).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_code_rejected() {
        let cache = AuthCodeCache::new();
        assert!(cache.consume("deadbeef").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_code_valid_just_before_expiry() {
        let cache = AuthCodeCache::new();
        let code = cache.issue("dc_tok_abc".to_string()).await;

        tokio::time::advance(Duration::from_secs(HANDOFF_CODE_TTL_SECS - 1)).await;
        assert!(cache.consume(&code).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_code_rejected_at_expiry() {
        let cache = AuthCodeCache::new();
        let code = cache.issue("dc_tok_abc".to_string()).await;

        tokio::time::advance(Duration::from_secs(HANDOFF_CODE_TTL_SECS)).await;
        assert!(cache.consume(&code).await.is_none());
        // Expired entry was removed on the failed consume.
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_code_stays_dead_after_reissue() {
        // A fresh code issued later must not resurrect an expired one.
        let cache = AuthCodeCache::new();
        let old = cache.issue("dc_tok_old".to_string()).await;

        tokio::time::advance(Duration::from_secs(HANDOFF_CODE_TTL_SECS)).await;
        let fresh = cache.issue("dc_tok_new".to_string()).await;

        assert!(cache.consume(&old).await.is_none());
        assert_eq!(cache.consume(&fresh).await.as_deref(), Some("dc_tok_new"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_expired() {
        let cache = AuthCodeCache::new();
        let _old = cache.issue("dc_tok_old".to_string()).await;

        tokio::time::advance(Duration::from_secs(HANDOFF_CODE_TTL_SECS - 10)).await;
        let fresh = cache.issue("dc_tok_new".to_string()).await;

        tokio::time::advance(Duration::from_secs(10)).await;
        cache.sweep().await;

        assert_eq!(cache.len().await, 1);
        assert!(cache.consume(&fresh).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_consume_has_one_winner() {
        let cache = AuthCodeCache::new();
        let code = cache.issue("dc_tok_abc".to_string()).await;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let code = code.clone();
                tokio::spawn(async move { cache.consume(&code).await })
            })
            .collect();

        let mut winners = 0;
        for task in tasks {
            if task.await.unwrap().is_some() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
