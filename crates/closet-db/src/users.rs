//! User account and session repository implementation.
//!
//! Sessions are opaque bearer tokens with a recognizable prefix. Only the
//! SHA256 hash of a token is stored; a leaked table cannot be replayed.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use closet_core::defaults::{SESSION_TOKEN_PREFIX, SESSION_TOKEN_TTL_DAYS};
use closet_core::{
    new_v7, Error, ProviderProfile, Result, UpdateProfileRequest, User, UserPreferences,
    UserRepository,
};

/// PostgreSQL implementation of UserRepository.
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

const USER_COLUMNS: &str = "id, google_id, name, email, avatar, provider, \
     onboarding_completed, preferences, created_at, updated_at";

const USER_COLUMNS_QUALIFIED: &str = "u.id, u.google_id, u.name, u.email, u.avatar, \
     u.provider, u.onboarding_completed, u.preferences, u.created_at, u.updated_at";

/// Length of the random portion of a session token, in characters.
const SESSION_SECRET_LEN: usize = 48;

fn map_user_row(row: &sqlx::postgres::PgRow) -> User {
    let preferences: serde_json::Value = row.get("preferences");

    User {
        id: row.get("id"),
        google_id: row.get("google_id"),
        name: row.get("name"),
        email: row.get("email"),
        avatar: row.get("avatar"),
        provider: row.get("provider"),
        onboarding_completed: row.get("onboarding_completed"),
        preferences: serde_json::from_value::<UserPreferences>(preferences).unwrap_or_default(),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Generate a cryptographically secure random string.
    fn generate_secret(length: usize) -> String {
        const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect()
    }

    /// Hash a secret using SHA256.
    fn hash_secret(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_or_create(&self, profile: ProviderProfile) -> Result<User> {
        // Returning user: refresh name and avatar from the provider.
        let existing = sqlx::query(&format!(
            r#"
            UPDATE app_user
            SET name = $2, avatar = COALESCE($3, avatar), updated_at = now()
            WHERE google_id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&profile.google_id)
        .bind(&profile.name)
        .bind(&profile.avatar)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        if let Some(row) = existing {
            return Ok(map_user_row(&row));
        }

        // First login. An account created under the same email before the
        // provider id was known gets linked instead of duplicated.
        let id = new_v7();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO app_user
                (id, google_id, name, email, avatar, provider, onboarding_completed,
                 preferences, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 'google', false, $6, now(), now())
            ON CONFLICT (email) DO UPDATE SET
                google_id = EXCLUDED.google_id,
                name = EXCLUDED.name,
                avatar = COALESCE(EXCLUDED.avatar, app_user.avatar),
                updated_at = now()
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&profile.google_id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.avatar)
        .bind(serde_json::to_value(UserPreferences::default())?)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_user_row(&row))
    }

    async fn fetch(&self, id: Uuid) -> Result<User> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM app_user WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.map(|r| map_user_row(&r))
            .ok_or_else(|| Error::NotFound(format!("User not found: {}", id)))
    }

    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> Result<User> {
        let current = self.fetch(id).await?;
        let preferences = match &req.preferences {
            Some(patch) => patch.apply(&current.preferences),
            None => current.preferences,
        };

        let row = sqlx::query(&format!(
            r#"
            UPDATE app_user SET
                name = COALESCE($2, name),
                avatar = COALESCE($3, avatar),
                onboarding_completed = COALESCE($4, onboarding_completed),
                preferences = $5,
                updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&req.name)
        .bind(&req.avatar)
        .bind(req.onboarding_completed)
        .bind(serde_json::to_value(preferences)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|r| map_user_row(&r))
            .ok_or_else(|| Error::NotFound(format!("User not found: {}", id)))
    }

    async fn issue_session(&self, user_id: Uuid) -> Result<String> {
        let token = format!(
            "{}{}",
            SESSION_TOKEN_PREFIX,
            Self::generate_secret(SESSION_SECRET_LEN)
        );
        let expires_at = Utc::now() + Duration::days(SESSION_TOKEN_TTL_DAYS);

        sqlx::query(
            "INSERT INTO session_token (id, user_id, token_hash, expires_at, created_at) \
             VALUES ($1, $2, $3, $4, now())",
        )
        .bind(new_v7())
        .bind(user_id)
        .bind(Self::hash_secret(&token))
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(token)
    }

    async fn validate_session(&self, token: &str) -> Result<Option<User>> {
        if !token.starts_with(SESSION_TOKEN_PREFIX) {
            return Ok(None);
        }

        let row = sqlx::query(&format!(
            r#"
            SELECT {USER_COLUMNS_QUALIFIED}
            FROM app_user u
            JOIN session_token s ON s.user_id = u.id
            WHERE s.token_hash = $1 AND s.expires_at > now()
            "#
        ))
        .bind(Self::hash_secret(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| map_user_row(&r)))
    }

    async fn revoke_session(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM session_token WHERE token_hash = $1")
            .bind(Self::hash_secret(token))
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn read_notifications(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let row = sqlx::query("SELECT read_notifications FROM app_user WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.map(|r| r.get("read_notifications"))
            .ok_or_else(|| Error::NotFound(format!("User not found: {}", user_id)))
    }

    async fn mark_notifications_read(&self, user_id: Uuid, event_ids: &[Uuid]) -> Result<()> {
        if event_ids.is_empty() {
            return Ok(());
        }

        // Append and deduplicate in one statement.
        sqlx::query(
            "UPDATE app_user SET \
                 read_notifications = ARRAY(\
                     SELECT DISTINCT e FROM unnest(read_notifications || $2) AS e\
                 ), \
                 updated_at = now() \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(event_ids)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secret_length_and_charset() {
        let secret = PgUserRepository::generate_secret(48);
        assert_eq!(secret.len(), 48);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generate_secret_unique() {
        let a = PgUserRepository::generate_secret(48);
        let b = PgUserRepository::generate_secret(48);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_secret_deterministic() {
        let h1 = PgUserRepository::hash_secret("dc_tok_abc");
        let h2 = PgUserRepository::hash_secret("dc_tok_abc");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert_ne!(h1, PgUserRepository::hash_secret("dc_tok_abd"));
    }
}
