//! Public aggregate statistics.

use sqlx::{Pool, Postgres, Row};

use closet_core::{Error, PublicStats, Result};

/// Provider of the unauthenticated landing-page statistics.
pub struct PgStatsRepository {
    pool: Pool<Postgres>,
}

impl PgStatsRepository {
    /// Create a new PgStatsRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Aggregate counts across all users. No per-user data is exposed.
    pub async fn public_stats(&self) -> Result<PublicStats> {
        let row = sqlx::query(
            r#"
            SELECT
                (SELECT COUNT(*) FROM app_user) AS total_users,
                (SELECT COUNT(*) FROM outfit) AS total_outfits,
                (SELECT COUNT(*) FROM clothing_item) AS total_clothing_items,
                (SELECT COUNT(*) FROM calendar_event) AS total_planned_outfits,
                (SELECT COUNT(*) FROM app_user
                 WHERE created_at > now() - interval '30 days') AS recent_users
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        let total_users: i64 = row.get("total_users");
        let total_outfits: i64 = row.get("total_outfits");

        let avg_outfits_per_user = if total_users > 0 {
            (total_outfits as f64 / total_users as f64).round() as i64
        } else {
            0
        };

        Ok(PublicStats {
            total_users,
            total_outfits,
            total_clothing_items: row.get("total_clothing_items"),
            total_planned_outfits: row.get("total_planned_outfits"),
            avg_outfits_per_user,
            recent_users: row.get("recent_users"),
        })
    }
}
