//! Testimonial repository implementation.
//!
//! Submissions go through moderation: only rows flagged approved show up in
//! the public feed.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use closet_core::{
    new_v7, CreateTestimonialRequest, Error, PublicTestimonial, Result, Testimonial,
    TestimonialFeed, TestimonialRepository,
};

/// PostgreSQL implementation of TestimonialRepository.
pub struct PgTestimonialRepository {
    pool: Pool<Postgres>,
}

/// Role recorded when the submitter leaves the field blank.
pub const DEFAULT_ROLE: &str = "User";

impl PgTestimonialRepository {
    /// Create a new PgTestimonialRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_testimonial_row(row: &sqlx::postgres::PgRow) -> Testimonial {
    Testimonial {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        role: row.get("role"),
        rating: row.get("rating"),
        comment: row.get("comment"),
        is_approved: row.get("is_approved"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl TestimonialRepository for PgTestimonialRepository {
    async fn insert(&self, user_id: Uuid, req: CreateTestimonialRequest) -> Result<Testimonial> {
        if !(1..=5).contains(&req.rating) {
            return Err(Error::InvalidInput(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let role = req
            .role
            .as_deref()
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(DEFAULT_ROLE);

        let row = sqlx::query(
            r#"
            INSERT INTO testimonial
                (id, user_id, name, role, rating, comment, is_approved, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, false, now(), now())
            RETURNING id, user_id, name, role, rating, comment, is_approved,
                      created_at, updated_at
            "#,
        )
        .bind(new_v7())
        .bind(user_id)
        .bind(&req.name)
        .bind(role)
        .bind(req.rating)
        .bind(&req.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_testimonial_row(&row))
    }

    async fn public_feed(&self, limit: i64) -> Result<TestimonialFeed> {
        let rows = sqlx::query(
            r#"
            SELECT t.name, t.role, t.rating, t.comment, u.avatar
            FROM testimonial t
            LEFT JOIN app_user u ON u.id = t.user_id
            WHERE t.is_approved = true
            ORDER BY t.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let testimonials = rows
            .iter()
            .map(|row| PublicTestimonial {
                name: row.get("name"),
                role: row.get("role"),
                rating: row.get("rating"),
                comment: row.get("comment"),
                avatar: row.get("avatar"),
            })
            .collect();

        let agg = sqlx::query(
            "SELECT COUNT(*) AS total, COALESCE(AVG(rating), 0)::float8 AS average \
             FROM testimonial WHERE is_approved = true",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(TestimonialFeed {
            testimonials,
            average_rating: agg.get("average"),
            total_testimonials: agg.get("total"),
        })
    }
}
