//! # closet-db
//!
//! PostgreSQL database layer for Digital Closet.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for all core entities
//! - Bearer-token session storage (hashed at rest)
//! - Public landing-page aggregates
//!
//! ## Example
//!
//! ```rust,ignore
//! use closet_db::Database;
//! use closet_core::{ClothingRepository, CreateClothingRequest, Category};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/closet").await?;
//!
//!     let item = db.clothing.insert(user_id, CreateClothingRequest {
//!         name: "Denim jacket".to_string(),
//!         category: Category::Outerwear,
//!         color: "blue".to_string(),
//!         ..Default::default()
//!     }).await?;
//!
//!     println!("Created item: {}", item.id);
//!     Ok(())
//! }
//! ```

pub mod calendar;
pub mod clothing;
pub mod outfits;
pub mod pool;
pub mod stats;
pub mod testimonials;
pub mod users;

// Re-export core types
pub use closet_core::*;

pub use calendar::{PgCalendarRepository, DATE_TAKEN_MESSAGE};
pub use clothing::PgClothingRepository;
pub use outfits::PgOutfitRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
pub use stats::PgStatsRepository;
pub use testimonials::PgTestimonialRepository;
pub use users::PgUserRepository;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Clothing item repository.
    pub clothing: PgClothingRepository,
    /// Outfit repository.
    pub outfits: PgOutfitRepository,
    /// Calendar event repository.
    pub calendar: PgCalendarRepository,
    /// Testimonial repository.
    pub testimonials: PgTestimonialRepository,
    /// User account and session repository.
    pub users: PgUserRepository,
    /// Public statistics provider.
    pub stats: PgStatsRepository,
}

impl Database {
    /// Connect with default pool configuration.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::from_pool(pool))
    }

    /// Connect with a custom pool configuration.
    pub async fn connect_with_config(database_url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(database_url, config).await?;
        Ok(Self::from_pool(pool))
    }

    /// Build the repository set on top of an existing pool.
    pub fn from_pool(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            clothing: PgClothingRepository::new(pool.clone()),
            outfits: PgOutfitRepository::new(pool.clone()),
            calendar: PgCalendarRepository::new(pool.clone()),
            testimonials: PgTestimonialRepository::new(pool.clone()),
            users: PgUserRepository::new(pool.clone()),
            stats: PgStatsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Run pending SQL migrations from the workspace `migrations/` directory.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("Migration failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50% off_sale"), "50\\% off\\_sale");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
