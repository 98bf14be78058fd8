//! Clothing item repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use closet_core::{
    clamp_page, new_v7, Category, ClothingItem, ClothingRepository, CreateClothingRequest, Error,
    ListClothingRequest, Occasion, Page, Result, Season, UpdateClothingRequest,
};

use crate::escape_like;

/// PostgreSQL implementation of ClothingRepository.
pub struct PgClothingRepository {
    pool: Pool<Postgres>,
}

impl PgClothingRepository {
    /// Create a new PgClothingRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

const CLOTHING_COLUMNS: &str = "id, user_id, name, category, color, brand, size, image_url, \
     tags, seasons, occasions, is_favorite, created_at, updated_at";

/// Map a database row to a ClothingItem.
///
/// Enumeration columns are stored as lowercase text; values that no longer
/// parse (schema drift) are dropped rather than failing the whole read.
pub(crate) fn map_clothing_row(row: &sqlx::postgres::PgRow) -> ClothingItem {
    let category: String = row.get("category");
    let seasons: Vec<String> = row.get("seasons");
    let occasions: Vec<String> = row.get("occasions");

    ClothingItem {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        category: Category::parse_str(&category).unwrap_or(Category::Other),
        color: row.get("color"),
        brand: row.get("brand"),
        size: row.get("size"),
        image_url: row.get("image_url"),
        tags: row.get("tags"),
        seasons: seasons
            .iter()
            .filter_map(|s| Season::parse_str(s).ok())
            .collect(),
        occasions: occasions
            .iter()
            .filter_map(|o| Occasion::parse_str(o).ok())
            .collect(),
        is_favorite: row.get("is_favorite"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn to_str_vec<T, F: Fn(&T) -> &'static str>(values: &[T], f: F) -> Vec<String> {
    values.iter().map(|v| f(v).to_string()).collect()
}

fn toggle_favorite_sql() -> String {
    format!(
        "UPDATE clothing_item SET is_favorite = NOT is_favorite, updated_at = now() \
         WHERE id = $1 AND user_id = $2 RETURNING {CLOTHING_COLUMNS}"
    )
}

#[async_trait]
impl ClothingRepository for PgClothingRepository {
    async fn insert(&self, user_id: Uuid, req: CreateClothingRequest) -> Result<ClothingItem> {
        let id = new_v7();
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO clothing_item
                (id, user_id, name, category, color, brand, size, image_url,
                 tags, seasons, occasions, is_favorite, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, now(), now())
            RETURNING {CLOTHING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&req.name)
        .bind(req.category.as_str())
        .bind(&req.color)
        .bind(&req.brand)
        .bind(&req.size)
        .bind(&req.image_url)
        .bind(&req.tags)
        .bind(to_str_vec(&req.seasons, Season::as_str))
        .bind(to_str_vec(&req.occasions, Occasion::as_str))
        .bind(req.is_favorite)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(map_clothing_row(&row))
    }

    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<ClothingItem> {
        let row = sqlx::query(&format!(
            "SELECT {CLOTHING_COLUMNS} FROM clothing_item WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|r| map_clothing_row(&r))
            .ok_or(Error::ClothingNotFound(id))
    }

    async fn fetch_many(&self, user_id: Uuid, ids: &[Uuid]) -> Result<Vec<ClothingItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {CLOTHING_COLUMNS} FROM clothing_item WHERE user_id = $1 AND id = ANY($2)"
        ))
        .bind(user_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(map_clothing_row).collect())
    }

    async fn list(&self, user_id: Uuid, req: ListClothingRequest) -> Result<Page<ClothingItem>> {
        let (limit, offset) = clamp_page(req.limit, req.offset);

        let mut filters = String::new();
        let mut param_idx = 2;

        let category = req.category.map(|c| c.as_str());
        if category.is_some() {
            filters.push_str(&format!("AND category = ${} ", param_idx));
            param_idx += 1;
        }
        if req.favorite.is_some() {
            filters.push_str(&format!("AND is_favorite = ${} ", param_idx));
            param_idx += 1;
        }
        let search = req
            .search
            .as_deref()
            .map(|s| format!("%{}%", escape_like(s)));
        if search.is_some() {
            filters.push_str(&format!(
                "AND (name ILIKE ${p} OR brand ILIKE ${p} \
                 OR EXISTS (SELECT 1 FROM unnest(tags) AS t WHERE t ILIKE ${p})) ",
                p = param_idx
            ));
            param_idx += 1;
        }

        let count_sql =
            format!("SELECT COUNT(*) FROM clothing_item WHERE user_id = $1 {filters}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
        if let Some(c) = category {
            count_query = count_query.bind(c);
        }
        if let Some(f) = req.favorite {
            count_query = count_query.bind(f);
        }
        if let Some(s) = &search {
            count_query = count_query.bind(s);
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let data_sql = format!(
            "SELECT {CLOTHING_COLUMNS} FROM clothing_item WHERE user_id = $1 {filters}\
             ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            param_idx,
            param_idx + 1
        );
        let mut data_query = sqlx::query(&data_sql).bind(user_id);
        if let Some(c) = category {
            data_query = data_query.bind(c);
        }
        if let Some(f) = req.favorite {
            data_query = data_query.bind(f);
        }
        if let Some(s) = &search {
            data_query = data_query.bind(s);
        }
        let rows = data_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let items = rows.iter().map(map_clothing_row).collect();
        Ok(Page::new(items, total, limit, offset))
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        req: UpdateClothingRequest,
    ) -> Result<ClothingItem> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE clothing_item SET
                name = COALESCE($3, name),
                category = COALESCE($4, category),
                color = COALESCE($5, color),
                brand = COALESCE($6, brand),
                size = COALESCE($7, size),
                image_url = COALESCE($8, image_url),
                tags = COALESCE($9, tags),
                seasons = COALESCE($10, seasons),
                occasions = COALESCE($11, occasions),
                is_favorite = COALESCE($12, is_favorite),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING {CLOTHING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&req.name)
        .bind(req.category.map(|c| c.as_str()))
        .bind(&req.color)
        .bind(&req.brand)
        .bind(&req.size)
        .bind(&req.image_url)
        .bind(&req.tags)
        .bind(req.seasons.as_deref().map(|s| to_str_vec(s, Season::as_str)))
        .bind(
            req.occasions
                .as_deref()
                .map(|o| to_str_vec(o, Occasion::as_str)),
        )
        .bind(req.is_favorite)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(|r| map_clothing_row(&r))
            .ok_or(Error::ClothingNotFound(id))
    }

    async fn toggle_favorite(&self, user_id: Uuid, id: Uuid) -> Result<ClothingItem> {
        let row = sqlx::query(&toggle_favorite_sql())
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        row.map(|r| map_clothing_row(&r))
            .ok_or(Error::ClothingNotFound(id))
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM clothing_item WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::ClothingNotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_favorite_flips_atomically_and_scopes_by_owner() {
        let sql = toggle_favorite_sql();
        assert!(sql.contains("is_favorite = NOT is_favorite"));
        assert!(sql.contains("user_id = $2"));
        assert!(sql.contains(CLOTHING_COLUMNS));
    }
}
