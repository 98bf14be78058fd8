//! Outfit repository implementation.
//!
//! Outfit membership lives in the `outfit_item` join table, ordered by
//! `position`; reads resolve the full clothing items in one query per page.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use closet_core::{
    clamp_page, new_v7, ClothingItem, CreateOutfitRequest, Error, ListOutfitsRequest, Occasion,
    Outfit, OutfitRepository, Page, Result, Season, UpdateOutfitRequest,
};

use crate::clothing::map_clothing_row;
use crate::escape_like;

/// PostgreSQL implementation of OutfitRepository.
pub struct PgOutfitRepository {
    pool: Pool<Postgres>,
}

const OUTFIT_COLUMNS: &str = "id, user_id, name, description, image_url, tags, seasons, \
     occasions, rating, is_favorite, worn_date, created_at, updated_at";

const ITEM_JOIN_COLUMNS: &str = "oi.outfit_id AS member_of, c.id, c.user_id, c.name, \
     c.category, c.color, c.brand, c.size, c.image_url, c.tags, c.seasons, c.occasions, \
     c.is_favorite, c.created_at, c.updated_at";

fn map_outfit_row(row: &sqlx::postgres::PgRow, items: Vec<ClothingItem>) -> Outfit {
    let seasons: Vec<String> = row.get("seasons");
    let occasions: Vec<String> = row.get("occasions");

    Outfit {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        description: row.get("description"),
        items,
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
        rating: row.get("rating"),
        is_favorite: row.get("is_favorite"),
        worn_date: row.get("worn_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn seasons_to_strings(values: &[Season]) -> Vec<String> {
    values.iter().map(|s| s.as_str().to_string()).collect()
}

fn occasions_to_strings(values: &[Occasion]) -> Vec<String> {
    values.iter().map(|o| o.as_str().to_string()).collect()
}

impl PgOutfitRepository {
    /// Create a new PgOutfitRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Resolve the clothing items of a set of outfits, keyed by outfit id and
    /// ordered by their position within each outfit.
    pub(crate) async fn load_items(
        &self,
        outfit_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<ClothingItem>>> {
        if outfit_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(&format!(
            r#"
            SELECT {ITEM_JOIN_COLUMNS}
            FROM outfit_item oi
            JOIN clothing_item c ON c.id = oi.clothing_item_id
            WHERE oi.outfit_id = ANY($1)
            ORDER BY oi.outfit_id, oi.position
            "#
        ))
        .bind(outfit_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut by_outfit: HashMap<Uuid, Vec<ClothingItem>> = HashMap::new();
        for row in &rows {
            let outfit_id: Uuid = row.get("member_of");
            by_outfit
                .entry(outfit_id)
                .or_default()
                .push(map_clothing_row(row));
        }
        Ok(by_outfit)
    }

    /// Fetch a set of outfits by id, with items resolved, keyed by id.
    /// Missing ids are simply absent from the map.
    pub(crate) async fn fetch_map(
        &self,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Outfit>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {OUTFIT_COLUMNS} FROM outfit WHERE user_id = $1 AND id = ANY($2)"
        ))
        .bind(user_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let found: Vec<Uuid> = rows.iter().map(|r| r.get("id")).collect();
        let mut items = self.load_items(&found).await?;

        Ok(rows
            .iter()
            .map(|row| {
                let id: Uuid = row.get("id");
                (id, map_outfit_row(row, items.remove(&id).unwrap_or_default()))
            })
            .collect())
    }

    async fn replace_items(
        &self,
        tx: &mut sqlx::Transaction<'_, Postgres>,
        outfit_id: Uuid,
        item_ids: &[Uuid],
    ) -> Result<()> {
        sqlx::query("DELETE FROM outfit_item WHERE outfit_id = $1")
            .bind(outfit_id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        for (position, item_id) in item_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO outfit_item (outfit_id, clothing_item_id, position) \
                 VALUES ($1, $2, $3)",
            )
            .bind(outfit_id)
            .bind(item_id)
            .bind(position as i32)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        }
        Ok(())
    }
}

#[async_trait]
impl OutfitRepository for PgOutfitRepository {
    async fn insert(&self, user_id: Uuid, req: CreateOutfitRequest) -> Result<Outfit> {
        let id = new_v7();
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query(
            r#"
            INSERT INTO outfit
                (id, user_id, name, description, image_url, tags, seasons, occasions,
                 rating, is_favorite, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now(), now())
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.image_url)
        .bind(&req.tags)
        .bind(seasons_to_strings(&req.seasons))
        .bind(occasions_to_strings(&req.occasions))
        .bind(req.rating)
        .bind(req.is_favorite)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        self.replace_items(&mut tx, id, &req.items).await?;
        tx.commit().await.map_err(Error::Database)?;

        self.fetch(user_id, id).await
    }

    async fn fetch(&self, user_id: Uuid, id: Uuid) -> Result<Outfit> {
        let row = sqlx::query(&format!(
            "SELECT {OUTFIT_COLUMNS} FROM outfit WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        let row = row.ok_or(Error::OutfitNotFound(id))?;
        let mut items = self.load_items(&[id]).await?;
        Ok(map_outfit_row(&row, items.remove(&id).unwrap_or_default()))
    }

    async fn list(&self, user_id: Uuid, req: ListOutfitsRequest) -> Result<Page<Outfit>> {
        let (limit, offset) = clamp_page(req.limit, req.offset);

        let mut filters = String::new();
        let mut param_idx = 2;

        let occasion = req.occasion.map(|o| o.as_str());
        if occasion.is_some() {
            filters.push_str(&format!("AND ${} = ANY(occasions) ", param_idx));
            param_idx += 1;
        }
        let season = req.season.map(|s| s.as_str());
        if season.is_some() {
            filters.push_str(&format!("AND ${} = ANY(seasons) ", param_idx));
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
                "AND (name ILIKE ${p} OR description ILIKE ${p} \
                 OR EXISTS (SELECT 1 FROM unnest(tags) AS t WHERE t ILIKE ${p})) ",
                p = param_idx
            ));
            param_idx += 1;
        }

        let count_sql = format!("SELECT COUNT(*) FROM outfit WHERE user_id = $1 {filters}");
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(user_id);
        if let Some(o) = occasion {
            count_query = count_query.bind(o);
        }
        if let Some(s) = season {
            count_query = count_query.bind(s);
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
            "SELECT {OUTFIT_COLUMNS} FROM outfit WHERE user_id = $1 {filters}\
             ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            param_idx,
            param_idx + 1
        );
        let mut data_query = sqlx::query(&data_sql).bind(user_id);
        if let Some(o) = occasion {
            data_query = data_query.bind(o);
        }
        if let Some(s) = season {
            data_query = data_query.bind(s);
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

        let ids: Vec<Uuid> = rows.iter().map(|r| r.get("id")).collect();
        let mut items = self.load_items(&ids).await?;

        let outfits = rows
            .iter()
            .map(|row| {
                let id: Uuid = row.get("id");
                map_outfit_row(row, items.remove(&id).unwrap_or_default())
            })
            .collect();
        Ok(Page::new(outfits, total, limit, offset))
    }

    async fn update(&self, user_id: Uuid, id: Uuid, req: UpdateOutfitRequest) -> Result<Outfit> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let updated = sqlx::query(
            r#"
            UPDATE outfit SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                image_url = COALESCE($5, image_url),
                tags = COALESCE($6, tags),
                seasons = COALESCE($7, seasons),
                occasions = COALESCE($8, occasions),
                rating = COALESCE($9, rating),
                is_favorite = COALESCE($10, is_favorite),
                worn_date = COALESCE($11, worn_date),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.image_url)
        .bind(&req.tags)
        .bind(req.seasons.as_deref().map(seasons_to_strings))
        .bind(req.occasions.as_deref().map(occasions_to_strings))
        .bind(req.rating)
        .bind(req.is_favorite)
        .bind(req.worn_date)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        if updated.rows_affected() == 0 {
            return Err(Error::OutfitNotFound(id));
        }

        if let Some(item_ids) = &req.items {
            self.replace_items(&mut tx, id, item_ids).await?;
        }
        tx.commit().await.map_err(Error::Database)?;

        self.fetch(user_id, id).await
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM outfit WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::OutfitNotFound(id));
        }
        Ok(())
    }
}
