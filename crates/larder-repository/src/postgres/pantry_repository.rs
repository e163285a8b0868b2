//! PostgreSQL pantry and pantry item repository.

use crate::traits::PantryRepository;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use larder_core::{
    FoodId, GroupId, LarderResult, Pantry, PantryId, PantryItem, PantryItemId, UserId,
};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

const PANTRY_COLUMNS: &str = "id, name, description, owner_id, group_id, created_at, updated_at";
const ITEM_COLUMNS: &str =
    "id, pantry_id, food_id, quantity, unit, expiration_date, added_by, created_at, updated_at";

#[derive(Clone)]
pub struct PgPantryRepository {
    pool: PgPool,
}

impl PgPantryRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PantryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    owner_id: Uuid,
    group_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PantryRow> for Pantry {
    fn from(row: PantryRow) -> Self {
        Self {
            id: PantryId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            owner_id: UserId::from_uuid(row.owner_id),
            group_id: row.group_id.map(GroupId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct PantryItemRow {
    id: Uuid,
    pantry_id: Uuid,
    food_id: Uuid,
    quantity: f64,
    unit: String,
    expiration_date: Option<NaiveDate>,
    added_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PantryItemRow> for PantryItem {
    fn from(row: PantryItemRow) -> Self {
        Self {
            id: PantryItemId::from_uuid(row.id),
            pantry_id: PantryId::from_uuid(row.pantry_id),
            food_id: FoodId::from_uuid(row.food_id),
            quantity: row.quantity,
            unit: row.unit,
            expiration_date: row.expiration_date,
            added_by: UserId::from_uuid(row.added_by),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl PantryRepository for PgPantryRepository {
    async fn find_by_id(&self, id: PantryId) -> LarderResult<Option<Pantry>> {
        let row = sqlx::query_as::<_, PantryRow>(&format!(
            "SELECT {PANTRY_COLUMNS} FROM pantries WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Pantry::from))
    }

    async fn find_accessible(&self, user_id: UserId) -> LarderResult<Vec<Pantry>> {
        debug!("Listing pantries accessible to user: {}", user_id);

        let rows = sqlx::query_as::<_, PantryRow>(&format!(
            r#"
            SELECT {PANTRY_COLUMNS} FROM pantries
            WHERE owner_id = $1
               OR group_id IN (SELECT group_id FROM group_members WHERE user_id = $1)
            ORDER BY name
            "#
        ))
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Pantry::from).collect())
    }

    async fn exists_by_owner_and_name(
        &self,
        owner_id: UserId,
        name: &str,
        exclude: Option<PantryId>,
    ) -> LarderResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM pantries
                WHERE owner_id = $1 AND name = $2 AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(owner_id.into_inner())
        .bind(name)
        .bind(exclude.map(PantryId::into_inner))
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn save(&self, pantry: &Pantry) -> LarderResult<Pantry> {
        debug!("Saving pantry: {}", pantry.name);

        let row = sqlx::query_as::<_, PantryRow>(&format!(
            r#"
            INSERT INTO pantries (id, name, description, owner_id, group_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PANTRY_COLUMNS}
            "#
        ))
        .bind(pantry.id.into_inner())
        .bind(&pantry.name)
        .bind(&pantry.description)
        .bind(pantry.owner_id.into_inner())
        .bind(pantry.group_id.map(GroupId::into_inner))
        .bind(pantry.created_at)
        .bind(pantry.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(&self, pantry: &Pantry) -> LarderResult<Pantry> {
        let row = sqlx::query_as::<_, PantryRow>(&format!(
            r#"
            UPDATE pantries
            SET name = $2, description = $3, group_id = $4, updated_at = $5
            WHERE id = $1
            RETURNING {PANTRY_COLUMNS}
            "#
        ))
        .bind(pantry.id.into_inner())
        .bind(&pantry.name)
        .bind(&pantry.description)
        .bind(pantry.group_id.map(GroupId::into_inner))
        .bind(pantry.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete(&self, id: PantryId) -> LarderResult<bool> {
        let result = sqlx::query("DELETE FROM pantries WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_items(&self, pantry_id: PantryId) -> LarderResult<Vec<PantryItem>> {
        let rows = sqlx::query_as::<_, PantryItemRow>(&format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM pantry_items
            WHERE pantry_id = $1
            ORDER BY expiration_date NULLS LAST, created_at
            "#
        ))
        .bind(pantry_id.into_inner())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PantryItem::from).collect())
    }

    async fn find_item(&self, id: PantryItemId) -> LarderResult<Option<PantryItem>> {
        let row = sqlx::query_as::<_, PantryItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM pantry_items WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(PantryItem::from))
    }

    async fn save_item(&self, item: &PantryItem) -> LarderResult<PantryItem> {
        debug!("Adding item to pantry: {}", item.pantry_id);

        let row = sqlx::query_as::<_, PantryItemRow>(&format!(
            r#"
            INSERT INTO pantry_items (id, pantry_id, food_id, quantity, unit, expiration_date,
                                      added_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(item.id.into_inner())
        .bind(item.pantry_id.into_inner())
        .bind(item.food_id.into_inner())
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.expiration_date)
        .bind(item.added_by.into_inner())
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_item(&self, item: &PantryItem) -> LarderResult<PantryItem> {
        let row = sqlx::query_as::<_, PantryItemRow>(&format!(
            r#"
            UPDATE pantry_items
            SET quantity = $2, unit = $3, expiration_date = $4, updated_at = $5
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(item.id.into_inner())
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.expiration_date)
        .bind(item.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete_item(&self, id: PantryItemId) -> LarderResult<bool> {
        let result = sqlx::query("DELETE FROM pantry_items WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
