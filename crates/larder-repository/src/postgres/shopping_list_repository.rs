//! PostgreSQL shopping list repository.

use crate::traits::{ShoppingListFilter, ShoppingListRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use larder_core::{FoodId, GroupId, LarderResult, ShoppingListItem, ShoppingListItemId, UserId};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

const ITEM_COLUMNS: &str = "id, owner_id, group_id, food_id, name, quantity, unit, note, checked, \
    checked_at, checked_by, created_at, updated_at";

#[derive(Clone)]
pub struct PgShoppingListRepository {
    pool: PgPool,
}

impl PgShoppingListRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ShoppingListItemRow {
    id: Uuid,
    owner_id: Uuid,
    group_id: Option<Uuid>,
    food_id: Option<Uuid>,
    name: String,
    quantity: f64,
    unit: Option<String>,
    note: Option<String>,
    checked: bool,
    checked_at: Option<DateTime<Utc>>,
    checked_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShoppingListItemRow> for ShoppingListItem {
    fn from(row: ShoppingListItemRow) -> Self {
        Self {
            id: ShoppingListItemId::from_uuid(row.id),
            owner_id: UserId::from_uuid(row.owner_id),
            group_id: row.group_id.map(GroupId::from_uuid),
            food_id: row.food_id.map(FoodId::from_uuid),
            name: row.name,
            quantity: row.quantity,
            unit: row.unit,
            note: row.note,
            checked: row.checked,
            checked_at: row.checked_at,
            checked_by: row.checked_by.map(UserId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ShoppingListRepository for PgShoppingListRepository {
    async fn find_by_id(&self, id: ShoppingListItemId) -> LarderResult<Option<ShoppingListItem>> {
        let row = sqlx::query_as::<_, ShoppingListItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM shopping_list_items WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ShoppingListItem::from))
    }

    async fn find_accessible(
        &self,
        user_id: UserId,
        filter: ShoppingListFilter,
    ) -> LarderResult<Vec<ShoppingListItem>> {
        debug!(%user_id, ?filter, "Listing shopping list items");

        let rows = sqlx::query_as::<_, ShoppingListItemRow>(&format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM shopping_list_items
            WHERE (
                    (group_id IS NULL AND owner_id = $1)
                 OR group_id IN (SELECT group_id FROM group_members WHERE user_id = $1)
            )
              AND ($2::uuid IS NULL OR group_id = $2)
              AND ($3::boolean IS NULL OR checked = $3)
            ORDER BY checked, created_at
            "#
        ))
        .bind(user_id.into_inner())
        .bind(filter.group_id.map(GroupId::into_inner))
        .bind(filter.checked)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ShoppingListItem::from).collect())
    }

    async fn save(&self, item: &ShoppingListItem) -> LarderResult<ShoppingListItem> {
        let row = sqlx::query_as::<_, ShoppingListItemRow>(&format!(
            r#"
            INSERT INTO shopping_list_items (id, owner_id, group_id, food_id, name, quantity, unit,
                                             note, checked, checked_at, checked_by, created_at,
                                             updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(item.id.into_inner())
        .bind(item.owner_id.into_inner())
        .bind(item.group_id.map(GroupId::into_inner))
        .bind(item.food_id.map(FoodId::into_inner))
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(&item.note)
        .bind(item.checked)
        .bind(item.checked_at)
        .bind(item.checked_by.map(UserId::into_inner))
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(&self, item: &ShoppingListItem) -> LarderResult<ShoppingListItem> {
        let row = sqlx::query_as::<_, ShoppingListItemRow>(&format!(
            r#"
            UPDATE shopping_list_items
            SET food_id = $2, name = $3, quantity = $4, unit = $5, note = $6, checked = $7,
                checked_at = $8, checked_by = $9, updated_at = $10
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(item.id.into_inner())
        .bind(item.food_id.map(FoodId::into_inner))
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(&item.note)
        .bind(item.checked)
        .bind(item.checked_at)
        .bind(item.checked_by.map(UserId::into_inner))
        .bind(item.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete(&self, id: ShoppingListItemId) -> LarderResult<bool> {
        let result = sqlx::query("DELETE FROM shopping_list_items WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_checked(&self, user_id: UserId, group_id: Option<GroupId>) -> LarderResult<u64> {
        let result = match group_id {
            Some(group_id) => {
                sqlx::query("DELETE FROM shopping_list_items WHERE checked AND group_id = $1")
                    .bind(group_id.into_inner())
                    .execute(&self.pool)
                    .await?
            }
            None => {
                sqlx::query(
                    "DELETE FROM shopping_list_items WHERE checked AND group_id IS NULL AND owner_id = $1",
                )
                .bind(user_id.into_inner())
                .execute(&self.pool)
                .await?
            }
        };

        debug!(%user_id, removed = result.rows_affected(), "Cleared checked shopping list items");
        Ok(result.rows_affected())
    }
}
