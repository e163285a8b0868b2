//! PostgreSQL meal log repository.

use crate::traits::MealLogRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use larder_core::{FoodId, LarderError, LarderResult, MealLog, MealLogId, MealType, PantryItemId, UserId};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const MEAL_COLUMNS: &str =
    "id, user_id, food_id, pantry_item_id, quantity, meal_type, eaten_at, note, created_at";

#[derive(Clone)]
pub struct PgMealLogRepository {
    pool: PgPool,
}

impl PgMealLogRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct MealLogRow {
    id: Uuid,
    user_id: Uuid,
    food_id: Uuid,
    pantry_item_id: Option<Uuid>,
    quantity: f64,
    meal_type: String,
    eaten_at: DateTime<Utc>,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MealLogRow> for MealLog {
    type Error = LarderError;

    fn try_from(row: MealLogRow) -> Result<Self, Self::Error> {
        let meal_type = row
            .meal_type
            .parse::<MealType>()
            .map_err(|e| LarderError::Internal(format!("Invalid meal type in database: {e}")))?;

        Ok(Self {
            id: MealLogId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            food_id: FoodId::from_uuid(row.food_id),
            pantry_item_id: row.pantry_item_id.map(PantryItemId::from_uuid),
            quantity: row.quantity,
            meal_type,
            eaten_at: row.eaten_at,
            note: row.note,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl MealLogRepository for PgMealLogRepository {
    async fn find_by_id(&self, id: MealLogId) -> LarderResult<Option<MealLog>> {
        let row = sqlx::query_as::<_, MealLogRow>(&format!(
            "SELECT {MEAL_COLUMNS} FROM meal_logs WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?;

        row.map(MealLog::try_from).transpose()
    }

    async fn find_by_user(
        &self,
        user_id: UserId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> LarderResult<Vec<MealLog>> {
        let rows = sqlx::query_as::<_, MealLogRow>(&format!(
            r#"
            SELECT {MEAL_COLUMNS} FROM meal_logs
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR eaten_at >= $2)
              AND ($3::timestamptz IS NULL OR eaten_at < $3)
            ORDER BY eaten_at DESC
            "#
        ))
        .bind(user_id.into_inner())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MealLog::try_from).collect()
    }

    async fn save(&self, log: &MealLog) -> LarderResult<MealLog> {
        let row = sqlx::query_as::<_, MealLogRow>(&format!(
            r#"
            INSERT INTO meal_logs (id, user_id, food_id, pantry_item_id, quantity, meal_type,
                                   eaten_at, note, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {MEAL_COLUMNS}
            "#
        ))
        .bind(log.id.into_inner())
        .bind(log.user_id.into_inner())
        .bind(log.food_id.into_inner())
        .bind(log.pantry_item_id.map(PantryItemId::into_inner))
        .bind(log.quantity)
        .bind(log.meal_type.as_str())
        .bind(log.eaten_at)
        .bind(&log.note)
        .bind(log.created_at)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update(&self, log: &MealLog) -> LarderResult<MealLog> {
        let row = sqlx::query_as::<_, MealLogRow>(&format!(
            r#"
            UPDATE meal_logs
            SET quantity = $2, meal_type = $3, eaten_at = $4, note = $5
            WHERE id = $1
            RETURNING {MEAL_COLUMNS}
            "#
        ))
        .bind(log.id.into_inner())
        .bind(log.quantity)
        .bind(log.meal_type.as_str())
        .bind(log.eaten_at)
        .bind(&log.note)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn delete(&self, id: MealLogId) -> LarderResult<bool> {
        let result = sqlx::query("DELETE FROM meal_logs WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
