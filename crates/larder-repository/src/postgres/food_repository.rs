//! PostgreSQL food repository.

use crate::traits::{FoodFilter, FoodRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use larder_core::{Food, FoodId, LarderResult, Page, PageRequest, UserId};
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

const FOOD_COLUMNS: &str = "id, name, brand, barcode, category, unit, calories, proteins, \
    carbohydrates, fats, fiber, sugar, salt, image_url, created_by, created_at, updated_at";

/// Filter predicate shared by list and count; `$1` is the search term, `$2` the category.
const FOOD_FILTER: &str = "($1::text IS NULL OR name ILIKE '%' || $1 || '%' OR brand ILIKE '%' || $1 || '%') \
    AND ($2::text IS NULL OR category = $2)";

#[derive(Clone)]
pub struct PgFoodRepository {
    pool: PgPool,
}

impl PgFoodRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct FoodRow {
    id: Uuid,
    name: String,
    brand: Option<String>,
    barcode: Option<String>,
    category: Option<String>,
    unit: String,
    calories: Option<f64>,
    proteins: Option<f64>,
    carbohydrates: Option<f64>,
    fats: Option<f64>,
    fiber: Option<f64>,
    sugar: Option<f64>,
    salt: Option<f64>,
    image_url: Option<String>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FoodRow> for Food {
    fn from(row: FoodRow) -> Self {
        Self {
            id: FoodId::from_uuid(row.id),
            name: row.name,
            brand: row.brand,
            barcode: row.barcode,
            category: row.category,
            unit: row.unit,
            calories: row.calories,
            proteins: row.proteins,
            carbohydrates: row.carbohydrates,
            fats: row.fats,
            fiber: row.fiber,
            sugar: row.sugar,
            salt: row.salt,
            image_url: row.image_url,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl FoodRepository for PgFoodRepository {
    async fn find_by_id(&self, id: FoodId) -> LarderResult<Option<Food>> {
        debug!("Finding food by id: {}", id);

        let row = sqlx::query_as::<_, FoodRow>(&format!("SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1"))
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Food::from))
    }

    async fn find_by_barcode(&self, barcode: &str) -> LarderResult<Option<Food>> {
        debug!("Finding food by barcode: {}", barcode);

        let row = sqlx::query_as::<_, FoodRow>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE barcode = $1"
        ))
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Food::from))
    }

    async fn find_all(&self, filter: &FoodFilter, page: PageRequest) -> LarderResult<Page<Food>> {
        debug!(?filter, page = page.page, size = page.size, "Listing foods");

        let rows = sqlx::query_as::<_, FoodRow>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods WHERE {FOOD_FILTER} ORDER BY name, id LIMIT $3 OFFSET $4"
        ))
        .bind(&filter.search)
        .bind(&filter.category)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = self.count(filter).await?;
        Ok(Page::new(rows.into_iter().map(Food::from).collect(), page, total))
    }

    async fn count(&self, filter: &FoodFilter) -> LarderResult<u64> {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM foods WHERE {FOOD_FILTER}"))
            .bind(&filter.search)
            .bind(&filter.category)
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn save(&self, food: &Food) -> LarderResult<Food> {
        debug!("Saving food: {}", food.name);

        let row = sqlx::query_as::<_, FoodRow>(&format!(
            r#"
            INSERT INTO foods (id, name, brand, barcode, category, unit, calories, proteins,
                               carbohydrates, fats, fiber, sugar, salt, image_url, created_by,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {FOOD_COLUMNS}
            "#
        ))
        .bind(food.id.into_inner())
        .bind(&food.name)
        .bind(&food.brand)
        .bind(&food.barcode)
        .bind(&food.category)
        .bind(&food.unit)
        .bind(food.calories)
        .bind(food.proteins)
        .bind(food.carbohydrates)
        .bind(food.fats)
        .bind(food.fiber)
        .bind(food.sugar)
        .bind(food.salt)
        .bind(&food.image_url)
        .bind(food.created_by.into_inner())
        .bind(food.created_at)
        .bind(food.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(&self, food: &Food) -> LarderResult<Food> {
        debug!("Updating food: {}", food.id);

        let row = sqlx::query_as::<_, FoodRow>(&format!(
            r#"
            UPDATE foods
            SET name = $2, brand = $3, barcode = $4, category = $5, unit = $6, calories = $7,
                proteins = $8, carbohydrates = $9, fats = $10, fiber = $11, sugar = $12,
                salt = $13, image_url = $14, updated_at = $15
            WHERE id = $1
            RETURNING {FOOD_COLUMNS}
            "#
        ))
        .bind(food.id.into_inner())
        .bind(&food.name)
        .bind(&food.brand)
        .bind(&food.barcode)
        .bind(&food.category)
        .bind(&food.unit)
        .bind(food.calories)
        .bind(food.proteins)
        .bind(food.carbohydrates)
        .bind(food.fats)
        .bind(food.fiber)
        .bind(food.sugar)
        .bind(food.salt)
        .bind(&food.image_url)
        .bind(food.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn delete(&self, id: FoodId) -> LarderResult<bool> {
        debug!("Deleting food: {}", id);

        let result = sqlx::query("DELETE FROM foods WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
