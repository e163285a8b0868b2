//! Meal log service trait definition.

use crate::dto::{CreateMealRequest, DailySummaryResponse, MealLogResponse, UpdateMealRequest};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use larder_core::{Interface, LarderResult, MealLogId, UserId};

/// Meal log service trait. Users only ever see their own logs.
#[async_trait]
pub trait MealService: Interface + Send + Sync {
    async fn list(
        &self,
        user: UserId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> LarderResult<Vec<MealLogResponse>>;

    /// Logs a meal, consuming from a pantry item when one is given.
    async fn create(&self, user: UserId, request: CreateMealRequest) -> LarderResult<MealLogResponse>;

    async fn update(&self, user: UserId, id: MealLogId, request: UpdateMealRequest) -> LarderResult<MealLogResponse>;

    async fn delete(&self, user: UserId, id: MealLogId) -> LarderResult<()>;

    /// Nutrient totals for one UTC day.
    async fn daily_summary(&self, user: UserId, date: NaiveDate) -> LarderResult<DailySummaryResponse>;
}
