//! Meal log service implementation.

use super::access::load_accessible_pantry;
use crate::dto::{CreateMealRequest, DailySummaryResponse, MealLogResponse, MealTypeSummary, UpdateMealRequest};
use crate::meal_service::MealService;
use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate, Utc};
use larder_core::{
    FoodId, LarderError, LarderResult, MealLog, MealLogId, MealType, Nutrients, UserId, ValidateExt,
};
use larder_repository::{FoodRepository, GroupRepository, MealLogRepository, PantryRepository};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

pub struct MealServiceImpl {
    meals: Arc<dyn MealLogRepository>,
    foods: Arc<dyn FoodRepository>,
    pantries: Arc<dyn PantryRepository>,
    groups: Arc<dyn GroupRepository>,
}

impl MealServiceImpl {
    pub fn new(
        meals: Arc<dyn MealLogRepository>,
        foods: Arc<dyn FoodRepository>,
        pantries: Arc<dyn PantryRepository>,
        groups: Arc<dyn GroupRepository>,
    ) -> Self {
        Self {
            meals,
            foods,
            pantries,
            groups,
        }
    }

    /// Loads one of the caller's own logs; other users' logs are not found.
    async fn own(&self, user: UserId, id: MealLogId) -> LarderResult<MealLog> {
        self.meals
            .find_by_id(id)
            .await?
            .filter(|log| log.user_id == user)
            .ok_or_else(|| LarderError::not_found("Meal log", id))
    }
}

/// `[date 00:00, date + 1 day)` in UTC.
fn day_bounds(date: NaiveDate) -> LarderResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| LarderError::bad_request("Invalid date"))?
        .and_utc();
    let end = start
        .checked_add_days(Days::new(1))
        .ok_or_else(|| LarderError::bad_request("Date out of range"))?;
    Ok((start, end))
}

#[async_trait]
impl MealService for MealServiceImpl {
    async fn list(
        &self,
        user: UserId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> LarderResult<Vec<MealLogResponse>> {
        let logs = self.meals.find_by_user(user, from, to).await?;
        Ok(logs.into_iter().map(MealLogResponse::from).collect())
    }

    async fn create(&self, user: UserId, request: CreateMealRequest) -> LarderResult<MealLogResponse> {
        debug!("Logging meal of food {}", request.food_id);

        request.validate_request()?;

        self.foods
            .find_by_id(request.food_id)
            .await?
            .ok_or_else(|| LarderError::not_found("Food", request.food_id))?;

        let pantry_item = match request.pantry_item_id {
            Some(item_id) => {
                let item = self
                    .pantries
                    .find_item(item_id)
                    .await?
                    .ok_or_else(|| LarderError::not_found("Pantry item", item_id))?;
                load_accessible_pantry(self.pantries.as_ref(), self.groups.as_ref(), item.pantry_id, user)
                    .await
                    .map_err(|_| LarderError::not_found("Pantry item", item_id))?;
                Some(item)
            }
            None => None,
        };

        let log = MealLog::new(
            user,
            request.food_id,
            request.pantry_item_id,
            request.quantity,
            request.meal_type,
            request.eaten_at.unwrap_or_else(Utc::now),
            request.note,
        );
        let saved = self.meals.save(&log).await?;

        if let Some(mut item) = pantry_item {
            if item.consume(request.quantity) {
                self.pantries.delete_item(item.id).await?;
                info!(pantry_item_id = %item.id, "Pantry item used up");
            } else {
                self.pantries.update_item(&item).await?;
            }
        }

        info!("Meal logged: {}", saved.id);
        Ok(MealLogResponse::from(saved))
    }

    async fn update(&self, user: UserId, id: MealLogId, request: UpdateMealRequest) -> LarderResult<MealLogResponse> {
        request.validate_request()?;

        let mut log = self.own(user, id).await?;
        request.apply(&mut log);

        let updated = self.meals.update(&log).await?;
        Ok(MealLogResponse::from(updated))
    }

    async fn delete(&self, user: UserId, id: MealLogId) -> LarderResult<()> {
        self.own(user, id).await?;
        self.meals.delete(id).await?;

        info!("Meal log deleted: {}", id);
        Ok(())
    }

    async fn daily_summary(&self, user: UserId, date: NaiveDate) -> LarderResult<DailySummaryResponse> {
        let (start, end) = day_bounds(date)?;
        let logs = self.meals.find_by_user(user, Some(start), Some(end)).await?;

        let mut per_100: HashMap<FoodId, Nutrients> = HashMap::new();
        for log in &logs {
            if per_100.contains_key(&log.food_id) {
                continue;
            }
            // A deleted food contributes nothing.
            let nutrients = self
                .foods
                .find_by_id(log.food_id)
                .await?
                .map(|food| food.nutrients())
                .unwrap_or_default();
            per_100.insert(log.food_id, nutrients);
        }

        let mut totals = Nutrients::default();
        let mut by_type: HashMap<MealType, (usize, Nutrients)> = HashMap::new();
        for log in &logs {
            let eaten = per_100
                .get(&log.food_id)
                .copied()
                .unwrap_or_default()
                .for_quantity(log.quantity);
            totals += eaten;
            let entry = by_type.entry(log.meal_type).or_default();
            entry.0 += 1;
            entry.1 += eaten;
        }

        let by_meal_type = MealType::all()
            .into_iter()
            .map(|meal_type| {
                let (meal_count, nutrients) = by_type.remove(&meal_type).unwrap_or_default();
                MealTypeSummary {
                    meal_type,
                    meal_count,
                    nutrients: nutrients.rounded(),
                }
            })
            .collect();

        Ok(DailySummaryResponse {
            date,
            meal_count: logs.len(),
            totals: totals.rounded(),
            by_meal_type,
        })
    }
}

impl std::fmt::Debug for MealServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MealServiceImpl").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryDb;
    use chrono::TimeZone;

    fn service(db: &Arc<InMemoryDb>) -> MealServiceImpl {
        MealServiceImpl::new(db.clone(), db.clone(), db.clone(), db.clone())
    }

    fn meal(food: FoodId, quantity: f64, meal_type: MealType, eaten_at: DateTime<Utc>) -> CreateMealRequest {
        CreateMealRequest {
            food_id: food,
            quantity,
            meal_type,
            eaten_at: Some(eaten_at),
            ..CreateMealRequest::default()
        }
    }

    #[tokio::test]
    async fn test_create_consumes_pantry_item() {
        let db = InMemoryDb::new();
        let user = db.insert_user("kc-1", "ada");
        let food = db.insert_food("Yoghurt", None, user.id);
        let pantry = db.insert_pantry("Fridge", user.id, None);
        let item = db.insert_pantry_item(pantry.id, food.id, 500.0, user.id);
        let service = service(&db);

        service
            .create(
                user.id,
                CreateMealRequest {
                    pantry_item_id: Some(item.id),
                    ..meal(food.id, 150.0, MealType::Breakfast, Utc::now())
                },
            )
            .await
            .unwrap();
        let left = db.pantry_item(item.id).unwrap();
        assert!((left.quantity - 350.0).abs() < f64::EPSILON);

        service
            .create(
                user.id,
                CreateMealRequest {
                    pantry_item_id: Some(item.id),
                    ..meal(food.id, 400.0, MealType::Snack, Utc::now())
                },
            )
            .await
            .unwrap();
        assert!(db.pantry_item(item.id).is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_foreign_pantry_item() {
        let db = InMemoryDb::new();
        let ada = db.insert_user("kc-1", "ada");
        let eve = db.insert_user("kc-2", "eve");
        let food = db.insert_food("Cheese", None, ada.id);
        let pantry = db.insert_pantry("Fridge", ada.id, None);
        let item = db.insert_pantry_item(pantry.id, food.id, 200.0, ada.id);
        let service = service(&db);

        let err = service
            .create(
                eve.id,
                CreateMealRequest {
                    pantry_item_id: Some(item.id),
                    ..meal(food.id, 50.0, MealType::Lunch, Utc::now())
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LarderError::NotFound { .. }));
        assert!(db.pantry_item(item.id).is_some());
    }

    #[tokio::test]
    async fn test_other_users_logs_are_not_found() {
        let db = InMemoryDb::new();
        let ada = db.insert_user("kc-1", "ada");
        let eve = db.insert_user("kc-2", "eve");
        let food = db.insert_food("Apple", None, ada.id);
        let service = service(&db);

        let log = service
            .create(ada.id, meal(food.id, 100.0, MealType::Snack, Utc::now()))
            .await
            .unwrap();

        let err = service.delete(eve.id, log.id).await.unwrap_err();
        assert!(matches!(err, LarderError::NotFound { .. }));

        let updated = service
            .update(
                ada.id,
                log.id,
                UpdateMealRequest {
                    quantity: Some(120.0),
                    ..UpdateMealRequest::default()
                },
            )
            .await
            .unwrap();
        assert!((updated.quantity - 120.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_daily_summary_scales_and_groups() {
        let db = InMemoryDb::new();
        let user = db.insert_user("kc-1", "ada");
        // 200 kcal, 10 g protein, 30 g carbs, 5 g fat per 100 g
        let food = db.insert_food("Granola", None, user.id);
        let service = service(&db);

        let morning = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2024, 3, 5, 20, 0, 0).unwrap();
        let next_day = Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).unwrap();

        service
            .create(user.id, meal(food.id, 50.0, MealType::Breakfast, morning))
            .await
            .unwrap();
        service
            .create(user.id, meal(food.id, 150.0, MealType::Dinner, evening))
            .await
            .unwrap();
        service
            .create(user.id, meal(food.id, 100.0, MealType::Dinner, next_day))
            .await
            .unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let summary = service.daily_summary(user.id, date).await.unwrap();

        assert_eq!(summary.meal_count, 2);
        assert!((summary.totals.calories - 400.0).abs() < 1e-9);
        assert!((summary.totals.proteins - 20.0).abs() < 1e-9);

        let types: Vec<MealType> = summary.by_meal_type.iter().map(|s| s.meal_type).collect();
        assert_eq!(types, MealType::all().to_vec());
        assert_eq!(summary.by_meal_type[0].meal_count, 1);
        assert!((summary.by_meal_type[0].nutrients.calories - 100.0).abs() < 1e-9);
        assert_eq!(summary.by_meal_type[1].meal_count, 0);
        assert!((summary.by_meal_type[2].nutrients.calories - 300.0).abs() < 1e-9);
    }
}
