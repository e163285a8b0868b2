//! Meal log DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use larder_core::{FoodId, MealLog, MealLogId, MealType, Nutrients, PantryItemId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMealRequest {
    pub food_id: FoodId,

    /// Consume this quantity from a pantry item.
    pub pantry_item_id: Option<PantryItemId>,

    #[validate(custom(function = "larder_core::rules::positive", message = "Quantity must be positive"))]
    pub quantity: f64,

    pub meal_type: MealType,

    /// Defaults to now.
    pub eaten_at: Option<DateTime<Utc>>,

    #[validate(length(max = 500))]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMealRequest {
    #[validate(custom(function = "larder_core::rules::positive", message = "Quantity must be positive"))]
    pub quantity: Option<f64>,
    pub meal_type: Option<MealType>,
    pub eaten_at: Option<DateTime<Utc>>,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

impl UpdateMealRequest {
    pub fn apply(self, log: &mut MealLog) {
        if let Some(quantity) = self.quantity {
            log.quantity = quantity;
        }
        if let Some(meal_type) = self.meal_type {
            log.meal_type = meal_type;
        }
        if let Some(eaten_at) = self.eaten_at {
            log.eaten_at = eaten_at;
        }
        if self.note.is_some() {
            log.note = self.note;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealLogResponse {
    pub id: MealLogId,
    pub user_id: UserId,
    pub food_id: FoodId,
    pub pantry_item_id: Option<PantryItemId>,
    pub quantity: f64,
    pub meal_type: MealType,
    pub eaten_at: DateTime<Utc>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<MealLog> for MealLogResponse {
    fn from(log: MealLog) -> Self {
        Self {
            id: log.id,
            user_id: log.user_id,
            food_id: log.food_id,
            pantry_item_id: log.pantry_item_id,
            quantity: log.quantity,
            meal_type: log.meal_type,
            eaten_at: log.eaten_at,
            note: log.note,
            created_at: log.created_at,
        }
    }
}

/// Nutrient totals for one meal type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealTypeSummary {
    pub meal_type: MealType,
    pub meal_count: usize,
    pub nutrients: Nutrients,
}

/// Nutrient totals for one UTC day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailySummaryResponse {
    pub date: NaiveDate,
    pub meal_count: usize,
    pub totals: Nutrients,
    /// One entry per meal type, in breakfast, lunch, dinner, snack order.
    pub by_meal_type: Vec<MealTypeSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_type_parses_lowercase() {
        let request: CreateMealRequest = serde_json::from_str(&format!(
            r#"{{"foodId":"{}","quantity":150,"mealType":"lunch"}}"#,
            FoodId::new()
        ))
        .unwrap();
        assert_eq!(request.meal_type, MealType::Lunch);
        assert!(request.eaten_at.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_zero_quantity_is_invalid() {
        let request = CreateMealRequest {
            quantity: 0.0,
            ..CreateMealRequest::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_applies_fields() {
        let mut log = MealLog::new(
            UserId::new(),
            FoodId::new(),
            None,
            100.0,
            MealType::Breakfast,
            Utc::now(),
            None,
        );
        UpdateMealRequest {
            meal_type: Some(MealType::Dinner),
            ..UpdateMealRequest::default()
        }
        .apply(&mut log);

        assert_eq!(log.meal_type, MealType::Dinner);
        assert!((log.quantity - 100.0).abs() < f64::EPSILON);
    }
}
