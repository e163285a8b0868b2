//! Meal log entity.

use crate::{FoodId, MealLogId, MealType, PantryItemId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A record of a quantity of food eaten by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealLog {
    pub id: MealLogId,
    pub user_id: UserId,
    pub food_id: FoodId,
    /// Stock the meal was taken from, if any.
    pub pantry_item_id: Option<PantryItemId>,
    pub quantity: f64,
    pub meal_type: MealType,
    pub eaten_at: DateTime<Utc>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MealLog {
    #[must_use]
    pub fn new(
        user_id: UserId,
        food_id: FoodId,
        pantry_item_id: Option<PantryItemId>,
        quantity: f64,
        meal_type: MealType,
        eaten_at: DateTime<Utc>,
        note: Option<String>,
    ) -> Self {
        Self {
            id: MealLogId::new(),
            user_id,
            food_id,
            pantry_item_id,
            quantity,
            meal_type,
            eaten_at,
            note,
            created_at: Utc::now(),
        }
    }
}
