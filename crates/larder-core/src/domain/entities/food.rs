//! Food entity.

use crate::{FoodId, Nutrients, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog food. Nutrient values are per 100 units of `unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: FoodId,
    pub name: String,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub category: Option<String>,
    /// `g` or `ml`
    pub unit: String,
    pub calories: Option<f64>,
    pub proteins: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub fats: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub salt: Option<f64>,
    pub image_url: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field values for a food about to be created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewFood {
    pub name: String,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub calories: Option<f64>,
    pub proteins: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub fats: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub salt: Option<f64>,
    pub image_url: Option<String>,
}

impl Food {
    pub const DEFAULT_UNIT: &'static str = "g";

    #[must_use]
    pub fn new(fields: NewFood, created_by: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: FoodId::new(),
            name: fields.name,
            brand: fields.brand,
            barcode: fields.barcode,
            category: fields.category,
            unit: fields.unit.unwrap_or_else(|| Self::DEFAULT_UNIT.to_string()),
            calories: fields.calories,
            proteins: fields.proteins,
            carbohydrates: fields.carbohydrates,
            fats: fields.fats,
            fiber: fields.fiber,
            sugar: fields.sugar,
            salt: fields.salt,
            image_url: fields.image_url,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Macro nutrients per 100 units, missing values counted as zero.
    #[must_use]
    pub fn nutrients(&self) -> Nutrients {
        Nutrients {
            calories: self.calories.unwrap_or_default(),
            proteins: self.proteins.unwrap_or_default(),
            carbohydrates: self.carbohydrates.unwrap_or_default(),
            fats: self.fats.unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn is_created_by(&self, user: UserId) -> bool {
        self.created_by == user
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_food_defaults_unit() {
        let owner = UserId::new();
        let food = Food::new(
            NewFood {
                name: "Oats".to_string(),
                calories: Some(389.0),
                ..NewFood::default()
            },
            owner,
        );
        assert_eq!(food.unit, "g");
        assert!(food.is_created_by(owner));
        assert!(!food.is_created_by(UserId::new()));
    }

    #[test]
    fn test_nutrients_treat_missing_as_zero() {
        let food = Food::new(
            NewFood {
                name: "Water".to_string(),
                unit: Some("ml".to_string()),
                proteins: Some(0.5),
                ..NewFood::default()
            },
            UserId::new(),
        );
        let n = food.nutrients();
        assert!((n.calories - 0.0).abs() < f64::EPSILON);
        assert!((n.proteins - 0.5).abs() < f64::EPSILON);
    }
}
