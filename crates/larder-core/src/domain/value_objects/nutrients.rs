//! Nutrient values per 100 units of a food.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Nutrient amounts. On a food they are per 100 g/ml; on a summary they are totals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Nutrients {
    pub calories: f64,
    pub proteins: f64,
    pub carbohydrates: f64,
    pub fats: f64,
}

impl Nutrients {
    /// Scales per-100 values to the given consumed quantity.
    #[must_use]
    pub fn for_quantity(&self, quantity: f64) -> Self {
        let factor = quantity / 100.0;
        Self {
            calories: self.calories * factor,
            proteins: self.proteins * factor,
            carbohydrates: self.carbohydrates * factor,
            fats: self.fats * factor,
        }
    }

    /// Rounds every value to two decimals for presentation.
    #[must_use]
    pub fn rounded(&self) -> Self {
        let round = |v: f64| (v * 100.0).round() / 100.0;
        Self {
            calories: round(self.calories),
            proteins: round(self.proteins),
            carbohydrates: round(self.carbohydrates),
            fats: round(self.fats),
        }
    }
}

impl AddAssign for Nutrients {
    fn add_assign(&mut self, rhs: Self) {
        self.calories += rhs.calories;
        self.proteins += rhs.proteins;
        self.carbohydrates += rhs.carbohydrates;
        self.fats += rhs.fats;
    }
}
