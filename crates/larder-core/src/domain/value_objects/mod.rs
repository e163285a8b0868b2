//! Value objects.

mod meal_type;
mod nutrients;

pub use meal_type::MealType;
pub use nutrients::Nutrients;
