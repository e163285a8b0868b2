//! REST API controllers.

pub mod food_controller;
pub mod group_controller;
pub mod health_controller;
pub mod meal_controller;
pub mod pantry_controller;
pub mod shopping_list_controller;
pub mod user_controller;

pub use health_controller::*;
