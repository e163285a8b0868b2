//! Data Transfer Objects.

mod food_dto;
mod group_dto;
mod meal_dto;
mod pantry_dto;
mod shopping_list_dto;
mod user_dto;

pub use food_dto::*;
pub use group_dto::*;
pub use meal_dto::*;
pub use pantry_dto::*;
pub use shopping_list_dto::*;
pub use user_dto::*;
