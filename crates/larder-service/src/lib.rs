//! # Larder Service
//!
//! Business services for the household food domain, the OpenFoodFacts
//! client, and the cache core used by the HTTP layer.

pub mod cache;
pub mod dto;
pub mod food_service;
pub mod group_service;
pub mod r#impl;
pub mod meal_service;
pub mod open_food_facts;
pub mod pantry_service;
pub mod shopping_list_service;
pub mod user_service;

#[cfg(test)]
mod testing;

pub use cache::*;
pub use dto::*;
pub use food_service::*;
pub use group_service::*;
pub use meal_service::*;
pub use open_food_facts::*;
pub use pantry_service::*;
pub use r#impl::*;
pub use shopping_list_service::*;
pub use user_service::*;
