//! Service implementations.
//!
//! Trait definitions live in the parent module (e.g. `food_service.rs`).

mod access;
pub mod food_service_impl;
pub mod group_service_impl;
pub mod meal_service_impl;
pub mod pantry_service_impl;
pub mod shopping_list_service_impl;
pub mod user_service_impl;

pub use food_service_impl::FoodServiceImpl;
pub use group_service_impl::GroupServiceImpl;
pub use meal_service_impl::MealServiceImpl;
pub use pantry_service_impl::PantryServiceImpl;
pub use shopping_list_service_impl::ShoppingListServiceImpl;
pub use user_service_impl::UserServiceImpl;
