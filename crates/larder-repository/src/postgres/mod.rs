//! PostgreSQL repository implementations.

mod food_repository;
mod group_repository;
mod meal_log_repository;
mod pantry_repository;
mod shopping_list_repository;
mod user_repository;

pub use food_repository::PgFoodRepository;
pub use group_repository::PgGroupRepository;
pub use meal_log_repository::PgMealLogRepository;
pub use pantry_repository::PgPantryRepository;
pub use shopping_list_repository::PgShoppingListRepository;
pub use user_repository::PgUserRepository;
