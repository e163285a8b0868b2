//! Application state for Axum handlers.

use crate::middleware::HttpCache;
use larder_repository::DatabasePool;
use larder_service::{
    CacheInterface, FoodService, GroupService, MealService, PantryService, ShoppingListService, UserService,
};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserService>,
    pub food_service: Arc<dyn FoodService>,
    pub pantry_service: Arc<dyn PantryService>,
    pub shopping_list_service: Arc<dyn ShoppingListService>,
    pub meal_service: Arc<dyn MealService>,
    pub group_service: Arc<dyn GroupService>,
    pub http_cache: HttpCache,
    /// Probed by the readiness check.
    pub cache_store: Arc<dyn CacheInterface>,
    pub database: DatabasePool,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("http_cache", &self.http_cache)
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}
