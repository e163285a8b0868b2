//! Composition root.
//!
//! Wires repositories, services, the shared cache store and the HTTP cache
//! into the state the REST layer runs on. Every long-lived component is
//! resolved once here and shared behind `Arc<dyn Trait>`.

use larder_config::{AppConfig, CacheBackend, CacheConfig};
use larder_core::LarderResult;
use larder_repository::{
    DatabasePool, FoodRepository, GroupRepository, MealLogRepository, PantryRepository, PgFoodRepository,
    PgGroupRepository, PgMealLogRepository, PgPantryRepository, PgShoppingListRepository, PgUserRepository,
    ShoppingListRepository, UserRepository,
};
use larder_rest::{create_router, middleware::HttpCache, AppState};
use larder_security::TokenProvider;
use larder_service::{
    CacheInterface, FoodService, FoodServiceImpl, GroupService, GroupServiceImpl, HttpOpenFoodFactsClient, MealService,
    MealServiceImpl, MemoryCacheStore, OpenFoodFactsClient, PantryService, PantryServiceImpl, RedisCacheService,
    ShoppingListService, ShoppingListServiceImpl, UserService, UserServiceImpl,
};
use std::sync::Arc;
use tracing::info;

/// Builds the cache store selected by `config.backend`.
///
/// The store is created even when the response cache is disabled, since
/// identity lookups go through it as well.
pub fn build_cache_store(config: &CacheConfig) -> LarderResult<Arc<dyn CacheInterface>> {
    let store: Arc<dyn CacheInterface> = match config.backend {
        CacheBackend::Memory => Arc::new(MemoryCacheStore::with_capacity(config.max_entries)),
        CacheBackend::Redis => Arc::new(RedisCacheService::connect(config)?),
    };
    info!(backend = ?config.backend, enabled = config.enabled, "Cache store ready");
    Ok(store)
}

/// Fully wired application.
pub struct AppModule {
    state: AppState,
    token_provider: Arc<TokenProvider>,
}

impl AppModule {
    #[must_use]
    pub fn builder() -> AppModuleBuilder {
        AppModuleBuilder::new()
    }

    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub fn token_provider(&self) -> Arc<TokenProvider> {
        self.token_provider.clone()
    }

    pub fn user_service(&self) -> Arc<dyn UserService> {
        self.state.user_service.clone()
    }

    pub fn cache_store(&self) -> Arc<dyn CacheInterface> {
        self.state.cache_store.clone()
    }

    /// The complete HTTP application.
    pub fn router(&self, config: &AppConfig) -> axum::Router {
        create_router(self.state.clone(), self.token_provider(), &config.server)
    }
}

/// Collects the externally created resources an [`AppModule`] needs.
///
/// Only the database pool is mandatory; the cache store and the
/// OpenFoodFacts client are built from configuration unless supplied.
#[derive(Default)]
pub struct AppModuleBuilder {
    database: Option<DatabasePool>,
    cache_store: Option<Arc<dyn CacheInterface>>,
    open_food_facts: Option<Arc<dyn OpenFoodFactsClient>>,
}

impl AppModuleBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_database_pool(mut self, database: DatabasePool) -> Self {
        self.database = Some(database);
        self
    }

    #[must_use]
    pub fn with_cache_store(mut self, store: Arc<dyn CacheInterface>) -> Self {
        self.cache_store = Some(store);
        self
    }

    #[must_use]
    pub fn with_open_food_facts(mut self, client: Arc<dyn OpenFoodFactsClient>) -> Self {
        self.open_food_facts = Some(client);
        self
    }

    pub fn build(self, config: &AppConfig) -> LarderResult<AppModule> {
        let database = self
            .database
            .ok_or_else(|| larder_core::LarderError::Configuration("Database pool not provided".to_string()))?;

        let cache_store = match self.cache_store {
            Some(store) => store,
            None => build_cache_store(&config.cache)?,
        };
        let open_food_facts: Arc<dyn OpenFoodFactsClient> = match self.open_food_facts {
            Some(client) => client,
            None => Arc::new(HttpOpenFoodFactsClient::new(&config.open_food_facts)?),
        };
        let token_provider = Arc::new(TokenProvider::new(&config.security)?);

        let pool = database.inner();
        let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
        let foods: Arc<dyn FoodRepository> = Arc::new(PgFoodRepository::new(pool.clone()));
        let pantries: Arc<dyn PantryRepository> = Arc::new(PgPantryRepository::new(pool.clone()));
        let shopping_list: Arc<dyn ShoppingListRepository> = Arc::new(PgShoppingListRepository::new(pool.clone()));
        let meals: Arc<dyn MealLogRepository> = Arc::new(PgMealLogRepository::new(pool.clone()));
        let groups: Arc<dyn GroupRepository> = Arc::new(PgGroupRepository::new(pool));

        let user_service: Arc<dyn UserService> = Arc::new(UserServiceImpl::new(users.clone(), cache_store.clone()));
        let food_service: Arc<dyn FoodService> = Arc::new(FoodServiceImpl::new(foods.clone(), open_food_facts));
        let pantry_service: Arc<dyn PantryService> =
            Arc::new(PantryServiceImpl::new(pantries.clone(), foods.clone(), groups.clone()));
        let shopping_list_service: Arc<dyn ShoppingListService> = Arc::new(ShoppingListServiceImpl::new(
            shopping_list,
            foods.clone(),
            pantries.clone(),
            groups.clone(),
        ));
        let meal_service: Arc<dyn MealService> =
            Arc::new(MealServiceImpl::new(meals, foods, pantries, groups.clone()));
        let group_service: Arc<dyn GroupService> = Arc::new(GroupServiceImpl::new(groups, users));

        let state = AppState {
            user_service,
            food_service,
            pantry_service,
            shopping_list_service,
            meal_service,
            group_service,
            http_cache: HttpCache::new(cache_store.clone(), &config.cache),
            cache_store,
            database,
        };

        Ok(AppModule { state, token_provider })
    }
}
