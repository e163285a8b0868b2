//! Food catalog service trait definition.

use crate::dto::{
    BarcodeLookupResponse, CountResponse, CreateFoodRequest, FoodDetailsResponse, FoodListResponse,
    FoodResponse, UpdateFoodRequest,
};
use async_trait::async_trait;
use larder_core::{FoodId, Interface, LarderResult, PageRequest, UserId};
use larder_repository::FoodFilter;

/// Food catalog service trait.
#[async_trait]
pub trait FoodService: Interface + Send + Sync {
    async fn list(&self, filter: FoodFilter, page: PageRequest) -> LarderResult<FoodListResponse>;

    async fn count(&self, filter: FoodFilter) -> LarderResult<CountResponse>;

    /// Gets a food, optionally enriched with OpenFoodFacts data.
    ///
    /// Enrichment failures are logged and leave the food unenriched.
    async fn get(&self, id: FoodId, include_open_food_facts: bool) -> LarderResult<FoodDetailsResponse>;

    /// Looks a barcode up locally, then on OpenFoodFacts.
    async fn get_by_barcode(&self, barcode: &str) -> LarderResult<BarcodeLookupResponse>;

    async fn create(&self, user: UserId, request: CreateFoodRequest) -> LarderResult<FoodResponse>;

    /// Creates a catalog food from an OpenFoodFacts product.
    async fn import_from_open_food_facts(&self, user: UserId, barcode: &str) -> LarderResult<FoodResponse>;

    /// Only the creator may update a food.
    async fn update(&self, user: UserId, id: FoodId, request: UpdateFoodRequest) -> LarderResult<FoodResponse>;

    /// Only the creator may delete a food.
    async fn delete(&self, user: UserId, id: FoodId) -> LarderResult<()>;
}
