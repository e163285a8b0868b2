//! Pantry service trait definition.

use crate::dto::{
    AddPantryItemRequest, CreatePantryRequest, PantryItemResponse, PantryResponse,
    UpdatePantryItemRequest, UpdatePantryRequest,
};
use async_trait::async_trait;
use larder_core::{Interface, LarderResult, PantryId, PantryItemId, UserId};

/// Pantry service trait.
///
/// A pantry is visible to its owner and, when shared, to every member of its
/// group. Pantries the caller cannot see are reported as not found.
#[async_trait]
pub trait PantryService: Interface + Send + Sync {
    async fn list(&self, user: UserId) -> LarderResult<Vec<PantryResponse>>;

    async fn get(&self, user: UserId, id: PantryId) -> LarderResult<PantryResponse>;

    async fn create(&self, user: UserId, request: CreatePantryRequest) -> LarderResult<PantryResponse>;

    /// Owner only.
    async fn update(&self, user: UserId, id: PantryId, request: UpdatePantryRequest) -> LarderResult<PantryResponse>;

    /// Owner only.
    async fn delete(&self, user: UserId, id: PantryId) -> LarderResult<()>;

    async fn list_items(&self, user: UserId, pantry: PantryId) -> LarderResult<Vec<PantryItemResponse>>;

    async fn add_item(
        &self,
        user: UserId,
        pantry: PantryId,
        request: AddPantryItemRequest,
    ) -> LarderResult<PantryItemResponse>;

    async fn update_item(
        &self,
        user: UserId,
        pantry: PantryId,
        item: PantryItemId,
        request: UpdatePantryItemRequest,
    ) -> LarderResult<PantryItemResponse>;

    async fn remove_item(&self, user: UserId, pantry: PantryId, item: PantryItemId) -> LarderResult<()>;
}
