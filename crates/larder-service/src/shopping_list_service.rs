//! Shopping list service trait definition.

use crate::dto::{
    CheckItemRequest, ClearCheckedResponse, CreateShoppingListItemRequest, ShoppingListItemResponse,
    UpdateShoppingListItemRequest,
};
use async_trait::async_trait;
use larder_core::{GroupId, Interface, LarderResult, ShoppingListItemId, UserId};
use larder_repository::ShoppingListFilter;

/// Shopping list service trait.
#[async_trait]
pub trait ShoppingListService: Interface + Send + Sync {
    /// Personal items plus the items of the user's groups.
    async fn list(&self, user: UserId, filter: ShoppingListFilter) -> LarderResult<Vec<ShoppingListItemResponse>>;

    async fn create(
        &self,
        user: UserId,
        request: CreateShoppingListItemRequest,
    ) -> LarderResult<ShoppingListItemResponse>;

    async fn update(
        &self,
        user: UserId,
        id: ShoppingListItemId,
        request: UpdateShoppingListItemRequest,
    ) -> LarderResult<ShoppingListItemResponse>;

    async fn delete(&self, user: UserId, id: ShoppingListItemId) -> LarderResult<()>;

    /// Marks an item bought, optionally stocking it into a pantry.
    async fn check(
        &self,
        user: UserId,
        id: ShoppingListItemId,
        request: CheckItemRequest,
    ) -> LarderResult<ShoppingListItemResponse>;

    async fn uncheck(&self, user: UserId, id: ShoppingListItemId) -> LarderResult<ShoppingListItemResponse>;

    /// Removes checked items from the personal list or from a group's list.
    async fn clear_checked(&self, user: UserId, group: Option<GroupId>) -> LarderResult<ClearCheckedResponse>;
}
