//! Shopping list service implementation.

use super::access::{is_member, load_accessible_pantry, require_member};
use crate::dto::{
    CheckItemRequest, ClearCheckedResponse, CreateShoppingListItemRequest, ShoppingListItemResponse,
    UpdateShoppingListItemRequest,
};
use crate::shopping_list_service::ShoppingListService;
use async_trait::async_trait;
use larder_core::{
    GroupId, LarderError, LarderResult, PantryId, PantryItem, ShoppingListItem, ShoppingListItemId, UserId,
    ValidateExt,
};
use larder_repository::{
    FoodRepository, GroupRepository, PantryRepository, ShoppingListFilter, ShoppingListRepository,
};
use std::sync::Arc;
use tracing::{debug, info};

pub struct ShoppingListServiceImpl {
    items: Arc<dyn ShoppingListRepository>,
    foods: Arc<dyn FoodRepository>,
    pantries: Arc<dyn PantryRepository>,
    groups: Arc<dyn GroupRepository>,
}

impl ShoppingListServiceImpl {
    pub fn new(
        items: Arc<dyn ShoppingListRepository>,
        foods: Arc<dyn FoodRepository>,
        pantries: Arc<dyn PantryRepository>,
        groups: Arc<dyn GroupRepository>,
    ) -> Self {
        Self {
            items,
            foods,
            pantries,
            groups,
        }
    }

    /// Loads an item the caller owns, or that belongs to one of the caller's groups.
    async fn accessible(&self, user: UserId, id: ShoppingListItemId) -> LarderResult<ShoppingListItem> {
        let item = self
            .items
            .find_by_id(id)
            .await?
            .ok_or_else(|| LarderError::not_found("Shopping list item", id))?;

        let visible = match item.group_id {
            Some(group) => is_member(self.groups.as_ref(), group, user).await?,
            None => item.owner_id == user,
        };
        if !visible {
            return Err(LarderError::not_found("Shopping list item", id));
        }
        Ok(item)
    }

    /// Stocks a bought item into a pantry. Items without a food are skipped.
    async fn stock(&self, user: UserId, item: &ShoppingListItem, pantry: PantryId) -> LarderResult<()> {
        let pantry = load_accessible_pantry(self.pantries.as_ref(), self.groups.as_ref(), pantry, user).await?;

        let Some(food_id) = item.food_id else {
            return Ok(());
        };
        let food = self
            .foods
            .find_by_id(food_id)
            .await?
            .ok_or_else(|| LarderError::not_found("Food", food_id))?;

        let stocked = PantryItem::new(
            pantry.id,
            food.id,
            item.quantity,
            item.unit.clone().unwrap_or(food.unit),
            None,
            user,
        );
        self.pantries.save_item(&stocked).await?;

        info!(pantry_id = %pantry.id, item_id = %item.id, "Stocked bought item into pantry");
        Ok(())
    }
}

#[async_trait]
impl ShoppingListService for ShoppingListServiceImpl {
    async fn list(&self, user: UserId, filter: ShoppingListFilter) -> LarderResult<Vec<ShoppingListItemResponse>> {
        if let Some(group) = filter.group_id {
            require_member(self.groups.as_ref(), group, user).await?;
        }
        let items = self.items.find_accessible(user, filter).await?;
        Ok(items.into_iter().map(ShoppingListItemResponse::from).collect())
    }

    async fn create(
        &self,
        user: UserId,
        request: CreateShoppingListItemRequest,
    ) -> LarderResult<ShoppingListItemResponse> {
        request.validate_request()?;

        if let Some(group) = request.group_id {
            if !is_member(self.groups.as_ref(), group, user).await? {
                return Err(LarderError::forbidden("You are not a member of this group"));
            }
        }

        let food = match request.food_id {
            Some(food_id) => Some(
                self.foods
                    .find_by_id(food_id)
                    .await?
                    .ok_or_else(|| LarderError::not_found("Food", food_id))?,
            ),
            None => None,
        };

        let name = match (request.name, &food) {
            (Some(name), _) => name.trim().to_string(),
            (None, Some(food)) => food.name.clone(),
            (None, None) => return Err(LarderError::validation("name: Either name or foodId is required")),
        };

        let mut item = ShoppingListItem::new(user, request.group_id, request.food_id, name, request.quantity);
        item.unit = request.unit;
        item.note = request.note;

        let saved = self.items.save(&item).await?;

        info!("Shopping list item created: {}", saved.id);
        Ok(ShoppingListItemResponse::from(saved))
    }

    async fn update(
        &self,
        user: UserId,
        id: ShoppingListItemId,
        request: UpdateShoppingListItemRequest,
    ) -> LarderResult<ShoppingListItemResponse> {
        request.validate_request()?;

        let mut item = self.accessible(user, id).await?;
        request.apply(&mut item);

        let updated = self.items.update(&item).await?;
        Ok(ShoppingListItemResponse::from(updated))
    }

    async fn delete(&self, user: UserId, id: ShoppingListItemId) -> LarderResult<()> {
        self.accessible(user, id).await?;
        self.items.delete(id).await?;

        info!("Shopping list item deleted: {}", id);
        Ok(())
    }

    async fn check(
        &self,
        user: UserId,
        id: ShoppingListItemId,
        request: CheckItemRequest,
    ) -> LarderResult<ShoppingListItemResponse> {
        debug!("Checking shopping list item: {}", id);

        let mut item = self.accessible(user, id).await?;
        if item.checked {
            return Err(LarderError::Conflict("Item is already checked".to_string()));
        }

        if let Some(pantry) = request.pantry_id {
            self.stock(user, &item, pantry).await?;
        }

        item.check(user)?;
        let updated = self.items.update(&item).await?;
        Ok(ShoppingListItemResponse::from(updated))
    }

    async fn uncheck(&self, user: UserId, id: ShoppingListItemId) -> LarderResult<ShoppingListItemResponse> {
        let mut item = self.accessible(user, id).await?;
        item.uncheck()?;

        let updated = self.items.update(&item).await?;
        Ok(ShoppingListItemResponse::from(updated))
    }

    async fn clear_checked(&self, user: UserId, group: Option<GroupId>) -> LarderResult<ClearCheckedResponse> {
        if let Some(group) = group {
            require_member(self.groups.as_ref(), group, user).await?;
        }

        let deleted = self.items.delete_checked(user, group).await?;

        info!(deleted, "Cleared checked shopping list items");
        Ok(ClearCheckedResponse { deleted })
    }
}

impl std::fmt::Debug for ShoppingListServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShoppingListServiceImpl").finish_non_exhaustive()
    }
}
