//! Pantry service implementation.

use super::access::{is_member, load_accessible_pantry};
use crate::dto::{
    AddPantryItemRequest, CreatePantryRequest, PantryItemResponse, PantryResponse,
    UpdatePantryItemRequest, UpdatePantryRequest,
};
use crate::pantry_service::PantryService;
use async_trait::async_trait;
use larder_core::{
    LarderError, LarderResult, Pantry, PantryId, PantryItem, PantryItemId, UserId, ValidateExt,
};
use larder_repository::{FoodRepository, GroupRepository, PantryRepository};
use std::sync::Arc;
use tracing::{debug, info};

pub struct PantryServiceImpl {
    pantries: Arc<dyn PantryRepository>,
    foods: Arc<dyn FoodRepository>,
    groups: Arc<dyn GroupRepository>,
}

impl PantryServiceImpl {
    pub fn new(
        pantries: Arc<dyn PantryRepository>,
        foods: Arc<dyn FoodRepository>,
        groups: Arc<dyn GroupRepository>,
    ) -> Self {
        Self { pantries, foods, groups }
    }

    async fn accessible(&self, user: UserId, id: PantryId) -> LarderResult<Pantry> {
        load_accessible_pantry(self.pantries.as_ref(), self.groups.as_ref(), id, user).await
    }

    async fn owned(&self, user: UserId, id: PantryId) -> LarderResult<Pantry> {
        let pantry = self.accessible(user, id).await?;
        if !pantry.is_owned_by(user) {
            return Err(LarderError::forbidden("Only the owner can change this pantry"));
        }
        Ok(pantry)
    }

    async fn item_in(&self, pantry: PantryId, item: PantryItemId) -> LarderResult<PantryItem> {
        self.pantries
            .find_item(item)
            .await?
            .filter(|found| found.pantry_id == pantry)
            .ok_or_else(|| LarderError::not_found("Pantry item", item))
    }
}

#[async_trait]
impl PantryService for PantryServiceImpl {
    async fn list(&self, user: UserId) -> LarderResult<Vec<PantryResponse>> {
        let pantries = self.pantries.find_accessible(user).await?;
        Ok(pantries.into_iter().map(PantryResponse::from).collect())
    }

    async fn get(&self, user: UserId, id: PantryId) -> LarderResult<PantryResponse> {
        debug!("Getting pantry: {}", id);
        Ok(PantryResponse::from(self.accessible(user, id).await?))
    }

    async fn create(&self, user: UserId, request: CreatePantryRequest) -> LarderResult<PantryResponse> {
        debug!("Creating pantry: {}", request.name);

        request.validate_request()?;

        if let Some(group) = request.group_id {
            if !is_member(self.groups.as_ref(), group, user).await? {
                return Err(LarderError::forbidden("You are not a member of this group"));
            }
        }

        let name = request.name.trim().to_string();
        if self.pantries.exists_by_owner_and_name(user, &name, None).await? {
            return Err(LarderError::Conflict(format!("Pantry '{name}' already exists")));
        }

        let pantry = Pantry::new(name, request.description, user, request.group_id);
        let saved = self.pantries.save(&pantry).await?;

        info!("Pantry created: {}", saved.id);
        Ok(PantryResponse::from(saved))
    }

    async fn update(&self, user: UserId, id: PantryId, request: UpdatePantryRequest) -> LarderResult<PantryResponse> {
        debug!("Updating pantry: {}", id);

        request.validate_request()?;

        let mut pantry = self.owned(user, id).await?;

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if self.pantries.exists_by_owner_and_name(user, &name, Some(id)).await? {
                return Err(LarderError::Conflict(format!("Pantry '{name}' already exists")));
            }
            pantry.name = name;
        }
        if request.description.is_some() {
            pantry.description = request.description;
        }
        pantry.touch();

        let updated = self.pantries.update(&pantry).await?;

        info!("Pantry updated: {}", id);
        Ok(PantryResponse::from(updated))
    }

    async fn delete(&self, user: UserId, id: PantryId) -> LarderResult<()> {
        debug!("Deleting pantry: {}", id);

        self.owned(user, id).await?;
        self.pantries.delete(id).await?;

        info!("Pantry deleted: {}", id);
        Ok(())
    }

    async fn list_items(&self, user: UserId, pantry: PantryId) -> LarderResult<Vec<PantryItemResponse>> {
        self.accessible(user, pantry).await?;
        let items = self.pantries.find_items(pantry).await?;
        Ok(items.into_iter().map(PantryItemResponse::from).collect())
    }

    async fn add_item(
        &self,
        user: UserId,
        pantry: PantryId,
        request: AddPantryItemRequest,
    ) -> LarderResult<PantryItemResponse> {
        debug!("Adding food {} to pantry {}", request.food_id, pantry);

        request.validate_request()?;

        self.accessible(user, pantry).await?;
        let food = self
            .foods
            .find_by_id(request.food_id)
            .await?
            .ok_or_else(|| LarderError::not_found("Food", request.food_id))?;

        let item = PantryItem::new(
            pantry,
            food.id,
            request.quantity,
            request.unit.unwrap_or(food.unit),
            request.expiration_date,
            user,
        );
        let saved = self.pantries.save_item(&item).await?;

        info!("Pantry item added: {}", saved.id);
        Ok(PantryItemResponse::from(saved))
    }

    async fn update_item(
        &self,
        user: UserId,
        pantry: PantryId,
        item: PantryItemId,
        request: UpdatePantryItemRequest,
    ) -> LarderResult<PantryItemResponse> {
        request.validate_request()?;

        self.accessible(user, pantry).await?;
        let mut found = self.item_in(pantry, item).await?;
        request.apply(&mut found);

        let updated = self.pantries.update_item(&found).await?;
        Ok(PantryItemResponse::from(updated))
    }

    async fn remove_item(&self, user: UserId, pantry: PantryId, item: PantryItemId) -> LarderResult<()> {
        self.accessible(user, pantry).await?;
        self.item_in(pantry, item).await?;
        self.pantries.delete_item(item).await?;

        info!("Pantry item removed: {}", item);
        Ok(())
    }
}

impl std::fmt::Debug for PantryServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PantryServiceImpl").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryDb;
    use larder_core::FoodId;

    fn service(db: &Arc<InMemoryDb>) -> PantryServiceImpl {
        PantryServiceImpl::new(db.clone(), db.clone(), db.clone())
    }

    #[tokio::test]
    async fn test_shared_pantry_visible_to_group_members() {
        let db = InMemoryDb::new();
        let owner = db.insert_user("kc-1", "ada");
        let member = db.insert_user("kc-2", "bob");
        let stranger = db.insert_user("kc-3", "eve");
        let group = db.insert_group("Flat", owner.id);
        db.add_member(group.id, member.id, false);
        let shared = db.insert_pantry("Kitchen", owner.id, Some(group.id));
        db.insert_pantry("Private", owner.id, None);
        let service = service(&db);

        let seen = service.list(member.id).await.unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].id, shared.id);

        assert!(service.get(member.id, shared.id).await.is_ok());
        let err = service.get(stranger.id, shared.id).await.unwrap_err();
        assert!(matches!(err, LarderError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_only_owner_can_update_or_delete() {
        let db = InMemoryDb::new();
        let owner = db.insert_user("kc-1", "ada");
        let member = db.insert_user("kc-2", "bob");
        let group = db.insert_group("Flat", owner.id);
        db.add_member(group.id, member.id, false);
        let pantry = db.insert_pantry("Kitchen", owner.id, Some(group.id));
        let service = service(&db);

        let err = service
            .update(member.id, pantry.id, UpdatePantryRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, LarderError::Forbidden(_)));

        let err = service.delete(member.id, pantry.id).await.unwrap_err();
        assert!(matches!(err, LarderError::Forbidden(_)));

        service.delete(owner.id, pantry.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_rules() {
        let db = InMemoryDb::new();
        let user = db.insert_user("kc-1", "ada");
        let other = db.insert_user("kc-2", "bob");
        let foreign_group = db.insert_group("Elsewhere", other.id);
        let service = service(&db);

        service
            .create(
                user.id,
                CreatePantryRequest {
                    name: "Fridge".to_string(),
                    ..CreatePantryRequest::default()
                },
            )
            .await
            .unwrap();

        let err = service
            .create(
                user.id,
                CreatePantryRequest {
                    name: "Fridge".to_string(),
                    ..CreatePantryRequest::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LarderError::Conflict(_)));

        let err = service
            .create(
                user.id,
                CreatePantryRequest {
                    name: "Shared".to_string(),
                    group_id: Some(foreign_group.id),
                    ..CreatePantryRequest::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LarderError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_add_item_defaults_unit_to_food_unit() {
        let db = InMemoryDb::new();
        let user = db.insert_user("kc-1", "ada");
        let food = db.insert_food("Flour", None, user.id);
        let pantry = db.insert_pantry("Cupboard", user.id, None);
        let service = service(&db);

        let item = service
            .add_item(
                user.id,
                pantry.id,
                AddPantryItemRequest {
                    food_id: food.id,
                    quantity: 500.0,
                    ..AddPantryItemRequest::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(item.unit, "g");

        let err = service
            .add_item(
                user.id,
                pantry.id,
                AddPantryItemRequest {
                    food_id: FoodId::new(),
                    quantity: 1.0,
                    ..AddPantryItemRequest::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LarderError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_item_must_belong_to_pantry() {
        let db = InMemoryDb::new();
        let user = db.insert_user("kc-1", "ada");
        let food = db.insert_food("Flour", None, user.id);
        let first = db.insert_pantry("One", user.id, None);
        let second = db.insert_pantry("Two", user.id, None);
        let item = db.insert_pantry_item(first.id, food.id, 100.0, user.id);
        let service = service(&db);

        let err = service.remove_item(user.id, second.id, item.id).await.unwrap_err();
        assert!(matches!(err, LarderError::NotFound { .. }));

        let updated = service
            .update_item(
                user.id,
                first.id,
                item.id,
                UpdatePantryItemRequest {
                    quantity: Some(50.0),
                    ..UpdatePantryItemRequest::default()
                },
            )
            .await
            .unwrap();
        assert!((updated.quantity - 50.0).abs() < f64::EPSILON);

        service.remove_item(user.id, first.id, item.id).await.unwrap();
        assert!(db.pantry_item(item.id).is_none());
    }
}
