//! Food catalog service implementation.

use crate::dto::{
    BarcodeLookupResponse, CountResponse, CreateFoodRequest, FoodDetailsResponse, FoodListResponse,
    FoodResponse, UpdateFoodRequest,
};
use crate::food_service::FoodService;
use crate::open_food_facts::OpenFoodFactsClient;
use async_trait::async_trait;
use larder_core::{rules, Food, FoodId, LarderError, LarderResult, PageRequest, UserId, ValidateExt};
use larder_repository::{FoodFilter, FoodRepository};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct FoodServiceImpl {
    foods: Arc<dyn FoodRepository>,
    open_food_facts: Arc<dyn OpenFoodFactsClient>,
}

impl FoodServiceImpl {
    pub fn new(foods: Arc<dyn FoodRepository>, open_food_facts: Arc<dyn OpenFoodFactsClient>) -> Self {
        Self { foods, open_food_facts }
    }

    async fn load(&self, id: FoodId) -> LarderResult<Food> {
        self.foods
            .find_by_id(id)
            .await?
            .ok_or_else(|| LarderError::not_found("Food", id))
    }

    async fn ensure_barcode_free(&self, barcode: &str, except: Option<FoodId>) -> LarderResult<()> {
        match self.foods.find_by_barcode(barcode).await? {
            Some(existing) if Some(existing.id) != except => Err(LarderError::Conflict(format!(
                "A food with barcode '{barcode}' already exists"
            ))),
            _ => Ok(()),
        }
    }
}

fn check_barcode(barcode: &str) -> LarderResult<()> {
    rules::valid_barcode(barcode).map_err(|_| LarderError::validation("barcode: Barcode must be 8-14 digits"))
}

#[async_trait]
impl FoodService for FoodServiceImpl {
    async fn list(&self, filter: FoodFilter, page: PageRequest) -> LarderResult<FoodListResponse> {
        debug!("Listing foods, page: {}, size: {}", page.page, page.size);
        let foods = self.foods.find_all(&filter, page).await?;
        Ok(FoodListResponse::from(foods))
    }

    async fn count(&self, filter: FoodFilter) -> LarderResult<CountResponse> {
        let count = self.foods.count(&filter).await?;
        Ok(CountResponse { count })
    }

    async fn get(&self, id: FoodId, include_open_food_facts: bool) -> LarderResult<FoodDetailsResponse> {
        debug!("Getting food: {}", id);

        let food = self.load(id).await?;

        let open_food_facts = match (&food.barcode, include_open_food_facts) {
            (Some(barcode), true) => match self.open_food_facts.find_product(barcode).await {
                Ok(product) => product,
                Err(e) => {
                    warn!(food_id = %id, error = %e, "OpenFoodFacts enrichment failed");
                    None
                }
            },
            _ => None,
        };

        Ok(FoodDetailsResponse {
            food: FoodResponse::from(food),
            open_food_facts,
        })
    }

    async fn get_by_barcode(&self, barcode: &str) -> LarderResult<BarcodeLookupResponse> {
        debug!("Looking up barcode: {}", barcode);

        check_barcode(barcode)?;

        if let Some(food) = self.foods.find_by_barcode(barcode).await? {
            return Ok(BarcodeLookupResponse {
                food: Some(FoodResponse::from(food)),
                open_food_facts: None,
            });
        }

        let product = self
            .open_food_facts
            .find_product(barcode)
            .await?
            .ok_or_else(|| LarderError::not_found("Food", barcode))?;

        Ok(BarcodeLookupResponse {
            food: None,
            open_food_facts: Some(product),
        })
    }

    async fn create(&self, user: UserId, request: CreateFoodRequest) -> LarderResult<FoodResponse> {
        debug!("Creating food: {}", request.name);

        request.validate_request()?;

        if let Some(barcode) = request.barcode.as_deref() {
            self.ensure_barcode_free(barcode, None).await?;
        }

        let food = Food::new(request.into(), user);
        let saved = self.foods.save(&food).await?;

        info!("Food created: {}", saved.id);
        Ok(FoodResponse::from(saved))
    }

    async fn import_from_open_food_facts(&self, user: UserId, barcode: &str) -> LarderResult<FoodResponse> {
        debug!("Importing barcode from OpenFoodFacts: {}", barcode);

        check_barcode(barcode)?;
        self.ensure_barcode_free(barcode, None).await?;

        let product = self
            .open_food_facts
            .find_product(barcode)
            .await?
            .ok_or_else(|| LarderError::not_found("OpenFoodFacts product", barcode))?;

        let food = Food::new(product.to_new_food(), user);
        let saved = self.foods.save(&food).await?;

        info!(food_id = %saved.id, barcode, "Food imported from OpenFoodFacts");
        Ok(FoodResponse::from(saved))
    }

    async fn update(&self, user: UserId, id: FoodId, request: UpdateFoodRequest) -> LarderResult<FoodResponse> {
        debug!("Updating food: {}", id);

        request.validate_request()?;

        let mut food = self.load(id).await?;
        if !food.is_created_by(user) {
            return Err(LarderError::forbidden("Only the creator can update this food"));
        }

        if let Some(barcode) = request.barcode.as_deref() {
            self.ensure_barcode_free(barcode, Some(id)).await?;
        }

        request.apply(&mut food);
        let updated = self.foods.update(&food).await?;

        info!("Food updated: {}", id);
        Ok(FoodResponse::from(updated))
    }

    async fn delete(&self, user: UserId, id: FoodId) -> LarderResult<()> {
        debug!("Deleting food: {}", id);

        let food = self.load(id).await?;
        if !food.is_created_by(user) {
            return Err(LarderError::forbidden("Only the creator can delete this food"));
        }

        self.foods.delete(id).await?;

        info!("Food deleted: {}", id);
        Ok(())
    }
}

impl std::fmt::Debug for FoodServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoodServiceImpl").finish_non_exhaustive()
    }
}
