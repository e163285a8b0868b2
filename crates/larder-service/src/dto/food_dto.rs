//! Food catalog DTOs.

use crate::open_food_facts::OpenFoodFactsProduct;
use chrono::{DateTime, Utc};
use larder_core::{Food, FoodId, NewFood, Page, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Request to add a food to the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateFoodRequest {
    #[validate(
        length(min = 1, max = 200, message = "Name must be 1-200 characters"),
        custom(function = "larder_core::rules::not_blank", message = "Name must not be blank")
    )]
    pub name: String,

    #[validate(length(max = 200))]
    pub brand: Option<String>,

    #[validate(custom(function = "larder_core::rules::valid_barcode", message = "Barcode must be 8-14 digits"))]
    pub barcode: Option<String>,

    #[validate(length(max = 100))]
    pub category: Option<String>,

    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,

    #[validate(custom(function = "larder_core::rules::non_negative"))]
    pub calories: Option<f64>,
    #[validate(custom(function = "larder_core::rules::non_negative"))]
    pub proteins: Option<f64>,
    #[validate(custom(function = "larder_core::rules::non_negative"))]
    pub carbohydrates: Option<f64>,
    #[validate(custom(function = "larder_core::rules::non_negative"))]
    pub fats: Option<f64>,
    #[validate(custom(function = "larder_core::rules::non_negative"))]
    pub fiber: Option<f64>,
    #[validate(custom(function = "larder_core::rules::non_negative"))]
    pub sugar: Option<f64>,
    #[validate(custom(function = "larder_core::rules::non_negative"))]
    pub salt: Option<f64>,

    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
}

impl From<CreateFoodRequest> for NewFood {
    fn from(request: CreateFoodRequest) -> Self {
        Self {
            name: request.name.trim().to_string(),
            brand: request.brand,
            barcode: request.barcode,
            category: request.category,
            unit: request.unit,
            calories: request.calories,
            proteins: request.proteins,
            carbohydrates: request.carbohydrates,
            fats: request.fats,
            fiber: request.fiber,
            sugar: request.sugar,
            salt: request.salt,
            image_url: request.image_url,
        }
    }
}

/// Partial update of a food; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFoodRequest {
    #[validate(
        length(min = 1, max = 200, message = "Name must be 1-200 characters"),
        custom(function = "larder_core::rules::not_blank", message = "Name must not be blank")
    )]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub brand: Option<String>,
    #[validate(custom(function = "larder_core::rules::valid_barcode", message = "Barcode must be 8-14 digits"))]
    pub barcode: Option<String>,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,
    #[validate(custom(function = "larder_core::rules::non_negative"))]
    pub calories: Option<f64>,
    #[validate(custom(function = "larder_core::rules::non_negative"))]
    pub proteins: Option<f64>,
    #[validate(custom(function = "larder_core::rules::non_negative"))]
    pub carbohydrates: Option<f64>,
    #[validate(custom(function = "larder_core::rules::non_negative"))]
    pub fats: Option<f64>,
    #[validate(custom(function = "larder_core::rules::non_negative"))]
    pub fiber: Option<f64>,
    #[validate(custom(function = "larder_core::rules::non_negative"))]
    pub sugar: Option<f64>,
    #[validate(custom(function = "larder_core::rules::non_negative"))]
    pub salt: Option<f64>,
    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
}

impl UpdateFoodRequest {
    pub fn apply(self, food: &mut Food) {
        if let Some(name) = self.name {
            food.name = name.trim().to_string();
        }
        if let Some(unit) = self.unit {
            food.unit = unit;
        }
        if self.brand.is_some() {
            food.brand = self.brand;
        }
        if self.barcode.is_some() {
            food.barcode = self.barcode;
        }
        if self.category.is_some() {
            food.category = self.category;
        }
        if self.calories.is_some() {
            food.calories = self.calories;
        }
        if self.proteins.is_some() {
            food.proteins = self.proteins;
        }
        if self.carbohydrates.is_some() {
            food.carbohydrates = self.carbohydrates;
        }
        if self.fats.is_some() {
            food.fats = self.fats;
        }
        if self.fiber.is_some() {
            food.fiber = self.fiber;
        }
        if self.sugar.is_some() {
            food.sugar = self.sugar;
        }
        if self.salt.is_some() {
            food.salt = self.salt;
        }
        if self.image_url.is_some() {
            food.image_url = self.image_url;
        }
        food.touch();
    }
}

/// Food response DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FoodResponse {
    pub id: FoodId,
    pub name: String,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub category: Option<String>,
    pub unit: String,
    pub calories: Option<f64>,
    pub proteins: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub fats: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub salt: Option<f64>,
    pub image_url: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Food> for FoodResponse {
    fn from(food: Food) -> Self {
        Self {
            id: food.id,
            name: food.name,
            brand: food.brand,
            barcode: food.barcode,
            category: food.category,
            unit: food.unit,
            calories: food.calories,
            proteins: food.proteins,
            carbohydrates: food.carbohydrates,
            fats: food.fats,
            fiber: food.fiber,
            sugar: food.sugar,
            salt: food.salt,
            image_url: food.image_url,
            created_by: food.created_by,
            created_at: food.created_at,
            updated_at: food.updated_at,
        }
    }
}

/// A food, optionally enriched with its OpenFoodFacts product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FoodDetailsResponse {
    #[serde(flatten)]
    pub food: FoodResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_food_facts: Option<OpenFoodFactsProduct>,
}

/// Result of a barcode lookup: the local food and/or the OpenFoodFacts product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BarcodeLookupResponse {
    pub food: Option<FoodResponse>,
    pub open_food_facts: Option<OpenFoodFactsProduct>,
}

/// Paginated food list.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FoodListResponse {
    pub content: Vec<FoodResponse>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl From<Page<Food>> for FoodListResponse {
    fn from(page: Page<Food>) -> Self {
        let info = page.info;
        Self {
            content: page.content.into_iter().map(FoodResponse::from).collect(),
            page: info.page,
            size: info.size,
            total_elements: info.total_elements,
            total_pages: info.total_pages,
        }
    }
}

/// Number of foods matching a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use larder_core::PageRequest;

    fn valid_request() -> CreateFoodRequest {
        CreateFoodRequest {
            name: "Oat milk".to_string(),
            barcode: Some("7394376616228".to_string()),
            calories: Some(46.0),
            ..CreateFoodRequest::default()
        }
    }

    #[test]
    fn test_create_request_valid() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_blank_name() {
        let request = CreateFoodRequest {
            name: "   ".to_string(),
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_bad_barcode_and_negative_nutrients() {
        let request = CreateFoodRequest {
            barcode: Some("12ab".to_string()),
            ..valid_request()
        };
        assert!(request.validate().is_err());

        let request = CreateFoodRequest {
            fats: Some(-1.0),
            ..valid_request()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_request_merges_present_fields() {
        let mut food = Food::new(NewFood::from(valid_request()), UserId::new());
        UpdateFoodRequest {
            name: Some(" Barista oat milk ".to_string()),
            fats: Some(3.0),
            ..UpdateFoodRequest::default()
        }
        .apply(&mut food);

        assert_eq!(food.name, "Barista oat milk");
        assert_eq!(food.fats, Some(3.0));
        assert_eq!(food.calories, Some(46.0));
        assert_eq!(food.barcode.as_deref(), Some("7394376616228"));
    }

    #[test]
    fn test_food_response_is_camel_case() {
        let food = Food::new(NewFood::from(valid_request()), UserId::new());
        let json = serde_json::to_value(FoodResponse::from(food)).unwrap();
        assert!(json.get("createdBy").is_some());
        assert!(json.get("imageUrl").is_some());
        assert_eq!(json["unit"], "g");
    }

    #[test]
    fn test_details_response_flattens_food() {
        let food = Food::new(NewFood::from(valid_request()), UserId::new());
        let details = FoodDetailsResponse {
            food: FoodResponse::from(food),
            open_food_facts: None,
        };
        let json = serde_json::to_value(details).unwrap();
        assert_eq!(json["name"], "Oat milk");
        assert!(json.get("openFoodFacts").is_none());
    }

    #[test]
    fn test_list_response_from_page() {
        let foods = vec![Food::new(NewFood::from(valid_request()), UserId::new())];
        let response = FoodListResponse::from(Page::new(foods, PageRequest::new(0, 10), 11));
        assert_eq!(response.content.len(), 1);
        assert_eq!(response.total_pages, 2);
    }
}
