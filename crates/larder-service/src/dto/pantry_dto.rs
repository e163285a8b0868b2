//! Pantry and pantry item DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use larder_core::{FoodId, GroupId, Pantry, PantryId, PantryItem, PantryItemId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePantryRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "larder_core::rules::not_blank", message = "Name must not be blank")
    )]
    pub name: String,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    /// Share the pantry with this group.
    pub group_id: Option<GroupId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePantryRequest {
    #[validate(
        length(min = 1, max = 100, message = "Name must be 1-100 characters"),
        custom(function = "larder_core::rules::not_blank", message = "Name must not be blank")
    )]
    pub name: Option<String>,

    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PantryResponse {
    pub id: PantryId,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: UserId,
    pub group_id: Option<GroupId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Pantry> for PantryResponse {
    fn from(pantry: Pantry) -> Self {
        Self {
            id: pantry.id,
            name: pantry.name,
            description: pantry.description,
            owner_id: pantry.owner_id,
            group_id: pantry.group_id,
            created_at: pantry.created_at,
            updated_at: pantry.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPantryItemRequest {
    pub food_id: FoodId,

    #[validate(custom(function = "larder_core::rules::positive", message = "Quantity must be positive"))]
    pub quantity: f64,

    /// Defaults to the food's unit.
    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,

    pub expiration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePantryItemRequest {
    #[validate(custom(function = "larder_core::rules::positive", message = "Quantity must be positive"))]
    pub quantity: Option<f64>,

    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,

    pub expiration_date: Option<NaiveDate>,
}

impl UpdatePantryItemRequest {
    pub fn apply(self, item: &mut PantryItem) {
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(unit) = self.unit {
            item.unit = unit;
        }
        if self.expiration_date.is_some() {
            item.expiration_date = self.expiration_date;
        }
        item.touch();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PantryItemResponse {
    pub id: PantryItemId,
    pub pantry_id: PantryId,
    pub food_id: FoodId,
    pub quantity: f64,
    pub unit: String,
    pub expiration_date: Option<NaiveDate>,
    /// Whether the expiration date lies before today (UTC).
    pub expired: bool,
    pub added_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PantryItem> for PantryItemResponse {
    fn from(item: PantryItem) -> Self {
        let expired = item.is_expired(Utc::now().date_naive());
        Self {
            id: item.id,
            pantry_id: item.pantry_id,
            food_id: item.food_id,
            quantity: item.quantity,
            unit: item.unit,
            expiration_date: item.expiration_date,
            expired,
            added_by: item.added_by,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}
