//! Shopping list DTOs.

use chrono::{DateTime, Utc};
use larder_core::{FoodId, GroupId, PantryId, ShoppingListItem, ShoppingListItemId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

fn default_quantity() -> f64 {
    1.0
}

/// Request to add an item to a shopping list.
///
/// Either `name` or `foodId` must be present; a missing name is taken from
/// the food.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateShoppingListItemRequest {
    #[validate(
        length(min = 1, max = 200, message = "Name must be 1-200 characters"),
        custom(function = "larder_core::rules::not_blank", message = "Name must not be blank")
    )]
    pub name: Option<String>,

    pub food_id: Option<FoodId>,

    /// Put the item on the group's shared list instead of the personal one.
    pub group_id: Option<GroupId>,

    #[serde(default = "default_quantity")]
    #[validate(custom(function = "larder_core::rules::positive", message = "Quantity must be positive"))]
    pub quantity: f64,

    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,

    #[validate(length(max = 500))]
    pub note: Option<String>,
}

impl Default for CreateShoppingListItemRequest {
    fn default() -> Self {
        Self {
            name: None,
            food_id: None,
            group_id: None,
            quantity: default_quantity(),
            unit: None,
            note: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShoppingListItemRequest {
    #[validate(
        length(min = 1, max = 200, message = "Name must be 1-200 characters"),
        custom(function = "larder_core::rules::not_blank", message = "Name must not be blank")
    )]
    pub name: Option<String>,

    #[validate(custom(function = "larder_core::rules::positive", message = "Quantity must be positive"))]
    pub quantity: Option<f64>,

    #[validate(length(min = 1, max = 20))]
    pub unit: Option<String>,

    #[validate(length(max = 500))]
    pub note: Option<String>,
}

impl UpdateShoppingListItemRequest {
    pub fn apply(self, item: &mut ShoppingListItem) {
        if let Some(name) = self.name {
            item.name = name.trim().to_string();
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if self.unit.is_some() {
            item.unit = self.unit;
        }
        if self.note.is_some() {
            item.note = self.note;
        }
        item.touch();
    }
}

/// Body of a check request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckItemRequest {
    /// Stock the bought item into this pantry.
    pub pantry_id: Option<PantryId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItemResponse {
    pub id: ShoppingListItemId,
    pub owner_id: UserId,
    pub group_id: Option<GroupId>,
    pub food_id: Option<FoodId>,
    pub name: String,
    pub quantity: f64,
    pub unit: Option<String>,
    pub note: Option<String>,
    pub checked: bool,
    pub checked_at: Option<DateTime<Utc>>,
    pub checked_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ShoppingListItem> for ShoppingListItemResponse {
    fn from(item: ShoppingListItem) -> Self {
        Self {
            id: item.id,
            owner_id: item.owner_id,
            group_id: item.group_id,
            food_id: item.food_id,
            name: item.name,
            quantity: item.quantity,
            unit: item.unit,
            note: item.note,
            checked: item.checked,
            checked_at: item.checked_at,
            checked_by: item.checked_by,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Number of checked items removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClearCheckedResponse {
    pub deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_defaults_to_one() {
        let request: CreateShoppingListItemRequest =
            serde_json::from_str(r#"{"name":"Bread"}"#).unwrap();
        assert!((request.quantity - 1.0).abs() < f64::EPSILON);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_negative_quantity_is_invalid() {
        let request = CreateShoppingListItemRequest {
            name: Some("Eggs".to_string()),
            quantity: -2.0,
            ..CreateShoppingListItemRequest::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_applies_fields() {
        let mut item = ShoppingListItem::new(UserId::new(), None, None, "Milk".to_string(), 1.0);
        UpdateShoppingListItemRequest {
            quantity: Some(2.0),
            note: Some("oat".to_string()),
            ..UpdateShoppingListItemRequest::default()
        }
        .apply(&mut item);

        assert!((item.quantity - 2.0).abs() < f64::EPSILON);
        assert_eq!(item.note.as_deref(), Some("oat"));
        assert_eq!(item.name, "Milk");
    }
}
