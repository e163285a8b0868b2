//! Shopping list item entity.

use crate::{FoodId, GroupId, LarderError, LarderResult, ShoppingListItemId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An entry on a personal or group shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListItem {
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

impl ShoppingListItem {
    #[must_use]
    pub fn new(owner_id: UserId, group_id: Option<GroupId>, food_id: Option<FoodId>, name: String, quantity: f64) -> Self {
        let now = Utc::now();
        Self {
            id: ShoppingListItemId::new(),
            owner_id,
            group_id,
            food_id,
            name,
            quantity,
            unit: None,
            note: None,
            checked: false,
            checked_at: None,
            checked_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the item as bought.
    pub fn check(&mut self, by: UserId) -> LarderResult<()> {
        if self.checked {
            return Err(LarderError::conflict("Shopping list item is already checked"));
        }
        let now = Utc::now();
        self.checked = true;
        self.checked_at = Some(now);
        self.checked_by = Some(by);
        self.updated_at = now;
        Ok(())
    }

    pub fn uncheck(&mut self) -> LarderResult<()> {
        if !self.checked {
            return Err(LarderError::bad_request("Shopping list item is not checked"));
        }
        self.checked = false;
        self.checked_at = None;
        self.checked_by = None;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_then_uncheck() {
        let owner = UserId::new();
        let mut item = ShoppingListItem::new(owner, None, None, "Milk".to_string(), 2.0);
        item.check(owner).unwrap();
        assert!(item.checked);
        assert_eq!(item.checked_by, Some(owner));
        assert!(item.checked_at.is_some());

        item.uncheck().unwrap();
        assert!(!item.checked);
        assert!(item.checked_by.is_none());
    }

    #[test]
    fn test_double_check_conflicts() {
        let owner = UserId::new();
        let mut item = ShoppingListItem::new(owner, None, None, "Eggs".to_string(), 12.0);
        item.check(owner).unwrap();
        let err = item.check(owner).unwrap_err();
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_uncheck_unchecked_is_bad_request() {
        let mut item = ShoppingListItem::new(UserId::new(), None, None, "Bread".to_string(), 1.0);
        assert_eq!(item.uncheck().unwrap_err().status_code(), 400);
    }
}
