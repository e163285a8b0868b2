//! Pantry and pantry item entities.

use crate::{FoodId, GroupId, PantryId, PantryItemId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A storage location owned by a user, optionally shared with a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pantry {
    pub id: PantryId,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: UserId,
    pub group_id: Option<GroupId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Pantry {
    #[must_use]
    pub fn new(
        name: String,
        description: Option<String>,
        owner_id: UserId,
        group_id: Option<GroupId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PantryId::new(),
            name,
            description,
            owner_id,
            group_id,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner_id == user
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// A quantity of a food stored in a pantry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryItem {
    pub id: PantryItemId,
    pub pantry_id: PantryId,
    pub food_id: FoodId,
    pub quantity: f64,
    pub unit: String,
    pub expiration_date: Option<NaiveDate>,
    pub added_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PantryItem {
    #[must_use]
    pub fn new(
        pantry_id: PantryId,
        food_id: FoodId,
        quantity: f64,
        unit: String,
        expiration_date: Option<NaiveDate>,
        added_by: UserId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PantryItemId::new(),
            pantry_id,
            food_id,
            quantity,
            unit,
            expiration_date,
            added_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Removes `amount` from stock. Returns `true` when nothing is left.
    pub fn consume(&mut self, amount: f64) -> bool {
        self.quantity = (self.quantity - amount).max(0.0);
        self.updated_at = Utc::now();
        self.quantity <= 0.0
    }

    #[must_use]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiration_date.is_some_and(|date| date < today)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: f64) -> PantryItem {
        PantryItem::new(
            PantryId::new(),
            FoodId::new(),
            quantity,
            "g".to_string(),
            NaiveDate::from_ymd_opt(2024, 5, 1),
            UserId::new(),
        )
    }

    #[test]
    fn test_consume_partial_and_full() {
        let mut it = item(500.0);
        assert!(!it.consume(200.0));
        assert!((it.quantity - 300.0).abs() < f64::EPSILON);
        assert!(it.consume(400.0));
        assert!((it.quantity - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_is_expired() {
        let it = item(1.0);
        assert!(it.is_expired(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap()));
        assert!(!it.is_expired(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()));
    }

    #[test]
    fn test_pantry_ownership() {
        let owner = UserId::new();
        let pantry = Pantry::new("Kitchen".to_string(), None, owner, None);
        assert!(pantry.is_owned_by(owner));
        assert!(!pantry.is_owned_by(UserId::new()));
    }
}
