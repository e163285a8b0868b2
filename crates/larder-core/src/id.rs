//! Typed ID wrappers for domain entities.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;
use uuid::Uuid;

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new time-ordered id.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parses an id from its hyphenated string form.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }

            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

typed_id!(
    /// Internal user id (distinct from the identity provider subject).
    UserId
);
typed_id!(FoodId);
typed_id!(PantryId);
typed_id!(PantryItemId);
typed_id!(ShoppingListItemId);
typed_id!(MealLogId);
typed_id!(GroupId);
typed_id!(VirtualMemberId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation_is_unique() {
        assert_ne!(FoodId::new(), FoodId::new());
    }

    #[test]
    fn test_id_parsing() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id = UserId::parse(uuid_str).unwrap();
        assert_eq!(id.to_string(), uuid_str);

        let parsed: GroupId = uuid_str.parse().unwrap();
        assert_eq!(parsed.into_inner(), id.into_inner());

        assert!(PantryId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = MealLogId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");
    }
}
