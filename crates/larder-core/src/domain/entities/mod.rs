//! Domain entities.

mod food;
mod group;
mod meal_log;
mod pantry;
mod shopping_list_item;
mod user;

pub use food::{Food, NewFood};
pub use group::{GroupInvite, GroupMember, UserGroup, VirtualMember};
pub use meal_log::MealLog;
pub use pantry::{Pantry, PantryItem};
pub use shopping_list_item::ShoppingListItem;
pub use user::User;
