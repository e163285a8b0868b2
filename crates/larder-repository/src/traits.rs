//! Repository trait definitions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use larder_core::{
    Food, FoodId, GroupId, GroupInvite, GroupMember, Interface, LarderResult, MealLog, MealLogId,
    Page, PageRequest, Pantry, PantryId, PantryItem, PantryItemId, ShoppingListItem,
    ShoppingListItemId, User, UserGroup, UserId, VirtualMember, VirtualMemberId,
};

/// Search criteria for the food catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoodFilter {
    /// Case-insensitive substring of name or brand.
    pub search: Option<String>,
    /// Exact category.
    pub category: Option<String>,
}

/// Selection of shopping list items visible to a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShoppingListFilter {
    /// Only items of this group; when absent, personal and all group items.
    pub group_id: Option<GroupId>,
    pub checked: Option<bool>,
}

#[async_trait]
pub trait UserRepository: Interface + Send + Sync {
    async fn find_by_id(&self, id: UserId) -> LarderResult<Option<User>>;

    /// Finds a user by identity provider subject.
    async fn find_by_keycloak_id(&self, keycloak_id: &str) -> LarderResult<Option<User>>;

    async fn find_by_ids(&self, ids: &[UserId]) -> LarderResult<Vec<User>>;

    async fn save(&self, user: &User) -> LarderResult<User>;

    async fn update(&self, user: &User) -> LarderResult<User>;

    async fn delete(&self, id: UserId) -> LarderResult<bool>;
}

#[async_trait]
pub trait FoodRepository: Interface + Send + Sync {
    async fn find_by_id(&self, id: FoodId) -> LarderResult<Option<Food>>;

    async fn find_by_barcode(&self, barcode: &str) -> LarderResult<Option<Food>>;

    /// Lists foods ordered by name.
    async fn find_all(&self, filter: &FoodFilter, page: PageRequest) -> LarderResult<Page<Food>>;

    async fn count(&self, filter: &FoodFilter) -> LarderResult<u64>;

    async fn save(&self, food: &Food) -> LarderResult<Food>;

    async fn update(&self, food: &Food) -> LarderResult<Food>;

    async fn delete(&self, id: FoodId) -> LarderResult<bool>;
}

#[async_trait]
pub trait PantryRepository: Interface + Send + Sync {
    async fn find_by_id(&self, id: PantryId) -> LarderResult<Option<Pantry>>;

    /// Pantries owned by the user or shared with one of the user's groups.
    async fn find_accessible(&self, user_id: UserId) -> LarderResult<Vec<Pantry>>;

    async fn exists_by_owner_and_name(
        &self,
        owner_id: UserId,
        name: &str,
        exclude: Option<PantryId>,
    ) -> LarderResult<bool>;

    async fn save(&self, pantry: &Pantry) -> LarderResult<Pantry>;

    async fn update(&self, pantry: &Pantry) -> LarderResult<Pantry>;

    async fn delete(&self, id: PantryId) -> LarderResult<bool>;

    async fn find_items(&self, pantry_id: PantryId) -> LarderResult<Vec<PantryItem>>;

    async fn find_item(&self, id: PantryItemId) -> LarderResult<Option<PantryItem>>;

    async fn save_item(&self, item: &PantryItem) -> LarderResult<PantryItem>;

    async fn update_item(&self, item: &PantryItem) -> LarderResult<PantryItem>;

    async fn delete_item(&self, id: PantryItemId) -> LarderResult<bool>;
}

#[async_trait]
pub trait ShoppingListRepository: Interface + Send + Sync {
    async fn find_by_id(&self, id: ShoppingListItemId) -> LarderResult<Option<ShoppingListItem>>;

    /// Items owned by the user or belonging to one of the user's groups.
    async fn find_accessible(
        &self,
        user_id: UserId,
        filter: ShoppingListFilter,
    ) -> LarderResult<Vec<ShoppingListItem>>;

    async fn save(&self, item: &ShoppingListItem) -> LarderResult<ShoppingListItem>;

    async fn update(&self, item: &ShoppingListItem) -> LarderResult<ShoppingListItem>;

    async fn delete(&self, id: ShoppingListItemId) -> LarderResult<bool>;

    /// Deletes checked items of a group, or the user's personal checked items.
    async fn delete_checked(&self, user_id: UserId, group_id: Option<GroupId>) -> LarderResult<u64>;
}

#[async_trait]
pub trait MealLogRepository: Interface + Send + Sync {
    async fn find_by_id(&self, id: MealLogId) -> LarderResult<Option<MealLog>>;

    /// Logs eaten in `[from, to)`, newest first.
    async fn find_by_user(
        &self,
        user_id: UserId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> LarderResult<Vec<MealLog>>;

    async fn save(&self, log: &MealLog) -> LarderResult<MealLog>;

    async fn update(&self, log: &MealLog) -> LarderResult<MealLog>;

    async fn delete(&self, id: MealLogId) -> LarderResult<bool>;
}

#[async_trait]
pub trait GroupRepository: Interface + Send + Sync {
    async fn find_by_id(&self, id: GroupId) -> LarderResult<Option<UserGroup>>;

    async fn find_by_member(&self, user_id: UserId) -> LarderResult<Vec<UserGroup>>;

    /// Case-insensitive title check among groups created by `created_by`.
    async fn exists_by_creator_and_title(
        &self,
        created_by: UserId,
        title: &str,
        exclude: Option<GroupId>,
    ) -> LarderResult<bool>;

    async fn save(&self, group: &UserGroup) -> LarderResult<UserGroup>;

    async fn update(&self, group: &UserGroup) -> LarderResult<UserGroup>;

    async fn delete(&self, id: GroupId) -> LarderResult<bool>;

    async fn find_members(&self, group_id: GroupId) -> LarderResult<Vec<GroupMember>>;

    async fn find_member(&self, group_id: GroupId, user_id: UserId) -> LarderResult<Option<GroupMember>>;

    async fn save_member(&self, member: &GroupMember) -> LarderResult<GroupMember>;

    async fn update_member(&self, member: &GroupMember) -> LarderResult<GroupMember>;

    async fn delete_member(&self, group_id: GroupId, user_id: UserId) -> LarderResult<bool>;

    async fn find_invite(&self, code: &str) -> LarderResult<Option<GroupInvite>>;

    async fn save_invite(&self, invite: &GroupInvite) -> LarderResult<GroupInvite>;

    async fn update_invite(&self, invite: &GroupInvite) -> LarderResult<GroupInvite>;

    async fn find_virtual_members(&self, group_id: GroupId) -> LarderResult<Vec<VirtualMember>>;

    async fn find_virtual_member(&self, id: VirtualMemberId) -> LarderResult<Option<VirtualMember>>;

    async fn save_virtual_member(&self, member: &VirtualMember) -> LarderResult<VirtualMember>;

    async fn update_virtual_member(&self, member: &VirtualMember) -> LarderResult<VirtualMember>;

    async fn delete_virtual_member(&self, id: VirtualMemberId) -> LarderResult<bool>;
}
