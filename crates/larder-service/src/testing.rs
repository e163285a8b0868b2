//! In-memory repositories for service tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use larder_core::{
    Food, FoodId, GroupId, GroupInvite, GroupMember, LarderError, LarderResult, MealLog, MealLogId,
    NewFood, Page, PageRequest, Pantry, PantryId, PantryItem, PantryItemId, ShoppingListItem,
    ShoppingListItemId, User, UserGroup, UserId, VirtualMember, VirtualMemberId,
};
use larder_repository::{
    FoodFilter, FoodRepository, GroupRepository, MealLogRepository, PantryRepository,
    ShoppingListFilter, ShoppingListRepository, UserRepository,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    foods: HashMap<FoodId, Food>,
    pantries: HashMap<PantryId, Pantry>,
    pantry_items: HashMap<PantryItemId, PantryItem>,
    shopping: HashMap<ShoppingListItemId, ShoppingListItem>,
    meals: HashMap<MealLogId, MealLog>,
    groups: HashMap<GroupId, UserGroup>,
    members: HashMap<(GroupId, UserId), GroupMember>,
    invites: HashMap<String, GroupInvite>,
    virtual_members: HashMap<VirtualMemberId, VirtualMember>,
}

impl Tables {
    fn group_ids_of(&self, user: UserId) -> Vec<GroupId> {
        self.members
            .keys()
            .filter(|(_, u)| *u == user)
            .map(|(g, _)| *g)
            .collect()
    }
}

/// One shared in-memory database implementing every repository trait.
#[derive(Default)]
pub struct InMemoryDb {
    tables: Mutex<Tables>,
}

impl InMemoryDb {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert_user(&self, keycloak_id: &str, username: &str) -> User {
        let user = User::provision(keycloak_id.to_string(), username.to_string(), None, None, None);
        self.tables.lock().users.insert(user.id, user.clone());
        user
    }

    pub fn insert_food(&self, name: &str, barcode: Option<&str>, created_by: UserId) -> Food {
        let food = Food::new(
            NewFood {
                name: name.to_string(),
                barcode: barcode.map(ToString::to_string),
                calories: Some(200.0),
                proteins: Some(10.0),
                carbohydrates: Some(30.0),
                fats: Some(5.0),
                ..NewFood::default()
            },
            created_by,
        );
        self.tables.lock().foods.insert(food.id, food.clone());
        food
    }

    pub fn insert_group(&self, title: &str, admin: UserId) -> UserGroup {
        let group = UserGroup::new(title.to_string(), None, admin);
        let mut tables = self.tables.lock();
        tables.groups.insert(group.id, group.clone());
        tables
            .members
            .insert((group.id, admin), GroupMember::new(group.id, admin, true));
        group
    }

    pub fn add_member(&self, group: GroupId, user: UserId, is_admin: bool) {
        self.tables
            .lock()
            .members
            .insert((group, user), GroupMember::new(group, user, is_admin));
    }

    pub fn insert_pantry(&self, name: &str, owner: UserId, group: Option<GroupId>) -> Pantry {
        let pantry = Pantry::new(name.to_string(), None, owner, group);
        self.tables.lock().pantries.insert(pantry.id, pantry.clone());
        pantry
    }

    pub fn insert_pantry_item(&self, pantry: PantryId, food: FoodId, quantity: f64, added_by: UserId) -> PantryItem {
        let item = PantryItem::new(pantry, food, quantity, "g".to_string(), None, added_by);
        self.tables.lock().pantry_items.insert(item.id, item.clone());
        item
    }

    pub fn insert_invite(&self, invite: GroupInvite) {
        self.tables.lock().invites.insert(invite.code.clone(), invite);
    }

    pub fn pantry_item(&self, id: PantryItemId) -> Option<PantryItem> {
        self.tables.lock().pantry_items.get(&id).cloned()
    }

    pub fn pantry_items_of(&self, pantry: PantryId) -> Vec<PantryItem> {
        self.tables
            .lock()
            .pantry_items
            .values()
            .filter(|i| i.pantry_id == pantry)
            .cloned()
            .collect()
    }

    pub fn member(&self, group: GroupId, user: UserId) -> Option<GroupMember> {
        self.tables.lock().members.get(&(group, user)).cloned()
    }

    pub fn group_exists(&self, group: GroupId) -> bool {
        self.tables.lock().groups.contains_key(&group)
    }

    pub fn invite(&self, code: &str) -> Option<GroupInvite> {
        self.tables.lock().invites.get(code).cloned()
    }
}

#[async_trait]
impl UserRepository for InMemoryDb {
    async fn find_by_id(&self, id: UserId) -> LarderResult<Option<User>> {
        Ok(self.tables.lock().users.get(&id).cloned())
    }

    async fn find_by_keycloak_id(&self, keycloak_id: &str) -> LarderResult<Option<User>> {
        Ok(self
            .tables
            .lock()
            .users
            .values()
            .find(|u| u.keycloak_id == keycloak_id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> LarderResult<Vec<User>> {
        let tables = self.tables.lock();
        Ok(ids.iter().filter_map(|id| tables.users.get(id).cloned()).collect())
    }

    async fn save(&self, user: &User) -> LarderResult<User> {
        let mut tables = self.tables.lock();
        if tables.users.values().any(|u| u.keycloak_id == user.keycloak_id) {
            return Err(LarderError::conflict("duplicate keycloak id"));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> LarderResult<User> {
        self.tables.lock().users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> LarderResult<bool> {
        Ok(self.tables.lock().users.remove(&id).is_some())
    }
}

fn food_matches(food: &Food, filter: &FoodFilter) -> bool {
    let search_ok = filter.search.as_deref().map_or(true, |s| {
        let s = s.to_lowercase();
        food.name.to_lowercase().contains(&s)
            || food.brand.as_deref().is_some_and(|b| b.to_lowercase().contains(&s))
    });
    let category_ok = filter
        .category
        .as_deref()
        .map_or(true, |c| food.category.as_deref() == Some(c));
    search_ok && category_ok
}

#[async_trait]
impl FoodRepository for InMemoryDb {
    async fn find_by_id(&self, id: FoodId) -> LarderResult<Option<Food>> {
        Ok(self.tables.lock().foods.get(&id).cloned())
    }

    async fn find_by_barcode(&self, barcode: &str) -> LarderResult<Option<Food>> {
        Ok(self
            .tables
            .lock()
            .foods
            .values()
            .find(|f| f.barcode.as_deref() == Some(barcode))
            .cloned())
    }

    async fn find_all(&self, filter: &FoodFilter, page: PageRequest) -> LarderResult<Page<Food>> {
        let mut foods: Vec<Food> = self
            .tables
            .lock()
            .foods
            .values()
            .filter(|f| food_matches(f, filter))
            .cloned()
            .collect();
        foods.sort_by(|a, b| a.name.cmp(&b.name));
        let total = foods.len() as u64;
        let content = foods
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(0))
            .take(page.size as usize)
            .collect();
        Ok(Page::new(content, page, total))
    }

    async fn count(&self, filter: &FoodFilter) -> LarderResult<u64> {
        Ok(self
            .tables
            .lock()
            .foods
            .values()
            .filter(|f| food_matches(f, filter))
            .count() as u64)
    }

    async fn save(&self, food: &Food) -> LarderResult<Food> {
        self.tables.lock().foods.insert(food.id, food.clone());
        Ok(food.clone())
    }

    async fn update(&self, food: &Food) -> LarderResult<Food> {
        self.tables.lock().foods.insert(food.id, food.clone());
        Ok(food.clone())
    }

    async fn delete(&self, id: FoodId) -> LarderResult<bool> {
        Ok(self.tables.lock().foods.remove(&id).is_some())
    }
}

#[async_trait]
impl PantryRepository for InMemoryDb {
    async fn find_by_id(&self, id: PantryId) -> LarderResult<Option<Pantry>> {
        Ok(self.tables.lock().pantries.get(&id).cloned())
    }

    async fn find_accessible(&self, user_id: UserId) -> LarderResult<Vec<Pantry>> {
        let tables = self.tables.lock();
        let groups = tables.group_ids_of(user_id);
        let mut pantries: Vec<Pantry> = tables
            .pantries
            .values()
            .filter(|p| p.owner_id == user_id || p.group_id.is_some_and(|g| groups.contains(&g)))
            .cloned()
            .collect();
        pantries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(pantries)
    }

    async fn exists_by_owner_and_name(
        &self,
        owner_id: UserId,
        name: &str,
        exclude: Option<PantryId>,
    ) -> LarderResult<bool> {
        Ok(self
            .tables
            .lock()
            .pantries
            .values()
            .any(|p| p.owner_id == owner_id && p.name == name && Some(p.id) != exclude))
    }

    async fn save(&self, pantry: &Pantry) -> LarderResult<Pantry> {
        self.tables.lock().pantries.insert(pantry.id, pantry.clone());
        Ok(pantry.clone())
    }

    async fn update(&self, pantry: &Pantry) -> LarderResult<Pantry> {
        self.tables.lock().pantries.insert(pantry.id, pantry.clone());
        Ok(pantry.clone())
    }

    async fn delete(&self, id: PantryId) -> LarderResult<bool> {
        let mut tables = self.tables.lock();
        tables.pantry_items.retain(|_, item| item.pantry_id != id);
        Ok(tables.pantries.remove(&id).is_some())
    }

    async fn find_items(&self, pantry_id: PantryId) -> LarderResult<Vec<PantryItem>> {
        Ok(self.pantry_items_of(pantry_id))
    }

    async fn find_item(&self, id: PantryItemId) -> LarderResult<Option<PantryItem>> {
        Ok(self.pantry_item(id))
    }

    async fn save_item(&self, item: &PantryItem) -> LarderResult<PantryItem> {
        self.tables.lock().pantry_items.insert(item.id, item.clone());
        Ok(item.clone())
    }

    async fn update_item(&self, item: &PantryItem) -> LarderResult<PantryItem> {
        self.tables.lock().pantry_items.insert(item.id, item.clone());
        Ok(item.clone())
    }

    async fn delete_item(&self, id: PantryItemId) -> LarderResult<bool> {
        Ok(self.tables.lock().pantry_items.remove(&id).is_some())
    }
}

#[async_trait]
impl ShoppingListRepository for InMemoryDb {
    async fn find_by_id(&self, id: ShoppingListItemId) -> LarderResult<Option<ShoppingListItem>> {
        Ok(self.tables.lock().shopping.get(&id).cloned())
    }

    async fn find_accessible(
        &self,
        user_id: UserId,
        filter: ShoppingListFilter,
    ) -> LarderResult<Vec<ShoppingListItem>> {
        let tables = self.tables.lock();
        let groups = tables.group_ids_of(user_id);
        Ok(tables
            .shopping
            .values()
            .filter(|i| match filter.group_id {
                Some(group) => i.group_id == Some(group),
                None => match i.group_id {
                    Some(group) => groups.contains(&group),
                    None => i.owner_id == user_id,
                },
            })
            .filter(|i| filter.checked.map_or(true, |c| i.checked == c))
            .cloned()
            .collect())
    }

    async fn save(&self, item: &ShoppingListItem) -> LarderResult<ShoppingListItem> {
        self.tables.lock().shopping.insert(item.id, item.clone());
        Ok(item.clone())
    }

    async fn update(&self, item: &ShoppingListItem) -> LarderResult<ShoppingListItem> {
        self.tables.lock().shopping.insert(item.id, item.clone());
        Ok(item.clone())
    }

    async fn delete(&self, id: ShoppingListItemId) -> LarderResult<bool> {
        Ok(self.tables.lock().shopping.remove(&id).is_some())
    }

    async fn delete_checked(&self, user_id: UserId, group_id: Option<GroupId>) -> LarderResult<u64> {
        let mut tables = self.tables.lock();
        let before = tables.shopping.len();
        tables.shopping.retain(|_, i| {
            let in_scope = match group_id {
                Some(group) => i.group_id == Some(group),
                None => i.group_id.is_none() && i.owner_id == user_id,
            };
            !(in_scope && i.checked)
        });
        Ok((before - tables.shopping.len()) as u64)
    }
}

#[async_trait]
impl MealLogRepository for InMemoryDb {
    async fn find_by_id(&self, id: MealLogId) -> LarderResult<Option<MealLog>> {
        Ok(self.tables.lock().meals.get(&id).cloned())
    }

    async fn find_by_user(
        &self,
        user_id: UserId,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> LarderResult<Vec<MealLog>> {
        let mut logs: Vec<MealLog> = self
            .tables
            .lock()
            .meals
            .values()
            .filter(|m| m.user_id == user_id)
            .filter(|m| from.map_or(true, |f| m.eaten_at >= f))
            .filter(|m| to.map_or(true, |t| m.eaten_at < t))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.eaten_at.cmp(&a.eaten_at));
        Ok(logs)
    }

    async fn save(&self, log: &MealLog) -> LarderResult<MealLog> {
        self.tables.lock().meals.insert(log.id, log.clone());
        Ok(log.clone())
    }

    async fn update(&self, log: &MealLog) -> LarderResult<MealLog> {
        self.tables.lock().meals.insert(log.id, log.clone());
        Ok(log.clone())
    }

    async fn delete(&self, id: MealLogId) -> LarderResult<bool> {
        Ok(self.tables.lock().meals.remove(&id).is_some())
    }
}

#[async_trait]
impl GroupRepository for InMemoryDb {
    async fn find_by_id(&self, id: GroupId) -> LarderResult<Option<UserGroup>> {
        Ok(self.tables.lock().groups.get(&id).cloned())
    }

    async fn find_by_member(&self, user_id: UserId) -> LarderResult<Vec<UserGroup>> {
        let tables = self.tables.lock();
        Ok(tables
            .group_ids_of(user_id)
            .iter()
            .filter_map(|g| tables.groups.get(g).cloned())
            .collect())
    }

    async fn exists_by_creator_and_title(
        &self,
        created_by: UserId,
        title: &str,
        exclude: Option<GroupId>,
    ) -> LarderResult<bool> {
        let title = title.to_lowercase();
        Ok(self.tables.lock().groups.values().any(|g| {
            g.created_by == created_by && g.title.to_lowercase() == title && Some(g.id) != exclude
        }))
    }

    async fn save(&self, group: &UserGroup) -> LarderResult<UserGroup> {
        self.tables.lock().groups.insert(group.id, group.clone());
        Ok(group.clone())
    }

    async fn update(&self, group: &UserGroup) -> LarderResult<UserGroup> {
        self.tables.lock().groups.insert(group.id, group.clone());
        Ok(group.clone())
    }

    async fn delete(&self, id: GroupId) -> LarderResult<bool> {
        let mut tables = self.tables.lock();
        tables.members.retain(|(g, _), _| *g != id);
        tables.invites.retain(|_, i| i.group_id != id);
        tables.virtual_members.retain(|_, v| v.group_id != id);
        for pantry in tables.pantries.values_mut() {
            if pantry.group_id == Some(id) {
                pantry.group_id = None;
            }
        }
        Ok(tables.groups.remove(&id).is_some())
    }

    async fn find_members(&self, group_id: GroupId) -> LarderResult<Vec<GroupMember>> {
        let mut members: Vec<GroupMember> = self
            .tables
            .lock()
            .members
            .values()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect();
        members.sort_by_key(|m| m.joined_at);
        Ok(members)
    }

    async fn find_member(&self, group_id: GroupId, user_id: UserId) -> LarderResult<Option<GroupMember>> {
        Ok(self.member(group_id, user_id))
    }

    async fn save_member(&self, member: &GroupMember) -> LarderResult<GroupMember> {
        self.tables
            .lock()
            .members
            .insert((member.group_id, member.user_id), member.clone());
        Ok(member.clone())
    }

    async fn update_member(&self, member: &GroupMember) -> LarderResult<GroupMember> {
        self.save_member(member).await
    }

    async fn delete_member(&self, group_id: GroupId, user_id: UserId) -> LarderResult<bool> {
        Ok(self.tables.lock().members.remove(&(group_id, user_id)).is_some())
    }

    async fn find_invite(&self, code: &str) -> LarderResult<Option<GroupInvite>> {
        Ok(self.invite(code))
    }

    async fn save_invite(&self, invite: &GroupInvite) -> LarderResult<GroupInvite> {
        let mut tables = self.tables.lock();
        if tables.invites.contains_key(&invite.code) {
            return Err(LarderError::conflict("duplicate invite code"));
        }
        tables.invites.insert(invite.code.clone(), invite.clone());
        Ok(invite.clone())
    }

    async fn update_invite(&self, invite: &GroupInvite) -> LarderResult<GroupInvite> {
        self.tables.lock().invites.insert(invite.code.clone(), invite.clone());
        Ok(invite.clone())
    }

    async fn find_virtual_members(&self, group_id: GroupId) -> LarderResult<Vec<VirtualMember>> {
        Ok(self
            .tables
            .lock()
            .virtual_members
            .values()
            .filter(|v| v.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn find_virtual_member(&self, id: VirtualMemberId) -> LarderResult<Option<VirtualMember>> {
        Ok(self.tables.lock().virtual_members.get(&id).cloned())
    }

    async fn save_virtual_member(&self, member: &VirtualMember) -> LarderResult<VirtualMember> {
        self.tables.lock().virtual_members.insert(member.id, member.clone());
        Ok(member.clone())
    }

    async fn update_virtual_member(&self, member: &VirtualMember) -> LarderResult<VirtualMember> {
        self.save_virtual_member(member).await
    }

    async fn delete_virtual_member(&self, id: VirtualMemberId) -> LarderResult<bool> {
        Ok(self.tables.lock().virtual_members.remove(&id).is_some())
    }
}
