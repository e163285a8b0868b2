//! Integration tests for the PostgreSQL repositories.
//!
//! These run against a real database in a testcontainer and need Docker:
//! `cargo test -p larder-repository -- --ignored`.

mod common;

use chrono::{Duration, Utc};
use common::TestDatabase;
use larder_core::{
    Food, GroupInvite, GroupMember, MealLog, MealType, NewFood, PageRequest, Pantry, PantryItem,
    ShoppingListItem, User, UserGroup, UserId,
};
use larder_repository::{
    FoodFilter, FoodRepository, GroupRepository, MealLogRepository, PantryRepository,
    PgFoodRepository, PgGroupRepository, PgMealLogRepository, PgPantryRepository,
    PgShoppingListRepository, PgUserRepository, ShoppingListFilter, ShoppingListRepository,
    UserRepository,
};

fn food(name: &str, barcode: Option<&str>, category: Option<&str>, owner: UserId) -> Food {
    Food::new(
        NewFood {
            name: name.to_string(),
            barcode: barcode.map(String::from),
            category: category.map(String::from),
            calories: Some(100.0),
            ..NewFood::default()
        },
        owner,
    )
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_user_round_trip_by_keycloak_id() {
    let db = TestDatabase::new().await;
    let repo = PgUserRepository::new(db.pool());

    let user = User::provision(
        "kc-42".to_string(),
        "jane".to_string(),
        Some("jane@example.com".to_string()),
        Some("Jane".to_string()),
        None,
    );
    repo.save(&user).await.unwrap();

    let found = repo.find_by_keycloak_id("kc-42").await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(found.email.as_deref(), Some("jane@example.com"));

    assert!(repo.delete(user.id).await.unwrap());
    assert!(repo.find_by_id(user.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_food_filter_and_barcode_uniqueness() {
    let db = TestDatabase::new().await;
    let owner = db.create_user("kc-food").await;
    let repo = PgFoodRepository::new(db.pool());

    repo.save(&food("Whole Milk", Some("3017620422003"), Some("dairy"), owner.id))
        .await
        .unwrap();
    repo.save(&food("Oat Milk", None, Some("drinks"), owner.id)).await.unwrap();
    repo.save(&food("Bread", None, Some("bakery"), owner.id)).await.unwrap();

    let filter = FoodFilter {
        search: Some("milk".to_string()),
        category: None,
    };
    let page = repo.find_all(&filter, PageRequest::new(0, 10)).await.unwrap();
    assert_eq!(page.info.total_elements, 2);
    assert_eq!(page.content[0].name, "Oat Milk");

    let dairy = FoodFilter {
        search: None,
        category: Some("dairy".to_string()),
    };
    assert_eq!(repo.count(&dairy).await.unwrap(), 1);

    let duplicate = food("Other", Some("3017620422003"), None, owner.id);
    let err = repo.save(&duplicate).await.unwrap_err();
    assert_eq!(err.status_code(), 409);

    let by_barcode = repo.find_by_barcode("3017620422003").await.unwrap().unwrap();
    assert_eq!(by_barcode.name, "Whole Milk");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_group_pantries_are_visible_to_members() {
    let db = TestDatabase::new().await;
    let owner = db.create_user("kc-owner").await;
    let member = db.create_user("kc-member").await;
    let groups = PgGroupRepository::new(db.pool());
    let pantries = PgPantryRepository::new(db.pool());

    let group = groups
        .save(&UserGroup::new("Home".to_string(), None, owner.id))
        .await
        .unwrap();
    groups.save_member(&GroupMember::new(group.id, owner.id, true)).await.unwrap();

    pantries
        .save(&Pantry::new("Fridge".to_string(), None, owner.id, Some(group.id)))
        .await
        .unwrap();
    assert!(pantries.find_accessible(member.id).await.unwrap().is_empty());

    groups.save_member(&GroupMember::new(group.id, member.id, false)).await.unwrap();
    let visible = pantries.find_accessible(member.id).await.unwrap();
    assert_eq!(visible.len(), 1);
    assert!(pantries
        .exists_by_owner_and_name(owner.id, "Fridge", None)
        .await
        .unwrap());
    assert!(!pantries
        .exists_by_owner_and_name(owner.id, "Fridge", Some(visible[0].id))
        .await
        .unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_invite_is_marked_used() {
    let db = TestDatabase::new().await;
    let owner = db.create_user("kc-inviter").await;
    let joiner = db.create_user("kc-joiner").await;
    let groups = PgGroupRepository::new(db.pool());

    let group = groups
        .save(&UserGroup::new("Flat".to_string(), None, owner.id))
        .await
        .unwrap();
    let mut invite = groups
        .save_invite(&GroupInvite::new("ABCD2345".to_string(), group.id, owner.id))
        .await
        .unwrap();

    invite.mark_used(joiner.id);
    groups.update_invite(&invite).await.unwrap();

    let stored = groups.find_invite("ABCD2345").await.unwrap().unwrap();
    assert_eq!(stored.used_by, Some(joiner.id));
    assert!(stored.used_at.is_some());
    assert!(groups
        .exists_by_creator_and_title(owner.id, "flat", None)
        .await
        .unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_clear_checked_shopping_items() {
    let db = TestDatabase::new().await;
    let user = db.create_user("kc-shopper").await;
    let repo = PgShoppingListRepository::new(db.pool());

    let mut milk = ShoppingListItem::new(user.id, None, None, "Milk".to_string(), 1.0);
    milk.check(user.id).unwrap();
    repo.save(&milk).await.unwrap();
    repo.save(&ShoppingListItem::new(user.id, None, None, "Eggs".to_string(), 6.0))
        .await
        .unwrap();

    let checked = ShoppingListFilter {
        checked: Some(true),
        ..ShoppingListFilter::default()
    };
    assert_eq!(repo.find_accessible(user.id, checked).await.unwrap().len(), 1);

    assert_eq!(repo.delete_checked(user.id, None).await.unwrap(), 1);
    let remaining = repo
        .find_accessible(user.id, ShoppingListFilter::default())
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "Eggs");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_meal_logs_by_date_range() {
    let db = TestDatabase::new().await;
    let user = db.create_user("kc-eater").await;
    let foods = PgFoodRepository::new(db.pool());
    let pantries = PgPantryRepository::new(db.pool());
    let meals = PgMealLogRepository::new(db.pool());

    let oats = foods.save(&food("Oats", None, None, user.id)).await.unwrap();
    let pantry = pantries
        .save(&Pantry::new("Cupboard".to_string(), None, user.id, None))
        .await
        .unwrap();
    let item = pantries
        .save_item(&PantryItem::new(pantry.id, oats.id, 500.0, "g".to_string(), None, user.id))
        .await
        .unwrap();

    let now = Utc::now();
    meals
        .save(&MealLog::new(user.id, oats.id, Some(item.id), 50.0, MealType::Breakfast, now, None))
        .await
        .unwrap();
    meals
        .save(&MealLog::new(
            user.id,
            oats.id,
            None,
            80.0,
            MealType::Snack,
            now - Duration::days(3),
            None,
        ))
        .await
        .unwrap();

    let recent = meals
        .find_by_user(user.id, Some(now - Duration::days(1)), None)
        .await
        .unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].meal_type, MealType::Breakfast);
    assert_eq!(recent[0].pantry_item_id, Some(item.id));

    let all = meals.find_by_user(user.id, None, None).await.unwrap();
    assert_eq!(all.len(), 2);
}
