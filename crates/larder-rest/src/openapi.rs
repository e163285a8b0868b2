//! OpenAPI document for the REST API.

use crate::controllers::{
    food_controller, group_controller, health_controller, meal_controller, pantry_controller,
    shopping_list_controller, user_controller,
};
use larder_core::{ErrorResponse, FieldError, MealType, Nutrients};
use larder_service::{
    AddPantryItemRequest, BarcodeLookupResponse, CheckItemRequest, ClearCheckedResponse, CountResponse,
    CreateFoodRequest, CreateGroupRequest, CreateMealRequest, CreatePantryRequest, CreateShoppingListItemRequest,
    DailySummaryResponse, FoodDetailsResponse, FoodListResponse, FoodResponse, GroupDetailsResponse,
    GroupMemberResponse, GroupResponse, InviteResponse, JoinGroupRequest, MealLogResponse, MealTypeSummary,
    OpenFoodFactsProduct, PantryItemResponse, PantryResponse, ProductNutriments, SetAdminRequest,
    ShoppingListItemResponse, TransferAdminRequest, UpdateFoodRequest, UpdateGroupRequest, UpdateMealRequest,
    UpdatePantryItemRequest, UpdatePantryRequest, UpdateShoppingListItemRequest, UpdateUserRequest,
    UserResponse, UserSummary, VirtualMemberRequest, VirtualMemberResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Larder API",
        version = "1.0.0",
        description = "Household food management: foods, pantries, shopping lists, meals and groups",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers((url = "/api/v1", description = "API v1")),
    paths(
        food_controller::list_foods,
        food_controller::count_foods,
        food_controller::get_food,
        food_controller::get_food_by_barcode,
        food_controller::create_food,
        food_controller::import_food,
        food_controller::update_food,
        food_controller::delete_food,
        pantry_controller::list_pantries,
        pantry_controller::get_pantry,
        pantry_controller::create_pantry,
        pantry_controller::update_pantry,
        pantry_controller::delete_pantry,
        pantry_controller::list_items,
        pantry_controller::add_item,
        pantry_controller::update_item,
        pantry_controller::remove_item,
        shopping_list_controller::list_items,
        shopping_list_controller::create_item,
        shopping_list_controller::update_item,
        shopping_list_controller::delete_item,
        shopping_list_controller::check_item,
        shopping_list_controller::uncheck_item,
        shopping_list_controller::clear_checked,
        meal_controller::list_meals,
        meal_controller::create_meal,
        meal_controller::update_meal,
        meal_controller::delete_meal,
        meal_controller::daily_summary,
        group_controller::list_groups,
        group_controller::create_group,
        group_controller::get_group,
        group_controller::update_group,
        group_controller::delete_group,
        group_controller::create_invite,
        group_controller::join_group,
        group_controller::leave_group,
        group_controller::set_admin,
        group_controller::remove_member,
        group_controller::transfer_admin,
        group_controller::list_virtual_members,
        group_controller::create_virtual_member,
        group_controller::update_virtual_member,
        group_controller::delete_virtual_member,
        user_controller::get_current_user,
        user_controller::update_current_user,
        user_controller::delete_current_user,
        health_controller::health_check,
        health_controller::readiness_check,
        health_controller::liveness_check,
    ),
    components(schemas(
        ErrorResponse,
        FieldError,
        MealType,
        Nutrients,
        CreateFoodRequest,
        UpdateFoodRequest,
        FoodResponse,
        FoodDetailsResponse,
        FoodListResponse,
        BarcodeLookupResponse,
        CountResponse,
        OpenFoodFactsProduct,
        ProductNutriments,
        CreatePantryRequest,
        UpdatePantryRequest,
        PantryResponse,
        AddPantryItemRequest,
        UpdatePantryItemRequest,
        PantryItemResponse,
        CreateShoppingListItemRequest,
        UpdateShoppingListItemRequest,
        CheckItemRequest,
        ShoppingListItemResponse,
        ClearCheckedResponse,
        CreateMealRequest,
        UpdateMealRequest,
        MealLogResponse,
        MealTypeSummary,
        DailySummaryResponse,
        CreateGroupRequest,
        UpdateGroupRequest,
        JoinGroupRequest,
        SetAdminRequest,
        TransferAdminRequest,
        VirtualMemberRequest,
        GroupResponse,
        GroupMemberResponse,
        GroupDetailsResponse,
        VirtualMemberResponse,
        InviteResponse,
        UpdateUserRequest,
        UserResponse,
        UserSummary,
        health_controller::HealthResponse,
        health_controller::ReadinessResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "foods", description = "Food catalogue and OpenFoodFacts lookups"),
        (name = "pantries", description = "Pantries and their items"),
        (name = "shopping-list", description = "Personal and group shopping lists"),
        (name = "meals", description = "Meal logging and daily nutrition"),
        (name = "groups", description = "Households, invites and membership"),
        (name = "users", description = "The current user"),
        (name = "health", description = "Health checks")
    )
)]
pub struct ApiDoc;

/// Registers the bearer token scheme referenced by secured operations.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token issued by the identity provider"))
                        .build(),
                ),
            );
        }
    }
}
