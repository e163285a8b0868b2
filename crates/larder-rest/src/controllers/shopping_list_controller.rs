//! Shopping list controller.

use crate::{
    extractors::{parse_id, AuthenticatedUser, ValidatedJson},
    middleware::HttpCache,
    responses::{created, no_content, ok, ApiResult, AppError, CreatedResult},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Json, Router,
};
use larder_core::GroupId;
use larder_repository::ShoppingListFilter;
use larder_service::{
    CheckItemRequest, ClearCheckedResponse, CreateShoppingListItemRequest, ShoppingListItemResponse,
    UpdateShoppingListItemRequest,
};
use serde::Deserialize;
use utoipa::IntoParams;

const EVICT_LIST: [&str; 1] = ["shopping_list:*"];

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListQuery {
    /// Only this group's items.
    pub group_id: Option<GroupId>,
    pub checked: Option<bool>,
}

impl From<ShoppingListQuery> for ShoppingListFilter {
    fn from(query: ShoppingListQuery) -> Self {
        Self {
            group_id: query.group_id,
            checked: query.checked,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ClearCheckedQuery {
    /// Clear this group's list instead of the personal one.
    pub group_id: Option<GroupId>,
}

pub fn router(cache: &HttpCache) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            cache
                .cached(get(list_items), "shopping_list", 30)
                .merge(cache.evicting(post(create_item), EVICT_LIST)),
        )
        .route("/clear-checked", cache.evicting(post(clear_checked), EVICT_LIST))
        .route(
            "/:id",
            cache
                .evicting(patch(update_item), EVICT_LIST)
                .merge(cache.evicting(delete(delete_item), EVICT_LIST)),
        )
        .route(
            "/:id/check",
            cache.evicting(post(check_item), ["shopping_list:*", "pantry_items:*"]),
        )
        .route("/:id/uncheck", cache.evicting(post(uncheck_item), EVICT_LIST))
}

/// List personal items and items of the caller's groups.
#[utoipa::path(
    get,
    path = "/shopping-list-items",
    tag = "shopping-list",
    params(ShoppingListQuery),
    responses(
        (status = 200, description = "Shopping list items", body = [ShoppingListItemResponse]),
        (status = 404, description = "Group not found or not a member")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_items(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ShoppingListQuery>,
) -> ApiResult<Vec<ShoppingListItemResponse>> {
    ok(state.shopping_list_service.list(user.id, query.into()).await?)
}

/// Add an item by name or by food.
#[utoipa::path(
    post,
    path = "/shopping-list-items",
    tag = "shopping-list",
    request_body = CreateShoppingListItemRequest,
    responses(
        (status = 201, description = "Item created", body = ShoppingListItemResponse),
        (status = 422, description = "Neither name nor food given")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateShoppingListItemRequest>,
) -> CreatedResult<ShoppingListItemResponse> {
    created(state.shopping_list_service.create(user.id, request).await?)
}

#[utoipa::path(
    patch,
    path = "/shopping-list-items/{id}",
    tag = "shopping-list",
    params(("id" = String, Path, description = "Item id")),
    request_body = UpdateShoppingListItemRequest,
    responses((status = 200, description = "Item updated", body = ShoppingListItemResponse)),
    security(("bearer_auth" = []))
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateShoppingListItemRequest>,
) -> ApiResult<ShoppingListItemResponse> {
    let id = parse_id(&id, "shopping list item")?;
    ok(state.shopping_list_service.update(user.id, id, request).await?)
}

#[utoipa::path(
    delete,
    path = "/shopping-list-items/{id}",
    tag = "shopping-list",
    params(("id" = String, Path, description = "Item id")),
    responses((status = 204, description = "Item deleted")),
    security(("bearer_auth" = []))
)]
pub async fn delete_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "shopping list item")?;
    state.shopping_list_service.delete(user.id, id).await?;
    Ok(no_content())
}

/// Mark an item bought, optionally stocking it into a pantry.
#[utoipa::path(
    post,
    path = "/shopping-list-items/{id}/check",
    tag = "shopping-list",
    params(("id" = String, Path, description = "Item id")),
    request_body(content = CheckItemRequest, description = "Optional target pantry"),
    responses(
        (status = 200, description = "Item checked", body = ShoppingListItemResponse),
        (status = 409, description = "Already checked")
    ),
    security(("bearer_auth" = []))
)]
pub async fn check_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    body: Option<Json<CheckItemRequest>>,
) -> ApiResult<ShoppingListItemResponse> {
    let id = parse_id(&id, "shopping list item")?;
    let request = body.map(|Json(request)| request).unwrap_or_default();
    ok(state.shopping_list_service.check(user.id, id, request).await?)
}

#[utoipa::path(
    post,
    path = "/shopping-list-items/{id}/uncheck",
    tag = "shopping-list",
    params(("id" = String, Path, description = "Item id")),
    responses(
        (status = 200, description = "Item unchecked", body = ShoppingListItemResponse),
        (status = 400, description = "Item is not checked")
    ),
    security(("bearer_auth" = []))
)]
pub async fn uncheck_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<ShoppingListItemResponse> {
    let id = parse_id(&id, "shopping list item")?;
    ok(state.shopping_list_service.uncheck(user.id, id).await?)
}

/// Delete every checked item of the personal or a group list.
#[utoipa::path(
    post,
    path = "/shopping-list-items/clear-checked",
    tag = "shopping-list",
    params(ClearCheckedQuery),
    responses((status = 200, description = "Number of deleted items", body = ClearCheckedResponse)),
    security(("bearer_auth" = []))
)]
pub async fn clear_checked(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ClearCheckedQuery>,
) -> ApiResult<ClearCheckedResponse> {
    ok(state.shopping_list_service.clear_checked(user.id, query.group_id).await?)
}
