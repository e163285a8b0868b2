//! Pantry and pantry item controller.

use crate::{
    extractors::{parse_id, AuthenticatedUser, ValidatedJson},
    middleware::HttpCache,
    responses::{created, no_content, ok, ApiResult, AppError, CreatedResult},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Router,
};
use larder_service::{
    AddPantryItemRequest, CreatePantryRequest, PantryItemResponse, PantryResponse, UpdatePantryItemRequest,
    UpdatePantryRequest,
};

const PANTRY_TTL: u64 = 60;

pub fn router(cache: &HttpCache) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            cache
                .cached(get(list_pantries), "pantries", PANTRY_TTL)
                .merge(cache.evicting(post(create_pantry), ["pantries:*"])),
        )
        .route(
            "/:id",
            cache
                .cached(get(get_pantry), "pantry", PANTRY_TTL)
                .merge(cache.evicting(patch(update_pantry), ["pantries:*", "pantry:*:id:{id}*"]))
                .merge(cache.evicting(
                    delete(delete_pantry),
                    ["pantries:*", "pantry:*:id:{id}*", "pantry_items:*:id:{id}*"],
                )),
        )
        .route(
            "/:id/items",
            cache
                .cached(get(list_items), "pantry_items", PANTRY_TTL)
                .merge(cache.evicting(post(add_item), ["pantry_items:*:id:{id}*"])),
        )
        .route(
            "/:id/items/:item_id",
            cache
                .evicting(patch(update_item), ["pantry_items:*:id:{id}*"])
                .merge(cache.evicting(delete(remove_item), ["pantry_items:*:id:{id}*"])),
        )
}

/// List the caller's own and shared pantries.
#[utoipa::path(
    get,
    path = "/pantries",
    tag = "pantries",
    responses((status = 200, description = "Accessible pantries", body = [PantryResponse])),
    security(("bearer_auth" = []))
)]
pub async fn list_pantries(State(state): State<AppState>, user: AuthenticatedUser) -> ApiResult<Vec<PantryResponse>> {
    ok(state.pantry_service.list(user.id).await?)
}

#[utoipa::path(
    get,
    path = "/pantries/{id}",
    tag = "pantries",
    params(("id" = String, Path, description = "Pantry id")),
    responses(
        (status = 200, description = "Pantry found", body = PantryResponse),
        (status = 404, description = "Pantry not found or not accessible")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_pantry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<PantryResponse> {
    let id = parse_id(&id, "pantry")?;
    ok(state.pantry_service.get(user.id, id).await?)
}

/// Create a pantry, optionally shared with a group.
#[utoipa::path(
    post,
    path = "/pantries",
    tag = "pantries",
    request_body = CreatePantryRequest,
    responses(
        (status = 201, description = "Pantry created", body = PantryResponse),
        (status = 403, description = "Not a member of the group"),
        (status = 409, description = "Name already used")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_pantry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreatePantryRequest>,
) -> CreatedResult<PantryResponse> {
    created(state.pantry_service.create(user.id, request).await?)
}

#[utoipa::path(
    patch,
    path = "/pantries/{id}",
    tag = "pantries",
    params(("id" = String, Path, description = "Pantry id")),
    request_body = UpdatePantryRequest,
    responses(
        (status = 200, description = "Pantry updated", body = PantryResponse),
        (status = 403, description = "Not the owner")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_pantry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdatePantryRequest>,
) -> ApiResult<PantryResponse> {
    let id = parse_id(&id, "pantry")?;
    ok(state.pantry_service.update(user.id, id, request).await?)
}

#[utoipa::path(
    delete,
    path = "/pantries/{id}",
    tag = "pantries",
    params(("id" = String, Path, description = "Pantry id")),
    responses(
        (status = 204, description = "Pantry and its items deleted"),
        (status = 403, description = "Not the owner")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_pantry(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "pantry")?;
    state.pantry_service.delete(user.id, id).await?;
    Ok(no_content())
}

#[utoipa::path(
    get,
    path = "/pantries/{id}/items",
    tag = "pantries",
    params(("id" = String, Path, description = "Pantry id")),
    responses((status = 200, description = "Items in the pantry", body = [PantryItemResponse])),
    security(("bearer_auth" = []))
)]
pub async fn list_items(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> ApiResult<Vec<PantryItemResponse>> {
    let id = parse_id(&id, "pantry")?;
    ok(state.pantry_service.list_items(user.id, id).await?)
}

/// Put a food into a pantry. The unit defaults to the food's unit.
#[utoipa::path(
    post,
    path = "/pantries/{id}/items",
    tag = "pantries",
    params(("id" = String, Path, description = "Pantry id")),
    request_body = AddPantryItemRequest,
    responses(
        (status = 201, description = "Item added", body = PantryItemResponse),
        (status = 404, description = "Pantry or food not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<AddPantryItemRequest>,
) -> CreatedResult<PantryItemResponse> {
    let id = parse_id(&id, "pantry")?;
    created(state.pantry_service.add_item(user.id, id, request).await?)
}

#[utoipa::path(
    patch,
    path = "/pantries/{id}/items/{item_id}",
    tag = "pantries",
    params(
        ("id" = String, Path, description = "Pantry id"),
        ("item_id" = String, Path, description = "Pantry item id")
    ),
    request_body = UpdatePantryItemRequest,
    responses(
        (status = 200, description = "Item updated", body = PantryItemResponse),
        (status = 404, description = "Item not in this pantry")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, item_id)): Path<(String, String)>,
    ValidatedJson(request): ValidatedJson<UpdatePantryItemRequest>,
) -> ApiResult<PantryItemResponse> {
    let id = parse_id(&id, "pantry")?;
    let item_id = parse_id(&item_id, "pantry item")?;
    ok(state.pantry_service.update_item(user.id, id, item_id, request).await?)
}

#[utoipa::path(
    delete,
    path = "/pantries/{id}/items/{item_id}",
    tag = "pantries",
    params(
        ("id" = String, Path, description = "Pantry id"),
        ("item_id" = String, Path, description = "Pantry item id")
    ),
    responses((status = 204, description = "Item removed")),
    security(("bearer_auth" = []))
)]
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((id, item_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "pantry")?;
    let item_id = parse_id(&item_id, "pantry item")?;
    state.pantry_service.remove_item(user.id, id, item_id).await?;
    Ok(no_content())
}
