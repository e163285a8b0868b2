//! Food catalogue controller.

use crate::{
    extractors::{parse_id, AuthenticatedUser, OptionalUser, PaginationQuery, ValidatedJson},
    middleware::HttpCache,
    responses::{created, no_content, ok, ApiResult, AppError, CreatedResult},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
    Router,
};
use larder_repository::FoodFilter;
use larder_service::{
    BarcodeLookupResponse, CountResponse, CreateFoodRequest, FoodDetailsResponse, FoodListResponse, FoodResponse,
    UpdateFoodRequest,
};
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

/// Search criteria shared by the list and count endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FoodSearchQuery {
    /// Case-insensitive match on name or brand.
    pub search: Option<String>,
    pub category: Option<String>,
}

impl From<FoodSearchQuery> for FoodFilter {
    fn from(query: FoodSearchQuery) -> Self {
        Self {
            search: query.search.filter(|s| !s.trim().is_empty()),
            category: query.category.filter(|c| !c.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct FoodDetailsQuery {
    /// Attach the OpenFoodFacts product when the food has a barcode.
    #[serde(default)]
    pub include_open_food_facts: bool,
}

const BARCODE_KEY: &str = "food_barcode";
const BARCODE_TTL: u64 = 3600;

const EVICT_IMPORT: [&str; 3] = ["foods:list*", "foods:count*", "food_barcode:*:barcode:{barcode}*"];
/// Pantry items and meal logs embed the food they reference.
const EVICT_DELETE: [&str; 6] = [
    "food:*:id:{id}*",
    "foods:list*",
    "foods:count*",
    "food_barcode:*",
    "pantry_items:*",
    "meals*",
];

pub fn router(cache: &HttpCache) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            cache
                .cached(get(list_foods), "foods:list", 300)
                .merge(cache.evicting(post(create_food), ["foods:list*", "foods:count*"])),
        )
        .route("/count", cache.cached(get(count_foods), "foods:count", 300))
        .route(
            "/barcode/:barcode",
            cache.cached(get(get_food_by_barcode), BARCODE_KEY, BARCODE_TTL),
        )
        .route(
            "/import/:barcode",
            cache.evicting(post(import_food), EVICT_IMPORT),
        )
        .route(
            "/:id",
            cache
                .cached(get(get_food), "food", 300)
                .merge(cache.evicting(
                    patch(update_food),
                    ["food:*:id:{id}*", "foods:list*", "food_barcode:*"],
                ))
                .merge(cache.evicting(delete(delete_food), EVICT_DELETE)),
        )
}

/// List foods, paginated.
#[utoipa::path(
    get,
    path = "/foods",
    tag = "foods",
    params(FoodSearchQuery, PaginationQuery),
    responses(
        (status = 200, description = "Page of foods", body = FoodListResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_foods(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<FoodSearchQuery>,
    Query(pagination): Query<PaginationQuery>,
) -> ApiResult<FoodListResponse> {
    let response = state.food_service.list(filter.into(), pagination.into()).await?;
    ok(response)
}

/// Count foods matching a search.
#[utoipa::path(
    get,
    path = "/foods/count",
    tag = "foods",
    params(FoodSearchQuery),
    responses((status = 200, description = "Number of matching foods", body = CountResponse)),
    security(("bearer_auth" = []))
)]
pub async fn count_foods(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(filter): Query<FoodSearchQuery>,
) -> ApiResult<CountResponse> {
    let response = state.food_service.count(filter.into()).await?;
    ok(response)
}

/// Get a food by id.
#[utoipa::path(
    get,
    path = "/foods/{id}",
    tag = "foods",
    params(("id" = String, Path, description = "Food id"), FoodDetailsQuery),
    responses(
        (status = 200, description = "Food found", body = FoodDetailsResponse),
        (status = 404, description = "Food not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_food(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<String>,
    Query(query): Query<FoodDetailsQuery>,
) -> ApiResult<FoodDetailsResponse> {
    let id = parse_id(&id, "food")?;
    let response = state.food_service.get(id, query.include_open_food_facts).await?;
    ok(response)
}

/// Look up a barcode locally, then on OpenFoodFacts. Does not require a token.
#[utoipa::path(
    get,
    path = "/foods/barcode/{barcode}",
    tag = "foods",
    params(("barcode" = String, Path, description = "EAN/UPC barcode")),
    responses(
        (status = 200, description = "Local food or OpenFoodFacts product", body = BarcodeLookupResponse),
        (status = 404, description = "Unknown barcode"),
        (status = 502, description = "OpenFoodFacts unavailable")
    )
)]
pub async fn get_food_by_barcode(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(barcode): Path<String>,
) -> ApiResult<BarcodeLookupResponse> {
    debug!(anonymous = user.is_none(), "Barcode lookup: {}", barcode);
    let response = state.food_service.get_by_barcode(&barcode).await?;
    ok(response)
}

/// Create a food.
#[utoipa::path(
    post,
    path = "/foods",
    tag = "foods",
    request_body = CreateFoodRequest,
    responses(
        (status = 201, description = "Food created", body = FoodResponse),
        (status = 409, description = "Barcode already in use"),
        (status = 422, description = "Validation failed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_food(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateFoodRequest>,
) -> CreatedResult<FoodResponse> {
    let response = state.food_service.create(user.id, request).await?;
    created(response)
}

/// Import a food from OpenFoodFacts.
#[utoipa::path(
    post,
    path = "/foods/import/{barcode}",
    tag = "foods",
    params(("barcode" = String, Path, description = "EAN/UPC barcode")),
    responses(
        (status = 201, description = "Food imported", body = FoodResponse),
        (status = 404, description = "OpenFoodFacts has no such product"),
        (status = 409, description = "Barcode already known")
    ),
    security(("bearer_auth" = []))
)]
pub async fn import_food(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(barcode): Path<String>,
) -> CreatedResult<FoodResponse> {
    let response = state
        .food_service
        .import_from_open_food_facts(user.id, &barcode)
        .await?;
    created(response)
}

/// Update a food. Only its creator may.
#[utoipa::path(
    patch,
    path = "/foods/{id}",
    tag = "foods",
    params(("id" = String, Path, description = "Food id")),
    request_body = UpdateFoodRequest,
    responses(
        (status = 200, description = "Food updated", body = FoodResponse),
        (status = 403, description = "Not the creator"),
        (status = 404, description = "Food not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_food(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateFoodRequest>,
) -> ApiResult<FoodResponse> {
    let id = parse_id(&id, "food")?;
    let response = state.food_service.update(user.id, id, request).await?;
    ok(response)
}

/// Delete a food. Only its creator may.
#[utoipa::path(
    delete,
    path = "/foods/{id}",
    tag = "foods",
    params(("id" = String, Path, description = "Food id")),
    responses(
        (status = 204, description = "Food deleted"),
        (status = 403, description = "Not the creator"),
        (status = 404, description = "Food not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_food(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "food")?;
    state.food_service.delete(user.id, id).await?;
    Ok(no_content())
}
