//! Meal log controller.

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
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use larder_service::{CreateMealRequest, DailySummaryResponse, MealLogResponse, UpdateMealRequest};
use serde::Deserialize;
use utoipa::IntoParams;

const MEAL_TTL: u64 = 60;

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MealRangeQuery {
    /// Inclusive lower bound on `eatenAt`.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `eatenAt`.
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    /// UTC day; defaults to today.
    pub date: Option<NaiveDate>,
}

pub fn router(cache: &HttpCache) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            cache.cached(get(list_meals), "meals", MEAL_TTL).merge(cache.evicting(
                post(create_meal),
                ["meals:{userId}*", "meals_summary:{userId}*", "pantry_items:*"],
            )),
        )
        .route(
            "/summary",
            cache.cached(get(daily_summary), "meals_summary", MEAL_TTL),
        )
        .route(
            "/:id",
            cache
                .evicting(patch(update_meal), ["meals:{userId}*", "meals_summary:{userId}*"])
                .merge(cache.evicting(
                    delete(delete_meal),
                    ["meals:{userId}*", "meals_summary:{userId}*"],
                )),
        )
}

/// List the caller's meal logs, newest first.
#[utoipa::path(
    get,
    path = "/meals",
    tag = "meals",
    params(MealRangeQuery),
    responses((status = 200, description = "Meal logs", body = [MealLogResponse])),
    security(("bearer_auth" = []))
)]
pub async fn list_meals(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(range): Query<MealRangeQuery>,
) -> ApiResult<Vec<MealLogResponse>> {
    ok(state.meal_service.list(user.id, range.from, range.to).await?)
}

/// Log a meal, consuming from a pantry item when one is given.
#[utoipa::path(
    post,
    path = "/meals",
    tag = "meals",
    request_body = CreateMealRequest,
    responses(
        (status = 201, description = "Meal logged", body = MealLogResponse),
        (status = 404, description = "Food or pantry item not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_meal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateMealRequest>,
) -> CreatedResult<MealLogResponse> {
    created(state.meal_service.create(user.id, request).await?)
}

#[utoipa::path(
    patch,
    path = "/meals/{id}",
    tag = "meals",
    params(("id" = String, Path, description = "Meal log id")),
    request_body = UpdateMealRequest,
    responses(
        (status = 200, description = "Meal updated", body = MealLogResponse),
        (status = 404, description = "Meal log not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_meal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateMealRequest>,
) -> ApiResult<MealLogResponse> {
    let id = parse_id(&id, "meal log")?;
    ok(state.meal_service.update(user.id, id, request).await?)
}

#[utoipa::path(
    delete,
    path = "/meals/{id}",
    tag = "meals",
    params(("id" = String, Path, description = "Meal log id")),
    responses((status = 204, description = "Meal log deleted")),
    security(("bearer_auth" = []))
)]
pub async fn delete_meal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "meal log")?;
    state.meal_service.delete(user.id, id).await?;
    Ok(no_content())
}

/// Nutrient totals for one UTC day.
#[utoipa::path(
    get,
    path = "/meals/summary",
    tag = "meals",
    params(SummaryQuery),
    responses((status = 200, description = "Daily totals", body = DailySummaryResponse)),
    security(("bearer_auth" = []))
)]
pub async fn daily_summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<DailySummaryResponse> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    ok(state.meal_service.daily_summary(user.id, date).await?)
}
