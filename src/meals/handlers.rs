use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{
    AddIngredientRequest, CreateMealRequest, MealIngredientLineResponse, MealIngredientResponse,
    MealResponse, UpdateMealRequest,
};
use crate::{
    app::{created, Created},
    auth::services::AuthUser,
    error::{ApiError, ApiResult, ValidJson, ValidPath},
    pricing::dto::PriceResponse,
    state::AppState,
};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route(
            "/meals/:id",
            get(get_meal)
                .put(update_meal)
                .patch(update_meal)
                .delete(delete_meal),
        )
        .route("/meals/:id/calculate_price", get(calculate_price))
}

pub fn meal_ingredient_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/meals/:id/ingredients",
            get(list_meal_ingredients).post(add_meal_ingredient),
        )
        .route(
            "/meals/:id/ingredients/:ingredient_id",
            delete(remove_meal_ingredient),
        )
}

#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<Vec<MealResponse>>> {
    let meals = state.meals().list_all().await?;
    Ok(Json(meals.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_meal(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidJson(payload): ValidJson<CreateMealRequest>,
) -> ApiResult<Created<MealResponse>> {
    let meal = state.meals().create(payload.into()).await?;
    Ok(created(format!("/api/meals/{}", meal.id), meal.into()))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<Json<MealResponse>> {
    state
        .meals()
        .get_by_id(id)
        .await?
        .map(|m| Json(m.into()))
        .ok_or(ApiError::NotFound("meal"))
}

#[instrument(skip(state, payload))]
pub async fn update_meal(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<UpdateMealRequest>,
) -> ApiResult<Json<MealResponse>> {
    state
        .meals()
        .update(id, payload.into())
        .await?
        .map(|m| Json(m.into()))
        .ok_or(ApiError::NotFound("meal"))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<StatusCode> {
    if state.meals().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("meal"))
    }
}

/// Freshly computed from the ingredient links; the stored price is not read.
#[instrument(skip(state))]
pub async fn calculate_price(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<Json<PriceResponse>> {
    let price = state.pricing().compute_meal_price(id).await?;
    Ok(Json(PriceResponse { price }))
}

#[instrument(skip(state))]
pub async fn list_meal_ingredients(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<Json<Vec<MealIngredientLineResponse>>> {
    let lines = state.meals().list_ingredients(id).await?;
    Ok(Json(lines.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
pub async fn add_meal_ingredient(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<AddIngredientRequest>,
) -> ApiResult<Created<MealIngredientResponse>> {
    let link = state
        .meals()
        .add_ingredient(id, payload.ingredient_id, payload.quantity)
        .await?;
    Ok(created(
        format!("/api/meals/{id}/ingredients/{}", link.ingredient_id),
        link.into(),
    ))
}

#[instrument(skip(state))]
pub async fn remove_meal_ingredient(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidPath((id, ingredient_id)): ValidPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    if state.meals().remove_ingredient(id, ingredient_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("meal ingredient"))
    }
}
