use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{CreateIngredientRequest, IngredientResponse, UpdateIngredientRequest};
use crate::{
    app::{created, Created},
    auth::services::AuthUser,
    error::{ApiError, ApiResult, ValidJson, ValidPath},
    state::AppState,
};

pub fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route("/ingredients", get(list_ingredients).post(create_ingredient))
        .route(
            "/ingredients/:id",
            get(get_ingredient)
                .put(update_ingredient)
                .patch(update_ingredient)
                .delete(delete_ingredient),
        )
}

#[instrument(skip(state))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<Vec<IngredientResponse>>> {
    let rows = state.ingredients().list_all().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_ingredient(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidJson(payload): ValidJson<CreateIngredientRequest>,
) -> ApiResult<Created<IngredientResponse>> {
    let ingredient = state.ingredients().create(payload.into()).await?;
    Ok(created(
        format!("/api/ingredients/{}", ingredient.id),
        ingredient.into(),
    ))
}

#[instrument(skip(state))]
pub async fn get_ingredient(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<Json<IngredientResponse>> {
    state
        .ingredients()
        .get_by_id(id)
        .await?
        .map(|i| Json(i.into()))
        .ok_or(ApiError::NotFound("ingredient"))
}

#[instrument(skip(state, payload))]
pub async fn update_ingredient(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<UpdateIngredientRequest>,
) -> ApiResult<Json<IngredientResponse>> {
    state
        .ingredients()
        .update(id, payload.into())
        .await?
        .map(|i| Json(i.into()))
        .ok_or(ApiError::NotFound("ingredient"))
}

#[instrument(skip(state))]
pub async fn delete_ingredient(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<StatusCode> {
    if state.ingredients().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("ingredient"))
    }
}
