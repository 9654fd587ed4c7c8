use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{CreateFavoriteRequest, FavoriteResponse, UpdateFavoriteRequest};
use super::repo_types::{Favorite, NewFavorite};
use crate::{
    app::{created, Created},
    auth::services::AuthUser,
    error::{ApiError, ApiResult, ValidJson, ValidPath},
    state::AppState,
};

pub fn favorite_routes() -> Router<AppState> {
    Router::new()
        .route("/favorites", get(list_favorites).post(create_favorite))
        .route(
            "/favorites/:id",
            get(get_favorite)
                .put(update_favorite)
                .patch(update_favorite)
                .delete(delete_favorite),
        )
}

async fn owned_favorite(state: &AppState, auth: &AuthUser, id: Uuid) -> ApiResult<Favorite> {
    let favorite = state
        .favorites()
        .get_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("favorite"))?;
    auth.ensure_can_act_for(favorite.user_id)?;
    Ok(favorite)
}

#[instrument(skip(state))]
pub async fn list_favorites(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<FavoriteResponse>>> {
    let favorites = if auth.is_staff {
        state.favorites().list_all().await?
    } else {
        state.favorites().list_for_user(auth.user_id).await?
    };
    Ok(Json(favorites.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(payload): ValidJson<CreateFavoriteRequest>,
) -> ApiResult<Created<FavoriteResponse>> {
    let user_id = payload.user_id.unwrap_or(auth.user_id);
    auth.ensure_can_act_for(user_id)?;
    let favorite = state
        .favorites()
        .create(NewFavorite {
            user_id,
            meal_id: payload.meal_id,
        })
        .await?;
    Ok(created(format!("/api/favorites/{}", favorite.id), favorite.into()))
}

#[instrument(skip(state))]
pub async fn get_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<Json<FavoriteResponse>> {
    Ok(Json(owned_favorite(&state, &auth, id).await?.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<UpdateFavoriteRequest>,
) -> ApiResult<Json<FavoriteResponse>> {
    owned_favorite(&state, &auth, id).await?;
    state
        .favorites()
        .update(id, payload.into())
        .await?
        .map(|f| Json(f.into()))
        .ok_or(ApiError::NotFound("favorite"))
}

#[instrument(skip(state))]
pub async fn delete_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<StatusCode> {
    owned_favorite(&state, &auth, id).await?;
    if state.favorites().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("favorite"))
    }
}
