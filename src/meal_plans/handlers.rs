use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::dto::{
    AddPlanMealRequest, CreateMealPlanRequest, MealPlanResponse, PlanMealResponse,
    UpdateMealPlanRequest,
};
use super::repo_types::{MealPlan, NewMealPlan};
use crate::{
    app::{created, Created},
    auth::services::AuthUser,
    error::{ApiError, ApiResult, ValidJson, ValidPath},
    meals::dto::MealResponse,
    pricing::dto::PriceResponse,
    state::AppState,
};

pub fn meal_plan_routes() -> Router<AppState> {
    Router::new()
        .route("/meal-plans", get(list_meal_plans).post(create_meal_plan))
        .route(
            "/meal-plans/:id",
            get(get_meal_plan)
                .put(update_meal_plan)
                .patch(update_meal_plan)
                .delete(delete_meal_plan),
        )
        .route("/meal-plans/:id/calculate_price", get(calculate_price))
}

pub fn plan_meal_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/meal-plans/:id/meals",
            get(list_plan_meals).post(add_plan_meal),
        )
        .route("/meal-plans/:id/meals/:meal_id", delete(remove_plan_meal))
}

/// Loads the plan and checks the caller may touch it.
async fn owned_plan(state: &AppState, auth: &AuthUser, id: Uuid) -> ApiResult<MealPlan> {
    let plan = state
        .meal_plans()
        .get_by_id(id)
        .await?
        .ok_or(ApiError::NotFound("meal plan"))?;
    auth.ensure_can_act_for(plan.user_id)?;
    Ok(plan)
}

/// Staff see every plan; everybody else their own.
#[instrument(skip(state))]
pub async fn list_meal_plans(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<MealPlanResponse>>> {
    let plans = if auth.is_staff {
        state.meal_plans().list_all().await?
    } else {
        state.meal_plans().list_for_user(auth.user_id).await?
    };
    Ok(Json(plans.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_meal_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(payload): ValidJson<CreateMealPlanRequest>,
) -> ApiResult<Created<MealPlanResponse>> {
    let user_id = payload.user_id.unwrap_or(auth.user_id);
    if user_id != auth.user_id && !auth.is_staff {
        warn!(caller = %auth.user_id, %user_id, "plan for another user refused");
        return Err(ApiError::forbidden());
    }
    let plan = state
        .meal_plans()
        .create(NewMealPlan {
            user_id,
            duration: payload.duration,
        })
        .await?;
    Ok(created(format!("/api/meal-plans/{}", plan.id), plan.into()))
}

#[instrument(skip(state))]
pub async fn get_meal_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<Json<MealPlanResponse>> {
    let plan = owned_plan(&state, &auth, id).await?;
    Ok(Json(plan.into()))
}

#[instrument(skip(state, payload))]
pub async fn update_meal_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<UpdateMealPlanRequest>,
) -> ApiResult<Json<MealPlanResponse>> {
    owned_plan(&state, &auth, id).await?;
    state
        .meal_plans()
        .update(id, payload.into())
        .await?
        .map(|p| Json(p.into()))
        .ok_or(ApiError::NotFound("meal plan"))
}

#[instrument(skip(state))]
pub async fn delete_meal_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<StatusCode> {
    owned_plan(&state, &auth, id).await?;
    if state.meal_plans().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("meal plan"))
    }
}

/// Sum of the stored prices of the plan's meals.
#[instrument(skip(state))]
pub async fn calculate_price(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<Json<PriceResponse>> {
    owned_plan(&state, &auth, id).await?;
    let price = state.pricing().compute_plan_price(id).await?;
    Ok(Json(PriceResponse { price }))
}

#[instrument(skip(state))]
pub async fn list_plan_meals(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<Json<Vec<MealResponse>>> {
    owned_plan(&state, &auth, id).await?;
    let meals = state.meal_plans().list_meals(id).await?;
    Ok(Json(meals.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
pub async fn add_plan_meal(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<AddPlanMealRequest>,
) -> ApiResult<Created<PlanMealResponse>> {
    owned_plan(&state, &auth, id).await?;
    let link = state.meal_plans().add_meal(id, payload.meal_id).await?;
    Ok(created(
        format!("/api/meal-plans/{id}/meals/{}", link.meal_id),
        link.into(),
    ))
}

#[instrument(skip(state))]
pub async fn remove_plan_meal(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath((id, meal_id)): ValidPath<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    owned_plan(&state, &auth, id).await?;
    if state.meal_plans().remove_meal(id, meal_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("meal plan meal"))
    }
}
