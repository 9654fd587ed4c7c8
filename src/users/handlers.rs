use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};
use uuid::Uuid;

use super::dto::{
    CreateUserRequest, UpdateUserRequest, UserResponse, VerifyPasswordRequest,
    VerifyPasswordResponse,
};
use crate::{
    app::{created, Created},
    auth::services::AuthUser,
    error::{ApiError, ApiResult, ValidJson, ValidPath},
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user)
                .put(update_user)
                .patch(update_user)
                .delete(delete_user),
        )
        .route("/users/:id/verify_password", post(verify_password))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state.users().list_all().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Open sign-up; staff accounts come from the admin CLI.
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<CreateUserRequest>,
) -> ApiResult<Created<UserResponse>> {
    let user = state.users().create(payload, false).await?;
    Ok(created(format!("/api/users/{}", user.id), user.into()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    state
        .users()
        .get_by_id(id)
        .await?
        .map(|u| Json(u.into()))
        .ok_or(ApiError::NotFound("user"))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    auth.ensure_can_act_for(id)?;
    if payload.is_staff.is_some() && !auth.is_staff {
        warn!(user_id = %auth.user_id, "non-staff tried to change staff flag");
        return Err(ApiError::forbidden());
    }
    state
        .users()
        .update(id, payload)
        .await?
        .map(|u| Json(u.into()))
        .ok_or(ApiError::NotFound("user"))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<StatusCode> {
    auth.ensure_can_act_for(id)?;
    if state.users().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("user"))
    }
}

#[instrument(skip(state, payload))]
pub async fn verify_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<VerifyPasswordRequest>,
) -> ApiResult<Json<VerifyPasswordResponse>> {
    auth.ensure_can_act_for(id)?;
    let is_valid = state
        .users()
        .verify_password(id, &payload.password)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(VerifyPasswordResponse { is_valid }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn signup_is_public_and_hides_the_hash() {
        let app = TestApp::new();
        let (status, body) = app
            .call(
                Method::POST,
                "/api/users",
                None,
                Some(json!({
                    "username": "ann",
                    "email": "Ann@Example.com",
                    "password": "long-enough",
                    "weight": "62.5",
                    "age": 31
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["email"], "ann@example.com");
        assert_eq!(body["weight"], "62.5");
        assert_eq!(body["is_staff"], false);
        assert!(body.get("password").is_none());
        assert!(body.get("password_hash").is_none());

        let (status, body) = app
            .call(
                Method::POST,
                "/api/users",
                None,
                Some(json!({"username": "ann", "email": "a@b.co", "password": "long-enough"})),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "username is already taken");
    }

    #[tokio::test]
    async fn verify_password_reports_validity() {
        let app = TestApp::new();
        let (id, token) = app.user("ann", false).await;
        let uri = format!("/api/users/{id}/verify_password");

        let (status, body) = app
            .call(Method::POST, &uri, Some(&token), Some(json!({"password": "password123"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_valid"], true);

        let (status, body) = app
            .call(Method::POST, &uri, Some(&token), Some(json!({"password": "nope"})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_valid"], false);
    }

    #[tokio::test]
    async fn writes_need_owner_or_staff() {
        let app = TestApp::new();
        let (ann, ann_token) = app.user("ann", false).await;
        let (_, bob_token) = app.user("bob", false).await;
        let (_, staff_token) = app.user("root", true).await;
        let uri = format!("/api/users/{ann}");

        let (status, _) = app
            .call(Method::PATCH, &uri, Some(&bob_token), Some(json!({"age": 40})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .call(Method::PATCH, &uri, Some(&ann_token), Some(json!({"is_staff": true})))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app
            .call(Method::PUT, &uri, Some(&staff_token), Some(json!({"age": 40})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["age"], 40);

        let (status, _) = app.call(Method::DELETE, &uri, Some(&bob_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app.call(Method::DELETE, &uri, Some(&ann_token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.call(Method::GET, &uri, Some(&staff_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleting_a_user_removes_their_plans_and_favorites() {
        let app = TestApp::new();
        let (ann, token) = app.user("ann", false).await;
        let (_, staff) = app.user("root", true).await;

        let (_, meal) = app
            .call(Method::POST, "/api/meals", Some(&token), Some(json!({"name": "Soup"})))
            .await;
        let (status, _) = app
            .call(
                Method::POST,
                "/api/favorites",
                Some(&token),
                Some(json!({"meal_id": meal["id"]})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = app
            .call(Method::POST, "/api/meal-plans", Some(&token), Some(json!({"duration": 7})))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = app
            .call(Method::DELETE, &format!("/api/users/{ann}"), Some(&staff), None)
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, plans) = app.call(Method::GET, "/api/meal-plans", Some(&staff), None).await;
        assert!(plans.as_array().unwrap().is_empty());
        let (_, favorites) = app.call(Method::GET, "/api/favorites", Some(&staff), None).await;
        assert!(favorites.as_array().unwrap().is_empty());
    }
}
