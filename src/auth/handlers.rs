use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{RefreshRequest, TokenRequest, TokenResponse},
        services::{AuthUser, JwtKeys},
    },
    error::{ApiError, ApiResult, ValidJson},
    state::AppState,
    users::dto::UserResponse,
};

pub fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/token", post(obtain_token))
        .route("/token/refresh", post(refresh_token))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn token_pair(keys: &JwtKeys, user_id: uuid::Uuid, staff: bool) -> ApiResult<TokenResponse> {
    Ok(TokenResponse {
        access: keys.sign_access(user_id, staff)?,
        refresh: keys.sign_refresh(user_id, staff)?,
    })
}

#[instrument(skip(state, payload))]
pub async fn obtain_token(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = state
        .users()
        .authenticate(&payload.username, &payload.password)
        .await?
        .ok_or_else(|| {
            ApiError::Unauthorized("No active account found with the given credentials".into())
        })?;

    let keys = JwtKeys::from_ref(&state);
    let pair = token_pair(&keys, user.id, user.is_staff)?;
    info!(user_id = %user.id, username = %user.username, "token issued");
    Ok(Json(pair))
}

/// Staff status is re-read so a revoked flag does not survive a refresh.
#[instrument(skip(state, payload))]
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RefreshRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        ApiError::Unauthorized("Token is invalid or expired".into())
    })?;

    let user = state
        .users()
        .get_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;
    Ok(Json(token_pair(&keys, user.id, user.is_staff)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .users()
        .get_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".into()))?;
    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestApp, TEST_PASSWORD};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn login_refresh_and_me() {
        let app = TestApp::new();
        let (id, _) = app.user("ann", false).await;

        let (status, body) = app
            .call(
                Method::POST,
                "/api/token",
                None,
                Some(json!({"username": "ann", "password": TEST_PASSWORD})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let access = body["access"].as_str().unwrap().to_string();
        let refresh = body["refresh"].as_str().unwrap().to_string();

        let (status, me) = app.call(Method::GET, "/api/me", Some(&access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["id"], id.to_string());
        assert_eq!(me["username"], "ann");

        // a refresh token is not an access token
        let (status, _) = app.call(Method::GET, "/api/me", Some(&refresh), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = app
            .call(Method::POST, "/api/token/refresh", None, Some(json!({"refresh": refresh})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["access"].is_string());

        let (status, _) = app
            .call(Method::POST, "/api/token/refresh", None, Some(json!({"refresh": access})))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = TestApp::new();
        app.user("ann", false).await;
        let (status, body) = app
            .call(
                Method::POST,
                "/api/token",
                None,
                Some(json!({"username": "ann", "password": "not-it"})),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());

        let (status, _) = app
            .call(Method::GET, "/api/me", Some(&"garbage".to_string()), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
