use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{CreateDietTypeRequest, DietTypeResponse, UpdateDietTypeRequest};
use crate::{
    app::{created, Created},
    auth::services::AuthUser,
    error::{ApiError, ApiResult, ValidJson, ValidPath},
    state::AppState,
};

pub fn diet_type_routes() -> Router<AppState> {
    Router::new()
        .route("/diet-types", get(list_diet_types).post(create_diet_type))
        .route(
            "/diet-types/:id",
            get(get_diet_type)
                .put(update_diet_type)
                .patch(update_diet_type)
                .delete(delete_diet_type),
        )
}

#[instrument(skip(state))]
pub async fn list_diet_types(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> ApiResult<Json<Vec<DietTypeResponse>>> {
    let rows = state.diet_types().list_all().await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_diet_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidJson(payload): ValidJson<CreateDietTypeRequest>,
) -> ApiResult<Created<DietTypeResponse>> {
    let diet_type = state.diet_types().create(payload.into()).await?;
    Ok(created(format!("/api/diet-types/{}", diet_type.id), diet_type.into()))
}

#[instrument(skip(state))]
pub async fn get_diet_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<Json<DietTypeResponse>> {
    state
        .diet_types()
        .get_by_id(id)
        .await?
        .map(|d| Json(d.into()))
        .ok_or(ApiError::NotFound("diet type"))
}

#[instrument(skip(state, payload))]
pub async fn update_diet_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(payload): ValidJson<UpdateDietTypeRequest>,
) -> ApiResult<Json<DietTypeResponse>> {
    state
        .diet_types()
        .update(id, payload.into())
        .await?
        .map(|d| Json(d.into()))
        .ok_or(ApiError::NotFound("diet type"))
}

#[instrument(skip(state))]
pub async fn delete_diet_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    ValidPath(id): ValidPath<Uuid>,
) -> ApiResult<StatusCode> {
    if state.diet_types().delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("diet type"))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn crud_roundtrip() {
        let app = TestApp::new();
        let token = app.user_token("dietitian", false).await;

        let (status, body) = app
            .call(
                Method::POST,
                "/api/diet-types",
                Some(&token),
                Some(json!({"name": "Keto", "description": "low carb", "is_restricted": true})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_str().unwrap().to_string();
        assert_eq!(body["name"], "Keto");

        let (status, body) = app
            .call(
                Method::PATCH,
                &format!("/api/diet-types/{id}"),
                Some(&token),
                Some(json!({"is_restricted": false})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_restricted"], false);
        assert_eq!(body["description"], "low carb");

        let (status, body) = app.call(Method::GET, "/api/diet-types", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let uri = format!("/api/diet-types/{id}");
        let (status, _) = app.call(Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = app.call(Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.call(Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn blank_name_is_a_field_error() {
        let app = TestApp::new();
        let token = app.user_token("dietitian", false).await;
        let (status, body) = app
            .call(Method::POST, "/api/diet-types", Some(&token), Some(json!({"name": "  "})))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["fields"]["name"].is_array());
    }

    #[tokio::test]
    async fn requires_token() {
        let app = TestApp::new();
        let (status, _) = app.call(Method::GET, "/api/diet-types", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
