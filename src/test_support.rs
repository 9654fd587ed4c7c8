//! Router-level helpers shared by the handler tests.

use axum::{
    body::{to_bytes, Body},
    extract::FromRef,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use crate::app::build_app;
use crate::auth::services::JwtKeys;
use crate::state::AppState;
use crate::users::dto::CreateUserRequest;

pub const TEST_PASSWORD: &str = "password123";

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::fake();
        let router = build_app(state.clone());
        Self { state, router }
    }

    /// Creates a user with [`TEST_PASSWORD`] and returns its id and an access token.
    pub async fn user(&self, username: &str, staff: bool) -> (Uuid, String) {
        let user = self
            .state
            .users()
            .create(
                CreateUserRequest {
                    username: username.into(),
                    email: format!("{username}@example.com"),
                    password: TEST_PASSWORD.into(),
                    weight: None,
                    height: None,
                    age: None,
                    diet_type_id: None,
                },
                staff,
            )
            .await
            .expect("create test user");
        let token = JwtKeys::from_ref(&self.state)
            .sign_access(user.id, staff)
            .expect("sign test token");
        (user.id, token)
    }

    pub async fn user_token(&self, username: &str, staff: bool) -> String {
        self.user(username, staff).await.1
    }

    pub async fn raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&String>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => req.body(Body::empty()),
        }
        .expect("build request");
        self.router.clone().oneshot(req).await.expect("router is infallible")
    }

    /// Sends a request and decodes the body as JSON; non-JSON bodies come back
    /// as a string, empty ones as `null`.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&String>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let res = self.raw(method, uri, token, body).await;
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }
}
