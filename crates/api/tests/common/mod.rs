//! Shared harness for the HTTP tests: an in-memory database behind the real
//! router, driven with `oneshot`.

#![allow(dead_code)]

use axum::{
    Router,
    body::{self, Body},
    http::{Request, StatusCode},
};
use million_api::{AppState, create_router};
use million_core::auth::LoginThrottle;
use million_shared::{JwtConfig, JwtService};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tower::ServiceExt; // for `oneshot`

pub const PASSWORD: &str = "CorrectHorse9Battery";

pub struct TestApp {
    router: Router,
    pub db: DatabaseConnection,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_state(|state| state).await
    }

    pub async fn with_throttle(throttle: LoginThrottle) -> Self {
        Self::with_state(|state| state.with_throttle(throttle)).await
    }

    pub async fn with_state(configure: impl FnOnce(AppState) -> AppState) -> Self {
        let db = million_db::connect_in_memory()
            .await
            .expect("in-memory database");
        let jwt = JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expires_secs: 900,
            refresh_token_expires_secs: 3600,
        });
        let state = configure(AppState::new(db.clone(), jwt));
        Self {
            router: create_router(state),
            db,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.request_with_headers(method, uri, token, &[], body).await
    }

    pub async fn request_with_headers(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        headers: &[(&str, &str)],
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, Some(token), Some(body)).await
    }

    /// Signs up `username` and returns the token pair.
    pub async fn signup(&self, username: &str) -> Value {
        let (status, body) = self
            .request(
                "POST",
                "/auth/signup",
                None,
                Some(json!({ "username": username, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        body
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/auth/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> (StatusCode, Value) {
        self.request(
            "POST",
            "/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh_token })),
        )
        .await
    }
}

pub fn access(tokens: &Value) -> &str {
    tokens["access_token"].as_str().unwrap()
}

pub fn refresh_token(tokens: &Value) -> &str {
    tokens["refresh_token"].as_str().unwrap()
}
