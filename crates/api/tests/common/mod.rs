//! Shared harness for HTTP-level tests.
//!
//! Builds the production router over an in-memory store and a recording
//! notifier, and drives it with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use a4l_api::auth::jwt::JwtConfig;
use a4l_api::config::ServerConfig;
use a4l_api::router::build_app_router;
use a4l_api::state::AppState;
use a4l_core::account::Account;
use a4l_core::testing::{seed_account, MemoryStore, RecordingNotifier};
use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const BASE_URL: &str = "http://cars.test";
pub const PASSWORD: &str = "password123";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        public_base_url: BASE_URL.to_string(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            session_expiry_mins: 60,
        },
        email: None,
        bootstrap_superadmin: None,
    }
}

/// The full router plus handles on its collaborators.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    /// A fresh app whose store already holds the system roles.
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::bootstrapped().await);
        let notifier = Arc::new(RecordingNotifier::new());
        let config = test_config();
        let state = AppState::new(store.clone(), notifier.clone(), config.clone());

        Self {
            router: build_app_router(state, &config),
            store,
            notifier,
        }
    }

    /// Insert a verified account with [`PASSWORD`] and the named role.
    pub async fn seed(&self, username: &str, role: &str) -> Account {
        seed_account(&self.store, username, PASSWORD, role, true).await
    }

    /// Send a raw request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Send a JSON request and decode the JSON response body.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        let response = self.send(request).await;
        let status = response.status();
        (status, body_json(response).await)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.call(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.call(Method::DELETE, uri, token, None).await
    }

    /// Log in and return the session token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .post(
                "/api/v1/auth/login",
                None,
                serde_json::json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"]
            .as_str()
            .expect("access_token")
            .to_string()
    }

    /// Seed an account with `role` and log it in.
    pub async fn seed_and_login(&self, username: &str, role: &str) -> (Account, String) {
        let account = self.seed(username, role).await;
        let token = self.login(username, PASSWORD).await;
        (account, token)
    }

    /// Follow a confirmation link and return the `Location` it redirects to.
    pub async fn open_link(&self, uri: &str) -> String {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request");
        let response = self.send(request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .expect("redirect location")
            .to_string()
    }
}

/// Decode a response body as JSON; empty bodies become `Value::Null`.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    }
}
