#![allow(dead_code)]

/// Common test utilities for integration tests
///
/// Every test gets a fresh router over an in-memory store with cheap
/// password hashing, so nothing here needs a database.

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tasknest_api::app::{build_router, AppState};
use tasknest_api::config::Config;
use tasknest_shared::auth::password::HashCost;
use tasknest_shared::store::MemoryStore;
use tower::ServiceExt;
use uuid::Uuid;

pub const SECRET: &str = "integration-secret-at-least-32-bytes";

/// Test context containing the router and its backing store
pub struct TestContext {
    pub app: axum::Router,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

/// A decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    /// Builds a context with extra environment overrides
    pub fn with_env(vars: &[(&str, &str)]) -> Self {
        let mut env: HashMap<String, String> = HashMap::from([
            ("DATABASE_URL".to_string(), "postgresql://unused/tasknest".to_string()),
            ("JWT_SECRET".to_string(), SECRET.to_string()),
        ]);
        for (key, value) in vars {
            env.insert(key.to_string(), value.to_string());
        }

        let mut config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();
        config.auth.hash_cost = HashCost::minimal();

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config);
        let app = build_router(state.clone());

        Self { app, store, state }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("Non-JSON body ({}): {}", status, String::from_utf8_lossy(&bytes))
            })
        };

        TestResponse { status, headers, body }
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None).await
    }

    /// Registers a user and returns (token, user id)
    pub async fn register(&self, username: &str, password: &str) -> (String, Uuid) {
        let res = self
            .post(
                "/api/v1/auth/register",
                None,
                serde_json::json!({ "username": username, "password": password }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register failed: {}", res.body);

        let token = res.body["token"].as_str().unwrap().to_string();
        let id = res.body["user"]["id"].as_str().unwrap().parse().unwrap();
        (token, id)
    }

    /// Creates a task through the API and returns its id
    pub async fn create_task(&self, token: &str, title: &str) -> Uuid {
        let res = self
            .post("/api/v1/tasks", Some(token), serde_json::json!({ "title": title }))
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "create failed: {}", res.body);
        res.body["id"].as_str().unwrap().parse().unwrap()
    }
}

pub fn unique_username(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..8])
}
