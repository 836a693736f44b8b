//! Shared harness: the full router over in-memory stores.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use poston::{
    app::build_app,
    auth::jwt::JwtKeys,
    config::{AppConfig, Environment, JwtConfig, DEFAULT_TOKEN_TTL},
    memory::{MemoryTaskRepo, MemoryUserRepo},
    state::AppState,
    tasks::repo::TaskRepo,
};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub users: Arc<MemoryUserRepo>,
    pub keys: JwtKeys,
}

pub struct Reply {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

pub fn test_config(environment: Environment) -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        database_max_connections: 1,
        jwt: JwtConfig {
            secret: "integration-secret".into(),
            issuer: "poston".into(),
            ttl: DEFAULT_TOKEN_TTL,
        },
        host: "127.0.0.1".into(),
        port: 0,
        frontend_url: "http://localhost:3000".into(),
        environment,
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_environment(Environment::Development)
    }

    pub fn with_environment(environment: Environment) -> Self {
        Self::with_task_store(environment, Arc::new(MemoryTaskRepo::default()))
    }

    /// Real user store, caller-supplied task store.
    pub fn with_task_store(environment: Environment, tasks: Arc<dyn TaskRepo>) -> Self {
        let users = Arc::new(MemoryUserRepo::default());
        let state = AppState::from_parts(users.clone(), tasks, test_config(environment))
            .expect("state");
        let keys = state.keys.clone();
        Self {
            app: build_app(state),
            users,
            keys,
        }
    }

    pub async fn send(&self, method: &str, uri: &str, auth: Option<&str>, body: Option<Value>) -> Reply {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.send_raw(request).await
    }

    pub async fn send_raw(&self, request: Request<Body>) -> Reply {
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
                panic!("non-json body ({status}): {}", String::from_utf8_lossy(&bytes))
            })
        };
        Reply { status, headers, body }
    }

    /// Authenticated call with `Bearer <token>`.
    pub async fn call(&self, method: &str, uri: &str, token: &str, body: Option<Value>) -> Reply {
        let auth = format!("Bearer {token}");
        self.send(method, uri, Some(&auth), body).await
    }

    /// Logs in and returns `(user id, token)`.
    pub async fn login(&self, username: &str) -> (i64, String) {
        let reply = self
            .send("POST", "/api/auth/login", None, Some(serde_json::json!({ "username": username })))
            .await;
        assert_eq!(reply.status, StatusCode::OK, "login failed: {}", reply.body);
        let id = reply.body["data"]["user"]["id"].as_i64().unwrap();
        let token = reply.body["data"]["token"].as_str().unwrap().to_string();
        (id, token)
    }

    pub async fn create_task(&self, token: &str, title: &str) -> i64 {
        let reply = self
            .call("POST", "/api/tasks", token, Some(serde_json::json!({ "title": title })))
            .await;
        assert_eq!(reply.status, StatusCode::CREATED, "create failed: {}", reply.body);
        reply.body["data"]["id"].as_i64().unwrap()
    }
}
