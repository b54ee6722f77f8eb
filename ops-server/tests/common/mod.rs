//! Shared helpers for HTTP-level tests
//!
//! 每个测试独立的内存数据库与临时工作目录。

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use ops_server::{Config, ServerState};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const ADMIN_PASSWORD: &str = "admin-secret";

pub struct TestApp {
    pub app: Router,
    pub state: ServerState,
    _dir: tempfile::TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: http::HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// Numeric error code of an error envelope
    pub fn code(&self) -> Option<u64> {
        self.body.get("code").and_then(Value::as_u64)
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_overrides(dir.path().to_string_lossy(), 0);
        config.admin_password = Some(ADMIN_PASSWORD.into());
        config.cookie_secure = false;
        let state = ServerState::initialize_in_memory(&config).await.unwrap();
        let app = ops_server::core::server::build_app(&state);
        Self {
            app,
            state,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.call(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.call(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.call(Method::DELETE, uri, Some(token), None).await
    }

    /// Returns the bearer token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let res = self
            .call(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.body);
        res.body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        let username = self.state.config.admin_username.clone();
        self.login(&username, ADMIN_PASSWORD).await
    }

    /// Create a user with `role` through the admin API and log in as them
    pub async fn user_token(&self, admin: &str, username: &str, role: &str) -> String {
        let res = self
            .post(
                "/api/users",
                admin,
                json!({
                    "username": username,
                    "password": "password1",
                    "display_name": username,
                    "role": role,
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "create user failed: {}", res.body);
        self.login(username, "password1").await
    }

    pub async fn create_employee(&self, token: &str, first: &str, email: &str) -> i64 {
        let res = self
            .post(
                "/api/employees",
                token,
                json!({
                    "first_name": first,
                    "last_name": "Tester",
                    "email": email,
                    "department": "Farm",
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "create employee failed: {}", res.body);
        res.body["id"].as_i64().unwrap()
    }

    pub async fn create_stock(&self, token: &str, name: &str, quantity: f64) -> i64 {
        let res = self
            .post(
                "/api/stock",
                token,
                json!({
                    "product_name": name,
                    "unit": "kg",
                    "quantity": quantity,
                    "store": "Main",
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "create stock failed: {}", res.body);
        res.body["id"].as_i64().unwrap()
    }
}
