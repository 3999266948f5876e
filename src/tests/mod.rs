//! Integration and unit tests for the Plantheon application.
//!
//! API tests drive the full router (middleware included) with
//! `tower::ServiceExt::oneshot` against an in-memory SQLite database.
//!
//! ## Test Modules
//!
//! - **auth_api_tests**: Registration, login, bearer tokens and profile
//! - **disease_api_tests**: Disease catalog and bulk import
//! - **activity_api_tests**: Activity CRUD, day lookup and month calendar
//! - **post_api_tests**: Posts, counters and comments
//! - **scan_history_api_tests**: Per-user scan history
//! - **health_api_tests**: Health, readiness, version, metrics and global middleware
//! - **error_tests**: Error mapping and response envelope
//! - **config_tests**: Configuration loading and validation
//! - **db_tests**: Schema initialization and storage invariants
//!
//! Individual test modules can be run with:
//! ```bash
//! cargo test disease_api_tests
//! ```

pub mod auth_api_tests;
pub mod config_tests;
pub mod error_tests;
pub mod health_api_tests;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use crate::auth::hash_password;
use crate::config::AppConfig;
use crate::models::user::{User, UserRole};
use crate::state::AppState;
use crate::store::{self, user::NewUser};

pub(crate) struct TestApp {
    pub app: Router,
    pub state: AppState,
}

pub(crate) fn test_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.database.url = "sqlite::memory:".to_string();
    cfg.auth.jwt_secret = "test-secret".to_string();
    cfg.auth.bcrypt_cost = 4;
    cfg
}

/// A single long-lived connection keeps the in-memory database alive.
pub(crate) async fn memory_pool() -> sqlx::SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    crate::db::init_db(&pool).await.unwrap();
    pool
}

pub(crate) async fn setup_test_app() -> TestApp {
    setup_test_app_with(|_| {}).await
}

pub(crate) async fn setup_test_app_with(tweak: impl FnOnce(&mut AppConfig)) -> TestApp {
    let mut cfg = test_config();
    tweak(&mut cfg);
    let state = AppState::new(memory_pool().await, cfg);
    TestApp { app: crate::routes::router(state.clone()), state }
}

impl TestApp {
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::POST, uri, token, Some(body))).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(request(Method::PUT, uri, token, Some(body))).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, token, None)).await
    }

    /// Registers `username` through the API and returns `(token, user_id)`.
    pub async fn register(&self, username: &str) -> (String, String) {
        let (status, body) = self
            .post(
                "/api/v1/auth/register",
                None,
                json!({
                    "email": format!("{}@example.com", username),
                    "username": username,
                    "password": "secret123",
                    "full_name": format!("{} gardener", username),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        (
            body["data"]["token"].as_str().unwrap().to_string(),
            body["data"]["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// Inserts an admin directly into the store and returns a token for it.
    pub async fn admin_token(&self) -> String {
        let user = self.insert_user("admin_root", UserRole::Admin).await;
        self.state.jwt.issue(&user).unwrap()
    }

    pub async fn insert_user(&self, username: &str, role: UserRole) -> User {
        let password_hash = hash_password("secret123".to_string(), 4).await.unwrap();
        store::user::insert(
            &self.state.db,
            NewUser {
                email: format!("{}@example.com", username),
                username: username.to_string(),
                password_hash,
                full_name: format!("{} gardener", username),
                role,
            },
        )
        .await
        .unwrap()
    }

    /// Creates a disease as admin and returns its JSON.
    pub async fn create_disease(&self, admin: &str, class_name: &str, kind: &str) -> Value {
        let (status, body) = self
            .post(
                "/api/v1/diseases",
                Some(admin),
                json!({
                    "name": format!("{} disease", class_name),
                    "class_name": class_name,
                    "type": kind,
                    "description": "Yellow spots on leaves",
                    "solution": "Remove affected leaves",
                    "image_link": ["https://img.example.com/a.jpg"],
                    "plant_name": "Tomato",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create disease failed: {}", body);
        body["data"].clone()
    }
}

pub(crate) fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// A `multipart/form-data` request carrying one file field.
pub(crate) fn multipart_request(uri: &str, token: &str, field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    let boundary = "plantheon-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n", field, file_name).as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .unwrap()
}
