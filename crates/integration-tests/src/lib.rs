//! Test harness for driving the full API in-process.
//!
//! [`TestContext`] builds the real router over a flat-file store in a
//! temporary directory. Requests go through `tower::ServiceExt::oneshot`,
//! exercising routing, extractors, and handlers without binding a socket.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use paperback_api::config::{ApiConfig, StoreBackend};
use paperback_api::models::UserRecord;
use paperback_api::routes;
use paperback_api::state::AppState;
use paperback_api::store::JsonFileStore;
use paperback_core::types::{Email, Role, UserId};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

/// Signing secret used by every test context. High-entropy so it passes the
/// same validation the server applies to real secrets.
const TEST_TOKEN_SECRET: &str = "kY8#mP2$vQ9@nR4!xT7&wZ1*uA5^bC3%dJ6(fH0)";

/// A fully wired application over a temporary store.
pub struct TestContext {
    _dir: tempfile::TempDir,
    state: AppState,
    app: Router,
}

impl TestContext {
    /// Build a fresh application with an empty store.
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = ApiConfig {
            host: "127.0.0.1".parse::<IpAddr>().unwrap(),
            port: 0,
            store_backend: StoreBackend::Json,
            store_path: dir.path().join("db.json"),
            database_url: None,
            token_secret: SecretString::from(TEST_TOKEN_SECRET),
            token_ttl_secs: 3600,
            sentry_dsn: None,
        };
        let store = JsonFileStore::open(config.store_path.clone()).await.unwrap();
        let state = AppState::new(config, Arc::new(store));
        let app = routes::app(state.clone());
        Self {
            _dir: dir,
            state,
            app,
        }
    }

    /// Shared application state, for direct store access in assertions.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Path of the backing JSON file.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.state.config().store_path.clone()
    }

    /// Send one request, returning the status and decoded JSON body.
    ///
    /// An empty body decodes as `Value::Null`.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            // Non-JSON bodies (the health probes) come back as a string.
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    /// Register a user through the API, returning `(user_id, access_token)`.
    pub async fn register_user(&self, email: &str) -> (String, String) {
        let (status, body) = self
            .request(
                "POST",
                "/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": "hunter2hunter2",
                    "fullName": "Test User",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
        let user_id = body["user"]["id"].as_str().unwrap().to_owned();
        let token = body["accessToken"].as_str().unwrap().to_owned();
        (user_id, token)
    }

    /// Mint an admin token directly. The bearer token is self-contained, so
    /// no matching store record is needed.
    #[must_use]
    pub fn admin_token(&self) -> String {
        let now = Utc::now();
        let record = UserRecord {
            id: UserId::from("admin-1"),
            email: Email::parse("admin@example.com").unwrap(),
            password_hash: String::new(),
            full_name: "Admin".to_owned(),
            phone: None,
            role: Role::Admin,
            created_at: now,
            updated_at: now,
        };
        self.state.tokens().issue(&record).unwrap()
    }

    /// Insert a book straight into the store, bypassing the API.
    pub async fn seed_book(&self, id: &str, name: &str, original: f64, discount: Option<f64>) {
        let mut book = json!({
            "id": id,
            "name": name,
            "description": "",
            "categories": {},
            "list_price": original,
            "original_price": original,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
        });
        if let Some(discount) = discount {
            book["discount_price"] = json!(discount);
        }
        self.state.store().insert("books", book).await.unwrap();
    }
}
