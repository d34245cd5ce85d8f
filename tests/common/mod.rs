//! Shared harness: the full router over an in-memory store, driven with
//! in-process `oneshot` requests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use rental_api::config::{AdminConfig, AppConfig, SessionConfig, StoreConfig};
use rental_api::state::AppState;
use rental_api::store::memory::MemoryStore;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASS: &str = "hunter2";

pub struct TestApp {
    pub router: Router,
    /// Direct handle on the backing store, for seeding and inspection.
    pub store: Arc<MemoryStore>,
}

fn test_config() -> AppConfig {
    AppConfig {
        store: StoreConfig { url: "http://store.invalid".into(), token: "unused".into() },
        admin: AdminConfig { username: ADMIN_USER.into(), password: ADMIN_PASS.into() },
        session: SessionConfig { ttl_secs: 86_400 },
    }
}

pub fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), test_config());
    TestApp { router: rental_api::app(state), store }
}

impl TestApp {
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
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn login(&self) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/auth/login",
                None,
                Some(json!({ "username": ADMIN_USER, "password": ADMIN_PASS })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().expect("login response carries a token").to_string()
    }
}
