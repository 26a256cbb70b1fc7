//! Integration tests for Liahna.
//!
//! The storefront and admin routers are driven in-process with
//! `tower::ServiceExt::oneshot`. The storefront runs on the bundled catalog
//! with an in-memory session store; admin tests use a lazily connected pool
//! and only exercise paths that fail before reaching the database.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p liahna-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use liahna_storefront::middleware::session_layer;
use liahna_storefront::services::CatalogService;
use liahna_storefront::state::AppState;

/// Address every test request claims to come from.
pub const TEST_CLIENT_IP: &str = "203.0.113.7";

/// A response reduced to what tests assert on.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Storefront router over the bundled catalog and an in-memory session store.
///
/// # Panics
///
/// Panics if the bundled catalog cannot be parsed.
#[must_use]
#[allow(clippy::expect_used)]
pub fn storefront_app() -> Router {
    let catalog = CatalogService::from_fixtures(Duration::from_secs(60))
        .expect("bundled catalog should parse");
    liahna_storefront::app(
        AppState::with_catalog(catalog),
        session_layer(MemoryStore::default(), false),
    )
}

/// In-process client that carries the session cookie between requests.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    #[must_use]
    pub const fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    /// Client for a fresh storefront.
    #[must_use]
    pub fn storefront() -> Self {
        Self::new(storefront_app())
    }

    /// Whether the server has issued a session cookie yet.
    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.cookie.is_some()
    }

    /// Forget the session cookie, as a new visitor would.
    pub fn forget_session(&mut self) {
        self.cookie = None;
    }

    /// Send a request, optionally with a JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails.
    #[allow(clippy::expect_used)]
    pub async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", TEST_CLIENT_IP);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request should build");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            && let Some(pair) = set_cookie.split(';').next()
        {
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }
}
