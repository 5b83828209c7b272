//! Integration tests for Shoptrail.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process HTTP tests over the in-memory store
//! cargo test -p shoptrail-integration-tests
//!
//! # Also run the PostgreSQL repository tests
//! SHOPTRAIL_TEST_DATABASE_URL=postgres://localhost/shoptrail_test \
//!     cargo test -p shoptrail-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `accounts` - register/login
//! - `otp` - send/verify one-time passwords
//! - `visits` - visit lifecycle over HTTP
//! - `dashboard` - analytics, health, CORS and request ids
//! - `postgres` - repository behaviour against a real database (ignored by default)

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header::CONTENT_TYPE},
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use shoptrail_server::config::ServerConfig;
use shoptrail_server::db::Storage;
use shoptrail_server::services::clock::ManualClock;
use shoptrail_server::{AppState, app};

/// Origin configured as the allowed frontend in tests.
pub const FRONTEND_ORIGIN: &str = "http://localhost:5173";

/// An in-process server over the in-memory store with a controllable clock.
pub struct TestApp {
    pub router: Router,
    pub clock: Arc<ManualClock>,
}

/// A captured response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).unwrap()
    }

    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Fixed instant the test clock starts at.
#[must_use]
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap()
}

/// Configuration that never touches the environment.
#[must_use]
pub fn test_config() -> ServerConfig {
    ServerConfig::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://unused@localhost/shoptrail".to_owned()),
        "FRONTEND_URL" => Some(FRONTEND_ORIGIN.to_owned()),
        _ => None,
    })
    .unwrap()
}

impl TestApp {
    #[must_use]
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::new(epoch()));
        let state = AppState::with_clock(test_config(), Storage::in_memory(), clock.clone());
        Self {
            router: app(state),
            clock,
        }
    }

    /// Send a request with an optional JSON body.
    pub async fn send(&self, method: Method, uri: &str, body: Option<&Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.send_request(request).await
    }

    /// Send a fully built request.
    pub async fn send_request(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            headers,
            body: body.to_vec(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: &Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    /// POST raw bytes as `application/json`.
    pub async fn post_raw(&self, uri: &str, body: &'static str) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        self.send_request(request).await
    }

    /// Create a visit and return its id.
    pub async fn create_visit(&self, body: &Value) -> String {
        let response = self.post("/visits", body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.json()["visitId"].as_str().unwrap().to_owned()
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}
