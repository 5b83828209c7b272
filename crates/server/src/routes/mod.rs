//! HTTP route handlers for Shoptrail.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness
//! GET  /health/ready            - Readiness (storage ping)
//!
//! # Accounts
//! POST /register                - Create account         (201 text)
//! POST /login                   - Check credentials      (200 text)
//!
//! # One-time passwords
//! POST /send-otp                - Store code for email   (200 text)
//! POST /verify-otp              - Verify and consume     (200 text)
//!
//! # Visits
//! GET  /visits                  - All visits, newest first
//! POST /visits                  - Record visit           (201 {message, visitId})
//! GET  /visits/{id}             - One visit
//! POST /visits/{id}/add-product - Append item            (200 {message, updatedVisit})
//! POST /visits/{id}/exit        - Record exit time       (200 {message, updatedVisit})
//!
//! # Dashboard
//! GET  /analytics?range=        - Canned chart series
//! ```

pub mod analytics;
pub mod auth;
pub mod health;
pub mod otp;
pub mod visits;

use std::time::Duration;

use axum::{
    Router,
    http::{Method, Request, Response, header::CONTENT_TYPE},
    middleware,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// API routes without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/send-otp", post(otp::send_otp))
        .route("/verify-otp", post(otp::verify_otp))
        .route("/visits", get(visits::list).post(visits::create))
        .route("/visits/{id}", get(visits::show))
        .route("/visits/{id}/add-product", post(visits::add_product))
        .route("/visits/{id}/exit", post(visits::exit))
        .route("/analytics", get(analytics::show))
}

/// The complete application: routes, state and the middleware stack.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([state.config().frontend_origin.clone()]))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    routes()
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response<_>, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .layer(cors)
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
