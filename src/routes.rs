//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /resume`  - Tracked redirect (rate limited per client IP)
//! - `GET  /health`  - Health check: store and activity queue
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on `/resume`
//! - **Path normalization** - Trailing slash handling

use crate::api::handlers::{health_handler, resume_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Token bucket settings for the public redirect route.
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub per_second: u64,
    pub burst: u32,
}

/// Constructs the application router with all routes and middleware.
///
/// The returned service needs connection info, so serve it with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn app_router(state: AppState, rate_limit: RateLimit) -> NormalizePath<Router> {
    let resume_router = Router::new()
        .route("/resume", get(resume_handler))
        .layer(rate_limit::layer(rate_limit.per_second, rate_limit.burst));

    let router = Router::new()
        .merge(resume_router)
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}
