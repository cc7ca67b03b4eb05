//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor,
};

/// Creates the per-client rate limiter for the public redirect endpoint.
///
/// Requests exceeding the limit receive `429 Too Many Requests`. Limits are
/// keyed by the socket peer address, so the server must be started with
/// `into_make_service_with_connect_info`.
///
/// `per_second` is the replenish interval in seconds for one token and
/// `burst` the bucket size; both must be non-zero (checked by
/// [`crate::config::Config::validate`]).
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/resume", get(resume_handler))
///     .layer(rate_limit::layer(2, 100));
/// ```
pub fn layer(
    per_second: u64,
    burst: u32,
) -> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(per_second)
            .burst_size(burst)
            .finish()
            .expect("rate limit values are validated at startup"),
    );

    GovernorLayer::new(governor_conf)
}
