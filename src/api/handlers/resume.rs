//! Handler for the tracked resume redirect.

use axum::{
    extract::{ConnectInfo, Query, State},
    http::{HeaderMap, Method, Uri, header},
};
use serde_json::json;
use std::net::SocketAddr;
use tracing::info;
use validator::Validate;

use crate::api::dto::resume::{RedirectResponse, ResumeQuery, ResumeRequest};
use crate::domain::entities::RequestMeta;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Records a visit and redirects to the resolved target.
///
/// # Endpoint
///
/// `GET /resume?user=<user>&co=<company>&jid=<job id>`
///
/// All parameters are optional; `rid` is accepted in place of `jid`.
///
/// # Request Flow
///
/// 1. Build the record key, applying defaults for missing parameters
/// 2. Resolve the visit (see [`crate::application::services::RedirectService`])
/// 3. Queue an activity log entry (fire-and-forget)
/// 4. Respond
///
/// # Responses
///
/// - **302 Found** with `Location` when a target was resolved
/// - **404 Not Found** when no target exists at any level
/// - **503 Service Unavailable** when the store fails
///
/// All three have an empty body.
///
/// # Errors
///
/// Returns 400 Bad Request if a parameter exceeds 256 characters.
pub async fn resume_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<ResumeQuery>,
) -> Result<RedirectResponse, AppError> {
    query.validate().map_err(|e| {
        AppError::bad_request("Invalid query parameters", json!({ "errors": e.to_string() }))
    })?;

    let meta = RequestMeta {
        http_method: method.to_string(),
        raw_query_string: uri.query().map(str::to_string),
        http_referrer: header_value(&headers, header::REFERER),
        user_agent: header_value(&headers, header::USER_AGENT),
        ip: Some(client_ip(&headers, addr, state.behind_proxy)),
    };
    let request = ResumeRequest::new(query, meta);

    let key = state
        .redirect_service
        .key_for(request.user, request.company, request.job_id);
    info!(
        "Request from company {} to view {}'s resume: {}",
        key.company, key.user, key.job_id
    );

    let outcome = state.redirect_service.resolve(&key).await;
    let response = RedirectResponse::from_outcome(&outcome);

    state.activity_logger.log_activity(request.meta, key, &outcome);

    Ok(response)
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
