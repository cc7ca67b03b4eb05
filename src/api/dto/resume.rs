//! DTOs for the resume redirect endpoint.

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_with::{NoneAsEmptyString, serde_as};
use tracing::error;
use validator::Validate;

use crate::domain::entities::{RequestMeta, Resolution};
use crate::error::AppError;

/// Query parameters of `GET /resume`.
///
/// Empty values are treated as absent so that `?user=&co=ACME` falls back to
/// the default user.
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ResumeQuery {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[validate(length(max = 256))]
    pub user: Option<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[validate(length(max = 256))]
    pub co: Option<String>,

    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[validate(length(max = 256))]
    pub jid: Option<String>,

    /// Older links carry the job id as `rid`; `jid` wins when both are set.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[validate(length(max = 256))]
    pub rid: Option<String>,
}

/// A parsed `/resume` request: the key parameters plus raw metadata.
#[derive(Debug, Clone)]
pub struct ResumeRequest {
    pub user: Option<String>,
    pub company: Option<String>,
    pub job_id: Option<String>,
    pub meta: RequestMeta,
}

impl ResumeRequest {
    pub fn new(query: ResumeQuery, meta: RequestMeta) -> Self {
        Self {
            user: query.user,
            company: query.co,
            job_id: query.jid.or(query.rid),
            meta,
        }
    }
}

/// Response of `GET /resume`: a status, an optional `Location`, never a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectResponse {
    pub status: StatusCode,
    pub location: Option<String>,
}

impl RedirectResponse {
    /// Maps a resolution outcome to its HTTP form.
    ///
    /// - target found → `302 Found` with `Location`
    /// - no target → `404 Not Found`
    /// - any store failure → `503 Service Unavailable`
    pub fn from_outcome(outcome: &Result<Resolution, AppError>) -> Self {
        match outcome {
            Ok(Resolution::Redirect { target_url, .. }) => Self {
                status: StatusCode::FOUND,
                location: Some(target_url.clone()),
            },
            Ok(Resolution::NotFound { .. }) => Self {
                status: StatusCode::NOT_FOUND,
                location: None,
            },
            Err(_) => Self {
                status: StatusCode::SERVICE_UNAVAILABLE,
                location: None,
            },
        }
    }
}

impl IntoResponse for RedirectResponse {
    /// A target that cannot be sent as a `Location` header yields an empty
    /// `500` instead of a redirect without a destination.
    fn into_response(self) -> Response {
        let Some(location) = self.location else {
            return self.status.into_response();
        };

        match HeaderValue::try_from(location.as_str()) {
            Ok(value) => (self.status, [(header::LOCATION, value)]).into_response(),
            Err(e) => {
                error!("Stored target {:?} is not a valid Location header: {}", location, e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
