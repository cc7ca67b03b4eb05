//! Activity log entities.
//!
//! Every resolution attempt produces one append-only [`NewActivity`]. The
//! history types at the bottom describe the per-company report built from
//! those entries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::redirect::RedirectKey;
use super::resolution::{Resolution, ResolutionSource};

/// Raw metadata of the inbound request.
///
/// All fields except the method are optional to handle missing headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub http_method: String,
    pub raw_query_string: Option<String>,
    pub http_referrer: Option<String>,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

/// What the service did with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityOutcome {
    Redirected {
        target_url: String,
        source: ResolutionSource,
    },
    NotFound,
    Failed {
        error: String,
    },
}

impl ActivityOutcome {
    /// Stored label of the outcome.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Redirected { source, .. } => source.as_str(),
            Self::NotFound => "not_found",
            Self::Failed { .. } => "error",
        }
    }

    pub fn redirected_to(&self) -> Option<&str> {
        match self {
            Self::Redirected { target_url, .. } => Some(target_url),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed { error } => Some(error),
            _ => None,
        }
    }

    pub fn from_default(&self) -> bool {
        matches!(self, Self::Redirected { source, .. } if source.is_default())
    }
}

/// Input data for appending an activity log entry.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub ts: DateTime<Utc>,
    pub meta: RequestMeta,
    pub key: RedirectKey,
    pub outcome: ActivityOutcome,
    pub first_visit: bool,
}

impl NewActivity {
    /// Builds the entry for a completed resolution.
    pub fn from_resolution(meta: RequestMeta, key: RedirectKey, resolution: &Resolution) -> Self {
        let outcome = match resolution {
            Resolution::Redirect {
                target_url, source, ..
            } => ActivityOutcome::Redirected {
                target_url: target_url.clone(),
                source: *source,
            },
            Resolution::NotFound { .. } => ActivityOutcome::NotFound,
        };

        Self {
            ts: Utc::now(),
            meta,
            key,
            outcome,
            first_visit: resolution.first_visit(),
        }
    }

    /// Builds the entry for a resolution that failed with an error.
    pub fn failed(meta: RequestMeta, key: RedirectKey, error: impl Into<String>) -> Self {
        Self {
            ts: Utc::now(),
            meta,
            key,
            outcome: ActivityOutcome::Failed {
                error: error.into(),
            },
            first_visit: false,
        }
    }
}

/// Filter for the per-company activity report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub user: String,
    pub company: Option<String>,
    /// Maximum number of entries kept per company group.
    pub max_history: i64,
}

/// One activity entry of a company group, as returned by the store.
///
/// `history_count` is the size of the whole group, before capping.
#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub company: String,
    pub history_count: i64,
    pub ts: DateTime<Utc>,
    pub http_method: String,
    pub http_referrer: Option<String>,
    pub raw_query_string: Option<String>,
    pub redirected_to: Option<String>,
}

impl HistoryRow {
    /// Request line in the form `GET <referrer>?<query>`.
    pub fn request_line(&self) -> String {
        format!(
            "{} {}?{}",
            self.http_method,
            self.http_referrer.as_deref().unwrap_or("Unknown"),
            self.raw_query_string.as_deref().unwrap_or("")
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub url: String,
    pub ts: DateTime<Utc>,
    pub redirected_to: Option<String>,
}

/// Activity of one user at one company, newest entries first.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyHistory {
    pub user: String,
    pub company: String,
    pub history_count: i64,
    pub history: Vec<HistoryEntry>,
}
