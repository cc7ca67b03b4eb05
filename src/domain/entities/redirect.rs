//! Redirect record entity and its composite key.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Job identifier marking a record as the company-wide fallback for a user.
pub const DEFAULT_JOB_ID: &str = "default";

/// Composite key identifying a single redirect record.
///
/// `(user, company, job_id)` is unique in the redirect store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RedirectKey {
    pub user: String,
    pub company: String,
    pub job_id: String,
}

impl RedirectKey {
    pub fn new(
        user: impl Into<String>,
        company: impl Into<String>,
        job_id: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            company: company.into(),
            job_id: job_id.into(),
        }
    }

    /// Key of the company default record for `(user, company)`.
    pub fn company_default(user: impl Into<String>, company: impl Into<String>) -> Self {
        Self::new(user, company, DEFAULT_JOB_ID)
    }

    /// Returns `true` if this key addresses a company default record.
    pub fn is_company_default(&self) -> bool {
        self.job_id == DEFAULT_JOB_ID
    }
}

/// A stored mapping from a `(user, company, job)` key to a target URL plus
/// visit statistics.
///
/// Records are created implicitly by the first visit and are never deleted.
#[derive(Debug, Clone, Serialize)]
pub struct RedirectRecord {
    pub key: RedirectKey,
    pub target_url: Option<String>,
    pub visits: i64,
    pub first_accessed: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

impl RedirectRecord {
    pub fn new(
        key: RedirectKey,
        target_url: Option<String>,
        visits: i64,
        first_accessed: DateTime<Utc>,
        last_accessed: DateTime<Utc>,
    ) -> Self {
        Self {
            key,
            target_url,
            visits,
            first_accessed,
            last_accessed,
        }
    }

    /// The target URL, treating an empty string as unset.
    pub fn target(&self) -> Option<&str> {
        self.target_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Result of the atomic visit upsert.
#[derive(Debug, Clone)]
pub struct VisitRecord {
    pub record: RedirectRecord,
    /// `true` when this visit created the record.
    pub inserted: bool,
}

/// Outcome of an index maintenance pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    AlreadyPresent,
    Created,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_default_key() {
        let key = RedirectKey::company_default("jdoe", "ACME");

        assert_eq!(key.user, "jdoe");
        assert_eq!(key.company, "ACME");
        assert_eq!(key.job_id, "default");
        assert!(key.is_company_default());
        assert!(!RedirectKey::new("jdoe", "ACME", "1234").is_company_default());
    }

    #[test]
    fn test_empty_target_is_unset() {
        let now = Utc::now();
        let key = RedirectKey::new("jdoe", "ACME", "1234");

        let empty = RedirectRecord::new(key.clone(), Some(String::new()), 1, now, now);
        assert!(empty.target().is_none());

        let missing = RedirectRecord::new(key.clone(), None, 1, now, now);
        assert!(missing.target().is_none());

        let set = RedirectRecord::new(key, Some("https://acme.example".to_string()), 1, now, now);
        assert_eq!(set.target(), Some("https://acme.example"));
    }
}
