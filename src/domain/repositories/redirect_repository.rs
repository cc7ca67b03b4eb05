//! Repository trait for redirect record access.

use crate::domain::entities::{IndexStatus, RedirectKey, RedirectRecord, VisitRecord};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for the redirect store.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRedirectRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryRedirectRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RedirectRepository: Send + Sync {
    /// Records one visit to `key`, creating the record if it does not exist.
    ///
    /// Increments `visits` by one and sets `last_accessed = at`; on insert
    /// also sets `first_accessed = at`. The whole step is atomic per key:
    /// concurrent calls never lose an increment and never create two records.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on store errors.
    async fn record_visit(
        &self,
        key: &RedirectKey,
        at: DateTime<Utc>,
    ) -> Result<VisitRecord, AppError>;

    /// Finds a record by its key without touching its statistics.
    async fn find(&self, key: &RedirectKey) -> Result<Option<RedirectRecord>, AppError>;

    /// Writes `target_url` onto the record only while its target is still empty.
    ///
    /// Returns `Ok(true)` if the record was updated, `Ok(false)` if it already
    /// had a target or does not exist.
    async fn backfill_target(&self, key: &RedirectKey, target_url: &str) -> Result<bool, AppError>;

    /// Sets the target of a record unconditionally, creating it with zero
    /// visits if needed.
    async fn set_target(
        &self,
        key: &RedirectKey,
        target_url: &str,
        at: DateTime<Utc>,
    ) -> Result<RedirectRecord, AppError>;

    /// Lists all records of a user, most visited first.
    async fn list_by_user(&self, user: &str) -> Result<Vec<RedirectRecord>, AppError>;

    /// Makes sure the unique index over `(user, company, job_id)` exists.
    async fn ensure_key_index(&self) -> Result<IndexStatus, AppError>;

    /// Checks store connectivity.
    async fn ping(&self) -> Result<(), AppError>;
}
