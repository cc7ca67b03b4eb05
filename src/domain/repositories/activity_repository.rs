//! Repository trait for the append-only activity log.

use crate::domain::entities::{HistoryQuery, HistoryRow, NewActivity};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for activity log storage and reporting.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Appends one entry. Entries are never updated or deleted.
    async fn append(&self, activity: NewActivity) -> Result<(), AppError>;

    /// Returns the user's activity grouped by company.
    ///
    /// Rows come ordered by group size descending, then company name, then
    /// newest first; each group holds at most `query.max_history` rows while
    /// `history_count` reports the full group size.
    async fn history(&self, query: &HistoryQuery) -> Result<Vec<HistoryRow>, AppError>;
}
