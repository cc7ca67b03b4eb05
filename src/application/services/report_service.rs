//! Activity history report.

use std::sync::Arc;

use serde_json::json;

use crate::domain::entities::{CompanyHistory, HistoryEntry, HistoryQuery, HistoryRow};
use crate::domain::repositories::ActivityRepository;
use crate::error::AppError;

/// Upper bound on entries kept per company group.
pub const MAX_HISTORY_SIZE: i64 = 1000;

/// Builds the per-company activity history of a user.
pub struct ReportService {
    repository: Arc<dyn ActivityRepository>,
}

impl ReportService {
    pub fn new(repository: Arc<dyn ActivityRepository>) -> Self {
        Self { repository }
    }

    /// Groups the user's activity by company.
    ///
    /// Groups are ordered by total visit count, most active first. Each
    /// group lists its newest entries first, capped at `max_history`
    /// (defaults to [`MAX_HISTORY_SIZE`]); `history_count` still reports the
    /// full size.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `max_history` is outside
    /// `1..=MAX_HISTORY_SIZE`.
    pub async fn company_history(
        &self,
        user: &str,
        company: Option<&str>,
        max_history: Option<i64>,
    ) -> Result<Vec<CompanyHistory>, AppError> {
        let max_history = max_history.unwrap_or(MAX_HISTORY_SIZE);
        if !(1..=MAX_HISTORY_SIZE).contains(&max_history) {
            return Err(AppError::bad_request(
                format!("max_history must be between 1 and {}", MAX_HISTORY_SIZE),
                json!({ "max_history": max_history }),
            ));
        }

        let query = HistoryQuery {
            user: user.to_string(),
            company: company.map(str::to_string),
            max_history,
        };
        let rows = self.repository.history(&query).await?;

        Ok(group_rows(user, rows))
    }
}

/// Folds consecutive rows of the same company into one group, keeping the
/// order the store returned.
fn group_rows(user: &str, rows: Vec<HistoryRow>) -> Vec<CompanyHistory> {
    let mut groups: Vec<CompanyHistory> = Vec::new();

    for row in rows {
        let entry = HistoryEntry {
            url: row.request_line(),
            ts: row.ts,
            redirected_to: row.redirected_to,
        };

        match groups.last_mut() {
            Some(group) if group.company == row.company => group.history.push(entry),
            _ => groups.push(CompanyHistory {
                user: user.to_string(),
                company: row.company,
                history_count: row.history_count,
                history: vec![entry],
            }),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockActivityRepository;
    use chrono::{Duration, Utc};

    fn row(company: &str, count: i64, minutes_ago: i64) -> HistoryRow {
        HistoryRow {
            company: company.to_string(),
            history_count: count,
            ts: Utc::now() - Duration::minutes(minutes_ago),
            http_method: "GET".to_string(),
            http_referrer: Some("https://linkedin.example".to_string()),
            raw_query_string: Some(format!("user=jdoe&co={}", company)),
            redirected_to: Some("https://acme.example".to_string()),
        }
    }

    #[test]
    fn test_group_rows_keeps_store_order() {
        let rows = vec![row("ACME", 2, 1), row("ACME", 2, 5), row("Initech", 1, 3)];

        let groups = group_rows("jdoe", rows);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].company, "ACME");
        assert_eq!(groups[0].history_count, 2);
        assert_eq!(groups[0].history.len(), 2);
        assert_eq!(
            groups[0].history[0].url,
            "GET https://linkedin.example?user=jdoe&co=ACME"
        );
        assert_eq!(groups[1].company, "Initech");
        assert_eq!(groups[1].history_count, 1);
    }

    #[tokio::test]
    async fn test_company_history_passes_filter() {
        let mut repo = MockActivityRepository::new();
        repo.expect_history()
            .withf(|q| q.user == "jdoe" && q.company.as_deref() == Some("ACME") && q.max_history == 10)
            .times(1)
            .returning(|_| Ok(vec![row("ACME", 12, 1)]));

        let service = ReportService::new(Arc::new(repo));
        let groups = service
            .company_history("jdoe", Some("ACME"), Some(10))
            .await
            .unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].history_count, 12);
    }

    #[tokio::test]
    async fn test_company_history_defaults_cap() {
        let mut repo = MockActivityRepository::new();
        repo.expect_history()
            .withf(|q| q.company.is_none() && q.max_history == MAX_HISTORY_SIZE)
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = ReportService::new(Arc::new(repo));
        let groups = service.company_history("jdoe", None, None).await.unwrap();

        assert!(groups.is_empty());
    }

    #[tokio::test]
    async fn test_company_history_rejects_bad_cap() {
        let mut repo = MockActivityRepository::new();
        repo.expect_history().times(0);

        let service = ReportService::new(Arc::new(repo));

        assert!(service.company_history("jdoe", None, Some(0)).await.is_err());
        assert!(service.company_history("jdoe", None, Some(5000)).await.is_err());
    }
}
