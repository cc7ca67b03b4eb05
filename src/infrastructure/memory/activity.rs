use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

use crate::domain::entities::{HistoryQuery, HistoryRow, NewActivity};
use crate::domain::repositories::ActivityRepository;
use crate::error::AppError;

/// Entries kept by [`MemoryActivityRepository::new`].
pub const DEFAULT_MAX_ENTRIES: usize = 100_000;

/// Activity log kept in a ring buffer.
///
/// Holds at most `max_entries` entries; appending to a full log evicts the
/// oldest one, so reports only cover the retained window.
pub struct MemoryActivityRepository {
    entries: Mutex<VecDeque<NewActivity>>,
    max_entries: usize,
}

impl Default for MemoryActivityRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryActivityRepository {
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Copy of the retained entries in insertion order.
    pub fn entries(&self) -> Vec<NewActivity> {
        self.entries.lock().iter().cloned().collect()
    }
}

#[async_trait]
impl ActivityRepository for MemoryActivityRepository {
    async fn append(&self, activity: NewActivity) -> Result<(), AppError> {
        let mut entries = self.entries.lock();
        if entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(activity);
        Ok(())
    }

    async fn history(&self, query: &HistoryQuery) -> Result<Vec<HistoryRow>, AppError> {
        let entries = self.entries.lock();

        let mut groups: HashMap<&str, Vec<&NewActivity>> = HashMap::new();
        for entry in entries.iter().filter(|e| {
            e.key.user == query.user
                && query.company.as_deref().is_none_or(|c| e.key.company == c)
        }) {
            groups.entry(entry.key.company.as_str()).or_default().push(entry);
        }

        let mut groups: Vec<(&str, Vec<&NewActivity>)> = groups.into_iter().collect();
        groups.sort_by(|(a_company, a), (b_company, b)| {
            b.len().cmp(&a.len()).then_with(|| a_company.cmp(b_company))
        });

        let limit = usize::try_from(query.max_history).unwrap_or(0);
        let mut rows = Vec::new();
        for (company, mut group) in groups {
            let history_count = group.len() as i64;
            // Stable sort keeps insertion order for equal timestamps; reverse it.
            group.reverse();
            group.sort_by(|a, b| b.ts.cmp(&a.ts));

            rows.extend(group.into_iter().take(limit).map(|e| HistoryRow {
                company: company.to_string(),
                history_count,
                ts: e.ts,
                http_method: e.meta.http_method.clone(),
                http_referrer: e.meta.http_referrer.clone(),
                raw_query_string: e.meta.raw_query_string.clone(),
                redirected_to: e.outcome.redirected_to().map(str::to_string),
            }));
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ActivityOutcome, RedirectKey, RequestMeta};
    use chrono::{Duration, Utc};

    fn entry(company: &str, minutes_ago: i64) -> NewActivity {
        NewActivity {
            ts: Utc::now() - Duration::minutes(minutes_ago),
            meta: RequestMeta {
                http_method: "GET".to_string(),
                ..Default::default()
            },
            key: RedirectKey::new("jdoe", company, "1"),
            outcome: ActivityOutcome::NotFound,
            first_visit: false,
        }
    }

    #[tokio::test]
    async fn test_history_groups_by_company() {
        let repo = MemoryActivityRepository::new();
        repo.append(entry("Initech", 1)).await.unwrap();
        repo.append(entry("ACME", 30)).await.unwrap();
        repo.append(entry("ACME", 10)).await.unwrap();
        repo.append(entry("ACME", 20)).await.unwrap();

        assert_eq!(repo.entries().len(), 4);

        let rows = repo
            .history(&HistoryQuery {
                user: "jdoe".to_string(),
                company: None,
                max_history: 2,
            })
            .await
            .unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].company, "ACME");
        assert_eq!(rows[0].history_count, 3);
        assert!(rows[0].ts > rows[1].ts);
        assert_eq!(rows[2].company, "Initech");
    }

    #[tokio::test]
    async fn test_history_filters_user_and_company() {
        let repo = MemoryActivityRepository::new();
        repo.append(entry("ACME", 1)).await.unwrap();
        repo.append(entry("Initech", 1)).await.unwrap();

        let rows = repo
            .history(&HistoryQuery {
                user: "jdoe".to_string(),
                company: Some("Initech".to_string()),
                max_history: 10,
            })
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].company, "Initech");

        let rows = repo
            .history(&HistoryQuery {
                user: "someone-else".to_string(),
                company: None,
                max_history: 10,
            })
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_full_log_evicts_oldest() {
        let repo = MemoryActivityRepository::with_max_entries(2);
        repo.append(entry("ACME", 3)).await.unwrap();
        repo.append(entry("Initech", 2)).await.unwrap();
        repo.append(entry("Globex", 1)).await.unwrap();

        let companies: Vec<String> = repo
            .entries()
            .into_iter()
            .map(|e| e.key.company)
            .collect();
        assert_eq!(companies, vec!["Initech", "Globex"]);
    }
}
