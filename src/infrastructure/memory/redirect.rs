use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::entities::{IndexStatus, RedirectKey, RedirectRecord, VisitRecord};
use crate::domain::repositories::RedirectRepository;
use crate::error::AppError;

/// Redirect store keyed by [`RedirectKey`].
///
/// Every operation on a key runs under that key's shard lock, so the visit
/// upsert is atomic per key.
#[derive(Default)]
pub struct MemoryRedirectRepository {
    records: DashMap<RedirectKey, RedirectRecord>,
}

impl MemoryRedirectRepository {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RedirectRepository for MemoryRedirectRepository {
    async fn record_visit(
        &self,
        key: &RedirectKey,
        at: DateTime<Utc>,
    ) -> Result<VisitRecord, AppError> {
        let visit = match self.records.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                record.visits += 1;
                record.last_accessed = at;
                VisitRecord {
                    record: record.clone(),
                    inserted: false,
                }
            }
            Entry::Vacant(entry) => {
                let record = RedirectRecord::new(key.clone(), None, 1, at, at);
                entry.insert(record.clone());
                VisitRecord {
                    record,
                    inserted: true,
                }
            }
        };

        Ok(visit)
    }

    async fn find(&self, key: &RedirectKey) -> Result<Option<RedirectRecord>, AppError> {
        Ok(self.records.get(key).map(|record| record.value().clone()))
    }

    async fn backfill_target(&self, key: &RedirectKey, target_url: &str) -> Result<bool, AppError> {
        match self.records.get_mut(key) {
            Some(mut record) if record.target().is_none() => {
                record.target_url = Some(target_url.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn set_target(
        &self,
        key: &RedirectKey,
        target_url: &str,
        at: DateTime<Utc>,
    ) -> Result<RedirectRecord, AppError> {
        let mut record = self
            .records
            .entry(key.clone())
            .or_insert_with(|| RedirectRecord::new(key.clone(), None, 0, at, at));
        record.target_url = Some(target_url.to_string());

        Ok(record.value().clone())
    }

    async fn list_by_user(&self, user: &str) -> Result<Vec<RedirectRecord>, AppError> {
        let mut list: Vec<RedirectRecord> = self
            .records
            .iter()
            .filter(|entry| entry.key.user == user)
            .map(|entry| entry.value().clone())
            .collect();

        list.sort_by(|a, b| {
            b.visits
                .cmp(&a.visits)
                .then_with(|| b.last_accessed.cmp(&a.last_accessed))
        });

        Ok(list)
    }

    async fn ensure_key_index(&self) -> Result<IndexStatus, AppError> {
        // The map key already enforces uniqueness.
        Ok(IndexStatus::AlreadyPresent)
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
