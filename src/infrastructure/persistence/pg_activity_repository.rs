//! PostgreSQL implementation of activity repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{HistoryQuery, HistoryRow, NewActivity};
use crate::domain::repositories::ActivityRepository;
use crate::error::AppError;

/// PostgreSQL repository for the `link_activity` log.
pub struct PgActivityRepository {
    pool: Arc<PgPool>,
}

impl PgActivityRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct HistoryRecord {
    company: String,
    history_count: i64,
    ts: DateTime<Utc>,
    http_method: String,
    http_referrer: Option<String>,
    raw_query_string: Option<String>,
    redirected_to: Option<String>,
}

#[async_trait]
impl ActivityRepository for PgActivityRepository {
    async fn append(&self, activity: NewActivity) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO link_activity (
                ts, http_method, raw_query_string, http_referrer, user_agent, ip,
                user_name, company, job_id,
                outcome, redirected_to, first_visit, from_default, error
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(activity.ts)
        .bind(&activity.meta.http_method)
        .bind(&activity.meta.raw_query_string)
        .bind(&activity.meta.http_referrer)
        .bind(&activity.meta.user_agent)
        .bind(&activity.meta.ip)
        .bind(&activity.key.user)
        .bind(&activity.key.company)
        .bind(&activity.key.job_id)
        .bind(activity.outcome.label())
        .bind(activity.outcome.redirected_to())
        .bind(activity.first_visit)
        .bind(activity.outcome.from_default())
        .bind(activity.outcome.error())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn history(&self, query: &HistoryQuery) -> Result<Vec<HistoryRow>, AppError> {
        let rows = sqlx::query_as::<_, HistoryRecord>(
            r#"
            SELECT company, history_count, ts, http_method, http_referrer,
                   raw_query_string, redirected_to
            FROM (
                SELECT
                    company, ts, http_method, http_referrer, raw_query_string, redirected_to,
                    COUNT(*) OVER (PARTITION BY company) AS history_count,
                    ROW_NUMBER() OVER (PARTITION BY company ORDER BY ts DESC, id DESC) AS rn
                FROM link_activity
                WHERE user_name = $1
                  AND ($2::text IS NULL OR company = $2)
            ) grouped
            WHERE rn <= $3
            ORDER BY history_count DESC, company ASC, ts DESC
            "#,
        )
        .bind(&query.user)
        .bind(&query.company)
        .bind(query.max_history)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| HistoryRow {
                company: r.company,
                history_count: r.history_count,
                ts: r.ts,
                http_method: r.http_method,
                http_referrer: r.http_referrer,
                raw_query_string: r.raw_query_string,
                redirected_to: r.redirected_to,
            })
            .collect())
    }
}
