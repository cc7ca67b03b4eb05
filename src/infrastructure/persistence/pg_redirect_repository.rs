//! PostgreSQL implementation of redirect repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{IndexStatus, RedirectKey, RedirectRecord, VisitRecord};
use crate::domain::repositories::RedirectRepository;
use crate::error::AppError;

/// Name of the unique index over the redirect key columns.
pub const KEY_INDEX_NAME: &str = "redirects_query_param_lookup";

/// PostgreSQL repository for redirect records.
///
/// The visit upsert relies on `INSERT .. ON CONFLICT` against
/// [`KEY_INDEX_NAME`]; without that index the upsert fails, which is why
/// [`RedirectRepository::ensure_key_index`] exists.
pub struct PgRedirectRepository {
    pool: Arc<PgPool>,
}

impl PgRedirectRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct RedirectRow {
    user_name: String,
    company: String,
    job_id: String,
    target_url: Option<String>,
    visits: i64,
    first_accessed: DateTime<Utc>,
    last_accessed: DateTime<Utc>,
}

impl From<RedirectRow> for RedirectRecord {
    fn from(r: RedirectRow) -> Self {
        RedirectRecord::new(
            RedirectKey::new(r.user_name, r.company, r.job_id),
            r.target_url,
            r.visits,
            r.first_accessed,
            r.last_accessed,
        )
    }
}

#[derive(FromRow)]
struct VisitRow {
    #[sqlx(flatten)]
    redirect: RedirectRow,
    inserted: bool,
}

#[async_trait]
impl RedirectRepository for PgRedirectRepository {
    async fn record_visit(
        &self,
        key: &RedirectKey,
        at: DateTime<Utc>,
    ) -> Result<VisitRecord, AppError> {
        // xmax is zero only for a row version written by a plain insert.
        let row = sqlx::query_as::<_, VisitRow>(
            r#"
            INSERT INTO redirects (user_name, company, job_id, visits, first_accessed, last_accessed)
            VALUES ($1, $2, $3, 1, $4, $4)
            ON CONFLICT (user_name, company, job_id)
            DO UPDATE SET visits = redirects.visits + 1, last_accessed = EXCLUDED.last_accessed
            RETURNING user_name, company, job_id, target_url, visits,
                      first_accessed, last_accessed, (xmax = 0) AS inserted
            "#,
        )
        .bind(&key.user)
        .bind(&key.company)
        .bind(&key.job_id)
        .bind(at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(VisitRecord {
            record: row.redirect.into(),
            inserted: row.inserted,
        })
    }

    async fn find(&self, key: &RedirectKey) -> Result<Option<RedirectRecord>, AppError> {
        let row = sqlx::query_as::<_, RedirectRow>(
            r#"
            SELECT user_name, company, job_id, target_url, visits, first_accessed, last_accessed
            FROM redirects
            WHERE user_name = $1 AND company = $2 AND job_id = $3
            "#,
        )
        .bind(&key.user)
        .bind(&key.company)
        .bind(&key.job_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(RedirectRecord::from))
    }

    async fn backfill_target(&self, key: &RedirectKey, target_url: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE redirects
            SET target_url = $4
            WHERE user_name = $1 AND company = $2 AND job_id = $3
              AND (target_url IS NULL OR target_url = '')
            "#,
        )
        .bind(&key.user)
        .bind(&key.company)
        .bind(&key.job_id)
        .bind(target_url)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_target(
        &self,
        key: &RedirectKey,
        target_url: &str,
        at: DateTime<Utc>,
    ) -> Result<RedirectRecord, AppError> {
        let row = sqlx::query_as::<_, RedirectRow>(
            r#"
            INSERT INTO redirects (user_name, company, job_id, target_url, visits, first_accessed, last_accessed)
            VALUES ($1, $2, $3, $4, 0, $5, $5)
            ON CONFLICT (user_name, company, job_id)
            DO UPDATE SET target_url = EXCLUDED.target_url
            RETURNING user_name, company, job_id, target_url, visits, first_accessed, last_accessed
            "#,
        )
        .bind(&key.user)
        .bind(&key.company)
        .bind(&key.job_id)
        .bind(target_url)
        .bind(at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn list_by_user(&self, user: &str) -> Result<Vec<RedirectRecord>, AppError> {
        let rows = sqlx::query_as::<_, RedirectRow>(
            r#"
            SELECT user_name, company, job_id, target_url, visits, first_accessed, last_accessed
            FROM redirects
            WHERE user_name = $1
            ORDER BY visits DESC, last_accessed DESC
            "#,
        )
        .bind(user)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(RedirectRecord::from).collect())
    }

    async fn ensure_key_index(&self) -> Result<IndexStatus, AppError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM pg_indexes
                WHERE schemaname = current_schema()
                  AND tablename = 'redirects'
                  AND indexname = $1
            )
            "#,
        )
        .bind(KEY_INDEX_NAME)
        .fetch_one(self.pool.as_ref())
        .await?;

        if exists {
            return Ok(IndexStatus::AlreadyPresent);
        }

        sqlx::query(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS redirects_query_param_lookup
                ON redirects (user_name, company, job_id)
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(IndexStatus::Created)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
