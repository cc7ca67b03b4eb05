//! PostgreSQL implementation of profile repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::UserProfile;
use crate::domain::repositories::ProfileRepository;
use crate::error::AppError;

pub struct PgProfileRepository {
    pool: Arc<PgPool>,
}

impl PgProfileRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ProfileRow {
    user_name: String,
    target_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for UserProfile {
    fn from(r: ProfileRow) -> Self {
        UserProfile::new(r.user_name, r.target_url, r.created_at, r.updated_at)
    }
}

#[async_trait]
impl ProfileRepository for PgProfileRepository {
    async fn find(&self, user: &str) -> Result<Option<UserProfile>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_name, target_url, created_at, updated_at
            FROM user_profiles
            WHERE user_name = $1
            "#,
        )
        .bind(user)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(UserProfile::from))
    }

    async fn upsert(&self, user: &str, target_url: &str) -> Result<UserProfile, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            INSERT INTO user_profiles (user_name, target_url)
            VALUES ($1, $2)
            ON CONFLICT (user_name)
            DO UPDATE SET target_url = EXCLUDED.target_url, updated_at = NOW()
            RETURNING user_name, target_url, created_at, updated_at
            "#,
        )
        .bind(user)
        .bind(target_url)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }
}
