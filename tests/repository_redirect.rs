use chrono::Utc;
use resume_tracker::domain::entities::{IndexStatus, RedirectKey};
use resume_tracker::domain::repositories::{ProfileRepository, RedirectRepository};
use resume_tracker::infrastructure::persistence::{
    KEY_INDEX_NAME, PgProfileRepository, PgRedirectRepository,
};
use sqlx::PgPool;
use std::sync::Arc;

fn repo(pool: PgPool) -> PgRedirectRepository {
    PgRedirectRepository::new(Arc::new(pool))
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_record_visit_inserts_then_increments(pool: PgPool) {
    let repo = repo(pool);
    let key = RedirectKey::new("jdoe", "ACME", "1234");

    let first = repo.record_visit(&key, Utc::now()).await.unwrap();
    assert!(first.inserted);
    assert_eq!(first.record.visits, 1);
    assert!(first.record.target_url.is_none());

    let second = repo.record_visit(&key, Utc::now()).await.unwrap();
    assert!(!second.inserted);
    assert_eq!(second.record.visits, 2);
    assert_eq!(second.record.first_accessed, first.record.first_accessed);
    assert!(second.record.last_accessed >= first.record.last_accessed);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_visits_single_record(pool: PgPool) {
    let repo = Arc::new(repo(pool.clone()));
    let key = RedirectKey::new("jdoe", "ACME", "race");

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let repo = repo.clone();
            let key = key.clone();
            tokio::spawn(async move { repo.record_visit(&key, Utc::now()).await })
        })
        .collect();

    let mut inserted = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().inserted {
            inserted += 1;
        }
    }
    assert_eq!(inserted, 1);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM redirects WHERE user_name = 'jdoe' AND job_id = 'race'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
    assert_eq!(repo.find(&key).await.unwrap().unwrap().visits, 20);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_backfill_does_not_overwrite(pool: PgPool) {
    let repo = repo(pool);
    let key = RedirectKey::new("jdoe", "ACME", "1234");
    repo.record_visit(&key, Utc::now()).await.unwrap();

    assert!(repo.backfill_target(&key, "https://a.example.com").await.unwrap());
    assert!(!repo.backfill_target(&key, "https://b.example.com").await.unwrap());

    let record = repo.find(&key).await.unwrap().unwrap();
    assert_eq!(record.target(), Some("https://a.example.com"));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_set_target_creates_and_overwrites(pool: PgPool) {
    let repo = repo(pool);
    let key = RedirectKey::company_default("jdoe", "ACME");

    let created = repo
        .set_target(&key, "https://a.example.com", Utc::now())
        .await
        .unwrap();
    assert_eq!(created.visits, 0);

    repo.record_visit(&key, Utc::now()).await.unwrap();
    let updated = repo
        .set_target(&key, "https://b.example.com", Utc::now())
        .await
        .unwrap();
    assert_eq!(updated.visits, 1);
    assert_eq!(updated.target(), Some("https://b.example.com"));
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_list_by_user_most_visited_first(pool: PgPool) {
    let repo = repo(pool);
    let busy = RedirectKey::new("jdoe", "ACME", "1");
    let quiet = RedirectKey::new("jdoe", "Initech", "2");

    repo.record_visit(&quiet, Utc::now()).await.unwrap();
    for _ in 0..3 {
        repo.record_visit(&busy, Utc::now()).await.unwrap();
    }
    repo.record_visit(&RedirectKey::new("other", "ACME", "1"), Utc::now())
        .await
        .unwrap();

    let records = repo.list_by_user("jdoe").await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].key, busy);
    assert_eq!(records[1].key, quiet);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_ensure_key_index_recreates_dropped_index(pool: PgPool) {
    let repo = repo(pool.clone());

    assert_eq!(
        repo.ensure_key_index().await.unwrap(),
        IndexStatus::AlreadyPresent
    );

    sqlx::query(&format!("DROP INDEX {}", KEY_INDEX_NAME))
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(repo.ensure_key_index().await.unwrap(), IndexStatus::Created);
    assert_eq!(
        repo.ensure_key_index().await.unwrap(),
        IndexStatus::AlreadyPresent
    );
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_ensure_key_index_ignores_other_schemas(pool: PgPool) {
    let repo = repo(pool.clone());

    for statement in [
        "CREATE SCHEMA shadow".to_string(),
        "CREATE TABLE shadow.redirects (user_name TEXT, company TEXT, job_id TEXT)".to_string(),
        format!(
            "CREATE UNIQUE INDEX {} ON shadow.redirects (user_name, company, job_id)",
            KEY_INDEX_NAME
        ),
        format!("DROP INDEX public.{}", KEY_INDEX_NAME),
    ] {
        sqlx::query(&statement).execute(&pool).await.unwrap();
    }

    assert_eq!(repo.ensure_key_index().await.unwrap(), IndexStatus::Created);
}

#[sqlx::test]
#[ignore = "requires DATABASE_URL"]
async fn test_profile_upsert(pool: PgPool) {
    let repo = PgProfileRepository::new(Arc::new(pool));

    assert!(repo.find("jdoe").await.unwrap().is_none());

    repo.upsert("jdoe", "https://a.example.com").await.unwrap();
    let updated = repo.upsert("jdoe", "https://b.example.com").await.unwrap();
    assert_eq!(updated.target(), Some("https://b.example.com"));
    assert!(updated.updated_at >= updated.created_at);

    let found = repo.find("jdoe").await.unwrap().unwrap();
    assert_eq!(found.target(), Some("https://b.example.com"));
}
