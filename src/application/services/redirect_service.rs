//! Visit recording and redirect target resolution.

use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use tracing::{debug, error, warn};

use super::default_target_service::DefaultTargetService;
use crate::domain::entities::{DEFAULT_JOB_ID, RedirectKey, Resolution, ResolutionSource};
use crate::domain::repositories::RedirectRepository;
use crate::error::AppError;

/// Values substituted for missing request parameters.
#[derive(Debug, Clone)]
pub struct KeyDefaults {
    pub user: String,
    pub company: String,
}

impl Default for KeyDefaults {
    fn default() -> Self {
        Self {
            user: "JerrenSaunders".to_string(),
            company: "Unknown".to_string(),
        }
    }
}

/// Resolves redirect targets while counting every visit.
///
/// # Resolution Flow
///
/// 1. Atomically upsert the record for the key (visit count + timestamps)
/// 2. Record has a target → direct hit
/// 3. Otherwise ask [`DefaultTargetService`] for a fallback
/// 4. Fallback found → backfill it onto the record in a detached task
/// 5. Nothing found → [`Resolution::NotFound`]
///
/// Only step 1 can fail the request. A failed backfill just means the next
/// visit to the same key repeats the fallback lookup.
pub struct RedirectService {
    redirect_repository: Arc<dyn RedirectRepository>,
    default_targets: DefaultTargetService,
    defaults: KeyDefaults,
}

impl RedirectService {
    /// Creates a new redirect service.
    pub fn new(
        redirect_repository: Arc<dyn RedirectRepository>,
        default_targets: DefaultTargetService,
        defaults: KeyDefaults,
    ) -> Self {
        Self {
            redirect_repository,
            default_targets,
            defaults,
        }
    }

    /// Builds the record key for request parameters, applying defaults to
    /// absent or empty values.
    pub fn key_for(
        &self,
        user: Option<String>,
        company: Option<String>,
        job_id: Option<String>,
    ) -> RedirectKey {
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        }

        RedirectKey::new(
            or_default(user, &self.defaults.user),
            or_default(company, &self.defaults.company),
            or_default(job_id, DEFAULT_JOB_ID),
        )
    }

    /// Records a visit to `key` and resolves its redirect target.
    ///
    /// Every call increments the visit counter exactly once, whether or not a
    /// target is found.
    ///
    /// # Errors
    ///
    /// Returns the repository error if the visit upsert or the fallback
    /// lookup fails.
    pub async fn resolve(&self, key: &RedirectKey) -> Result<Resolution, AppError> {
        let visit = self
            .redirect_repository
            .record_visit(key, Utc::now())
            .await
            .inspect_err(|e| {
                error!(
                    user = %key.user,
                    company = %key.company,
                    job_id = %key.job_id,
                    "Failed to record visit: {}",
                    e
                )
            })?;
        let first_visit = visit.inserted;

        if let Some(target) = visit.record.target() {
            debug!(visits = visit.record.visits, "Direct hit for {:?}", key);
            counter!("resume_resolutions_total", "source" => ResolutionSource::DirectHit.as_str())
                .increment(1);
            return Ok(Resolution::Redirect {
                target_url: target.to_string(),
                source: ResolutionSource::DirectHit,
                first_visit,
            });
        }

        let found = self
            .default_targets
            .find_default(&key.user, Some(&key.company))
            .await
            .inspect_err(|e| error!("Default target lookup failed for {:?}: {}", key, e))?;

        match found {
            Some(default) => {
                counter!("resume_resolutions_total", "source" => default.source.as_str())
                    .increment(1);
                self.spawn_backfill(key.clone(), default.target_url.clone());

                Ok(Resolution::Redirect {
                    target_url: default.target_url,
                    source: default.source,
                    first_visit,
                })
            }
            None => {
                debug!("No target found for {:?}", key);
                counter!("resume_resolutions_total", "source" => "not_found").increment(1);
                Ok(Resolution::NotFound { first_visit })
            }
        }
    }

    /// Checks that the redirect store is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.redirect_repository.ping().await
    }

    /// Writes a located default onto the record without blocking the caller.
    fn spawn_backfill(&self, key: RedirectKey, target_url: String) {
        let repository = Arc::clone(&self.redirect_repository);

        tokio::spawn(async move {
            match repository.backfill_target(&key, &target_url).await {
                Ok(true) => debug!("Backfilled target for {:?}", key),
                Ok(false) => debug!("Record {:?} already has a target", key),
                Err(e) => {
                    warn!("Failed to backfill target for {:?}: {}", key, e);
                    counter!("resume_backfill_failures_total").increment(1);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{RedirectRecord, UserProfile, VisitRecord};
    use crate::domain::repositories::{MockProfileRepository, MockRedirectRepository};
    use serde_json::json;

    fn visit(key: &RedirectKey, target: Option<&str>, visits: i64, inserted: bool) -> VisitRecord {
        let now = Utc::now();
        VisitRecord {
            record: RedirectRecord::new(key.clone(), target.map(str::to_string), visits, now, now),
            inserted,
        }
    }

    fn service(
        redirects: MockRedirectRepository,
        profiles: MockProfileRepository,
    ) -> RedirectService {
        let redirects: Arc<dyn RedirectRepository> = Arc::new(redirects);
        let default_targets = DefaultTargetService::new(redirects.clone(), Arc::new(profiles));
        RedirectService::new(redirects, default_targets, KeyDefaults::default())
    }

    #[test]
    fn test_key_for_applies_defaults() {
        let service = service(MockRedirectRepository::new(), MockProfileRepository::new());

        let key = service.key_for(None, Some(String::new()), None);

        assert_eq!(key, RedirectKey::new("JerrenSaunders", "Unknown", "default"));
    }

    #[test]
    fn test_key_for_keeps_given_values() {
        let service = service(MockRedirectRepository::new(), MockProfileRepository::new());

        let key = service.key_for(
            Some("jdoe".to_string()),
            Some("ACME".to_string()),
            Some("1234".to_string()),
        );

        assert_eq!(key, RedirectKey::new("jdoe", "ACME", "1234"));
    }

    #[tokio::test]
    async fn test_direct_hit_skips_fallback() {
        let mut redirects = MockRedirectRepository::new();
        let mut profiles = MockProfileRepository::new();

        redirects
            .expect_record_visit()
            .times(1)
            .returning(|key, _| Ok(visit(key, Some("https://acme.example/job"), 4, false)));
        redirects.expect_find().times(0);
        redirects.expect_backfill_target().times(0);
        profiles.expect_find().times(0);

        let service = service(redirects, profiles);
        let key = RedirectKey::new("jdoe", "ACME", "1234");
        let resolution = service.resolve(&key).await.unwrap();

        assert_eq!(
            resolution,
            Resolution::Redirect {
                target_url: "https://acme.example/job".to_string(),
                source: ResolutionSource::DirectHit,
                first_visit: false,
            }
        );
    }

    #[tokio::test]
    async fn test_first_visit_uses_company_default() {
        let mut redirects = MockRedirectRepository::new();
        let profiles = MockProfileRepository::new();

        redirects
            .expect_record_visit()
            .times(1)
            .returning(|key, _| Ok(visit(key, None, 1, true)));
        redirects
            .expect_find()
            .withf(|key| key.is_company_default())
            .times(1)
            .returning(|key| {
                let now = Utc::now();
                Ok(Some(RedirectRecord::new(
                    key.clone(),
                    Some("https://acme.example/jdoe".to_string()),
                    0,
                    now,
                    now,
                )))
            });
        redirects.expect_backfill_target().returning(|_, _| Ok(true));

        let service = service(redirects, profiles);
        let key = RedirectKey::new("jdoe", "ACME", "1234");
        let resolution = service.resolve(&key).await.unwrap();

        assert_eq!(
            resolution,
            Resolution::Redirect {
                target_url: "https://acme.example/jdoe".to_string(),
                source: ResolutionSource::CompanyDefault,
                first_visit: true,
            }
        );
    }

    #[tokio::test]
    async fn test_profile_fallback() {
        let mut redirects = MockRedirectRepository::new();
        let mut profiles = MockProfileRepository::new();

        redirects
            .expect_record_visit()
            .returning(|key, _| Ok(visit(key, None, 2, false)));
        redirects.expect_find().returning(|_| Ok(None));
        redirects.expect_backfill_target().returning(|_, _| Ok(true));
        profiles.expect_find().returning(|user| {
            let now = Utc::now();
            Ok(Some(UserProfile::new(
                user.to_string(),
                Some("https://jdoe.example".to_string()),
                now,
                now,
            )))
        });

        let service = service(redirects, profiles);
        let resolution = service
            .resolve(&RedirectKey::new("jdoe", "ACME", "1234"))
            .await
            .unwrap();

        assert_eq!(resolution.target_url(), Some("https://jdoe.example"));
        assert!(!resolution.first_visit());
    }

    #[tokio::test]
    async fn test_not_found_still_counts_visit() {
        let mut redirects = MockRedirectRepository::new();
        let mut profiles = MockProfileRepository::new();

        redirects
            .expect_record_visit()
            .times(1)
            .returning(|key, _| Ok(visit(key, None, 1, true)));
        redirects.expect_find().returning(|_| Ok(None));
        redirects.expect_backfill_target().times(0);
        profiles.expect_find().returning(|_| Ok(None));

        let service = service(redirects, profiles);
        let resolution = service
            .resolve(&RedirectKey::new("jdoe", "ACME", "1234"))
            .await
            .unwrap();

        assert_eq!(resolution, Resolution::NotFound { first_visit: true });
    }

    #[tokio::test]
    async fn test_backfill_failure_does_not_fail_resolution() {
        let mut redirects = MockRedirectRepository::new();
        let mut profiles = MockProfileRepository::new();

        redirects
            .expect_record_visit()
            .returning(|key, _| Ok(visit(key, None, 1, true)));
        redirects.expect_find().returning(|_| Ok(None));
        redirects
            .expect_backfill_target()
            .returning(|_, _| Err(AppError::internal("Database error", json!({}))));
        profiles.expect_find().returning(|user| {
            let now = Utc::now();
            Ok(Some(UserProfile::new(
                user.to_string(),
                Some("https://jdoe.example".to_string()),
                now,
                now,
            )))
        });

        let service = service(redirects, profiles);
        let resolution = service
            .resolve(&RedirectKey::new("jdoe", "ACME", "1234"))
            .await;

        assert!(resolution.is_ok());
        tokio::task::yield_now().await;
    }

    #[tokio::test]
    async fn test_upsert_failure_is_surfaced() {
        let mut redirects = MockRedirectRepository::new();
        let profiles = MockProfileRepository::new();

        redirects
            .expect_record_visit()
            .times(1)
            .returning(|_, _| Err(AppError::unavailable("Database unavailable", json!({}))));
        redirects.expect_find().times(0);

        let service = service(redirects, profiles);
        let result = service
            .resolve(&RedirectKey::new("jdoe", "ACME", "1234"))
            .await;

        assert!(matches!(result, Err(AppError::Unavailable { .. })));
    }
}
