//! Administration of redirect targets.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::info;

use crate::domain::entities::{RedirectKey, RedirectRecord, UserProfile};
use crate::domain::repositories::{ProfileRepository, RedirectRepository};
use crate::error::AppError;
use crate::utils::target_url::validate_target_url;

/// Service for configuring where redirects lead.
///
/// Unlike the resolver's backfill, these operations overwrite an existing
/// target.
pub struct TargetService {
    redirect_repository: Arc<dyn RedirectRepository>,
    profile_repository: Arc<dyn ProfileRepository>,
}

impl TargetService {
    pub fn new(
        redirect_repository: Arc<dyn RedirectRepository>,
        profile_repository: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            redirect_repository,
            profile_repository,
        }
    }

    /// Sets the last-resort target of a user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty user or invalid URL.
    pub async fn set_profile_target(
        &self,
        user: &str,
        target_url: &str,
    ) -> Result<UserProfile, AppError> {
        require_non_empty("user", user)?;
        let target_url = checked_url(target_url)?;

        let profile = self.profile_repository.upsert(user, &target_url).await?;
        info!(user, "Profile target set to {}", target_url);
        Ok(profile)
    }

    /// Returns the profile of a user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the user has no profile.
    pub async fn get_profile(&self, user: &str) -> Result<UserProfile, AppError> {
        self.profile_repository
            .find(user)
            .await?
            .ok_or_else(|| AppError::not_found("Profile not found", json!({ "user": user })))
    }

    /// Sets the fallback target of `user` at `company`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for empty identifiers or an invalid URL.
    pub async fn set_company_default(
        &self,
        user: &str,
        company: &str,
        target_url: &str,
    ) -> Result<RedirectRecord, AppError> {
        self.set_job_target(&RedirectKey::company_default(user, company), target_url)
            .await
    }

    /// Sets the target of one `(user, company, job)` record, creating the
    /// record with zero visits if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for empty identifiers or an invalid URL.
    pub async fn set_job_target(
        &self,
        key: &RedirectKey,
        target_url: &str,
    ) -> Result<RedirectRecord, AppError> {
        require_non_empty("user", &key.user)?;
        require_non_empty("company", &key.company)?;
        require_non_empty("job_id", &key.job_id)?;
        let target_url = checked_url(target_url)?;

        let record = self
            .redirect_repository
            .set_target(key, &target_url, Utc::now())
            .await?;
        info!("Target of {:?} set to {}", key, target_url);
        Ok(record)
    }

    /// Lists all redirect records of a user, most visited first.
    pub async fn list_redirects(&self, user: &str) -> Result<Vec<RedirectRecord>, AppError> {
        self.redirect_repository.list_by_user(user).await
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::bad_request(
            format!("{} must not be empty", field),
            json!({ "field": field }),
        ));
    }
    Ok(())
}

fn checked_url(target_url: &str) -> Result<String, AppError> {
    validate_target_url(target_url).map_err(|e| {
        AppError::bad_request("Invalid target URL", json!({ "reason": e.to_string() }))
    })
}
