//! Fallback target lookup.

use std::sync::Arc;

use crate::domain::entities::{DefaultTarget, RedirectKey, ResolutionSource};
use crate::domain::repositories::{ProfileRepository, RedirectRepository};
use crate::error::AppError;
use tracing::debug;

/// Locates a fallback target for a record that has none of its own.
///
/// The precedence chain has exactly two levels:
///
/// 1. The company default record `(user, company, "default")`
/// 2. The user's profile
///
/// There is no global default; finding nothing is a normal outcome.
pub struct DefaultTargetService {
    redirect_repository: Arc<dyn RedirectRepository>,
    profile_repository: Arc<dyn ProfileRepository>,
}

impl DefaultTargetService {
    /// Creates a new default target service.
    pub fn new(
        redirect_repository: Arc<dyn RedirectRepository>,
        profile_repository: Arc<dyn ProfileRepository>,
    ) -> Self {
        Self {
            redirect_repository,
            profile_repository,
        }
    }

    /// Finds the fallback target for `user`, optionally scoped to `company`.
    ///
    /// Returns `Ok(None)` when neither the company default nor the profile
    /// carries a non-empty target.
    ///
    /// # Errors
    ///
    /// Returns the repository error if either lookup fails.
    pub async fn find_default(
        &self,
        user: &str,
        company: Option<&str>,
    ) -> Result<Option<DefaultTarget>, AppError> {
        if let Some(company) = company {
            let key = RedirectKey::company_default(user, company);
            if let Some(target) = self
                .redirect_repository
                .find(&key)
                .await?
                .as_ref()
                .and_then(|r| r.target())
            {
                debug!(user, company, "Resolved from company default");
                return Ok(Some(DefaultTarget {
                    target_url: target.to_string(),
                    source: ResolutionSource::CompanyDefault,
                }));
            }
        }

        if let Some(target) = self
            .profile_repository
            .find(user)
            .await?
            .as_ref()
            .and_then(|p| p.target())
        {
            debug!(user, "Resolved from user profile");
            return Ok(Some(DefaultTarget {
                target_url: target.to_string(),
                source: ResolutionSource::UserProfile,
            }));
        }

        Ok(None)
    }
}
