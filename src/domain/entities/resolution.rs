//! Outcome types of redirect resolution.

use serde::Serialize;

/// Where a resolved target URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// The visited record carried its own target.
    DirectHit,
    /// The `(user, company, "default")` record.
    CompanyDefault,
    /// The user's profile.
    UserProfile,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectHit => "direct_hit",
            Self::CompanyDefault => "company_default",
            Self::UserProfile => "user_profile",
        }
    }

    /// `true` for targets found through the fallback chain.
    pub fn is_default(&self) -> bool {
        !matches!(self, Self::DirectHit)
    }
}

/// A fallback target located for a record without its own target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultTarget {
    pub target_url: String,
    pub source: ResolutionSource,
}

/// Result of resolving one visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Redirect {
        target_url: String,
        source: ResolutionSource,
        first_visit: bool,
    },
    NotFound {
        first_visit: bool,
    },
}

impl Resolution {
    pub fn target_url(&self) -> Option<&str> {
        match self {
            Self::Redirect { target_url, .. } => Some(target_url),
            Self::NotFound { .. } => None,
        }
    }

    pub fn first_visit(&self) -> bool {
        match self {
            Self::Redirect { first_visit, .. } | Self::NotFound { first_visit } => *first_visit,
        }
    }
}
