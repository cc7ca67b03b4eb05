//! Core domain entities representing the tracking data model.
//!
//! # Entity Types
//!
//! - [`RedirectRecord`] - Target and visit statistics for a `(user, company, job)` key
//! - [`UserProfile`] - Per-user fallback target
//! - [`NewActivity`] - Append-only record of one resolution attempt
//! - [`Resolution`] - Result of resolving a visit
//!
//! A company default is not a separate type: it is the [`RedirectRecord`]
//! whose job id is [`DEFAULT_JOB_ID`].

pub mod activity;
pub mod profile;
pub mod redirect;
pub mod resolution;

pub use activity::{
    ActivityOutcome, CompanyHistory, HistoryEntry, HistoryQuery, HistoryRow, NewActivity,
    RequestMeta,
};
pub use profile::UserProfile;
pub use redirect::{DEFAULT_JOB_ID, IndexStatus, RedirectKey, RedirectRecord, VisitRecord};
pub use resolution::{DefaultTarget, Resolution, ResolutionSource};
