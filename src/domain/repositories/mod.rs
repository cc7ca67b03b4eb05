//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access following the Repository pattern and are
//! implemented by the infrastructure layer.
//!
//! # Available Repositories
//!
//! - [`RedirectRepository`] - Visit upserts, targets and index maintenance
//! - [`ProfileRepository`] - User profile defaults
//! - [`ActivityRepository`] - Append-only activity log and history report
//!
//! Mock implementations are generated via `mockall` for unit tests.

pub mod activity_repository;
pub mod profile_repository;
pub mod redirect_repository;

pub use activity_repository::ActivityRepository;
pub use profile_repository::ProfileRepository;
pub use redirect_repository::RedirectRepository;

#[cfg(test)]
pub use activity_repository::MockActivityRepository;
#[cfg(test)]
pub use profile_repository::MockProfileRepository;
#[cfg(test)]
pub use redirect_repository::MockRedirectRepository;
