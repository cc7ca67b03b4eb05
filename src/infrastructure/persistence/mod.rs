//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx.
//!
//! # Repositories
//!
//! - [`PgRedirectRepository`] - Visit upserts, targets and key index maintenance
//! - [`PgProfileRepository`] - User profile defaults
//! - [`PgActivityRepository`] - Activity log and history report

pub mod pg_activity_repository;
pub mod pg_profile_repository;
pub mod pg_redirect_repository;

pub use pg_activity_repository::PgActivityRepository;
pub use pg_profile_repository::PgProfileRepository;
pub use pg_redirect_repository::{KEY_INDEX_NAME, PgRedirectRepository};
