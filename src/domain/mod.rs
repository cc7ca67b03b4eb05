//! Domain layer containing business entities and logic.
//!
//! Defines entities, repository interfaces, and the background activity
//! worker, independent of infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`activity_worker`] - Asynchronous activity log writer
//!
//! # Activity Flow
//!
//! 1. `/resume` handler resolves the visit
//! 2. A [`entities::NewActivity`] is queued via
//!    [`crate::application::services::ActivityLogger`] (non-blocking)
//! 3. [`activity_worker::run_activity_worker`] appends it through
//!    [`repositories::ActivityRepository`]

pub mod activity_worker;
pub mod entities;
pub mod repositories;
