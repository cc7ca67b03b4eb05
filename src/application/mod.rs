//! Application layer services implementing business logic.
//!
//! Services orchestrate repository calls and business rules, and provide a
//! clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::RedirectService`] - Visit recording and target resolution
//! - [`services::DefaultTargetService`] - Company default / user profile fallback chain
//! - [`services::ActivityLogger`] - Fire-and-forget activity logging
//! - [`services::IndexService`] - Redirect store index maintenance
//! - [`services::TargetService`] - Target administration
//! - [`services::ReportService`] - Per-company activity history

pub mod services;
