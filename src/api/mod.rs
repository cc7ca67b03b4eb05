//! HTTP layer for request/response handling.
//!
//! Translates HTTP requests into domain operations and formats responses.
//!
//! # Modules
//!
//! - [`dto`] - Request/response types
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Rate limiting and request tracing

pub mod dto;
pub mod handlers;
pub mod middleware;
