//! Utility functions for request handling and input validation.
//!
//! - [`client_ip`] - Client address extraction (proxy aware)
//! - [`target_url`] - Redirect target URL validation

pub mod client_ip;
pub mod target_url;
