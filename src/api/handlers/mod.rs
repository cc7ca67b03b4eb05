//! HTTP request handlers.

pub mod health;
pub mod resume;

pub use health::health_handler;
pub use resume::resume_handler;
