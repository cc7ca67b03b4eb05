//! Business logic services for the application layer.

pub mod activity_logger;
pub mod default_target_service;
pub mod index_service;
pub mod redirect_service;
pub mod report_service;
pub mod target_service;

pub use activity_logger::ActivityLogger;
pub use default_target_service::DefaultTargetService;
pub use index_service::IndexService;
pub use redirect_service::{KeyDefaults, RedirectService};
pub use report_service::{MAX_HISTORY_SIZE, ReportService};
pub use target_service::TargetService;
