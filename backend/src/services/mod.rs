//! Business logic services for the DairyFlow platform

pub mod admin;
pub mod auth;
pub mod farmer;
pub mod feed_request;
pub mod reporting;
pub mod retention;
pub mod stock;

pub use admin::AdminService;
pub use auth::AuthService;
pub use farmer::FarmerService;
pub use feed_request::FeedRequestService;
pub use reporting::ReportingService;
pub use retention::RetentionService;
pub use stock::StockService;
