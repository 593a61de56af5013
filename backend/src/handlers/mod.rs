//! HTTP handlers for the DairyFlow API

pub mod admins;
pub mod auth;
pub mod farmers;
pub mod health;
pub mod reports;
pub mod requests;
pub mod stock;

pub use admins::*;
pub use auth::*;
pub use farmers::*;
pub use health::*;
pub use reports::*;
pub use requests::*;
pub use stock::*;
