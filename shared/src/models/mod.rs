//! Domain models for the DairyFlow platform

mod admin;
mod farmer;
mod feed_history;
mod feed_request;
mod stock;

pub use admin::*;
pub use farmer::*;
pub use feed_history::*;
pub use feed_request::*;
pub use stock::*;
