//! Shared types and models for the DairyFlow farm-supply platform
//!
//! This crate holds the domain records, the feed-request state machine and the
//! pure calculations (reporting, time windows) used by the backend. It performs
//! no I/O.

pub mod error;
pub mod models;
pub mod reporting;
pub mod time;
pub mod types;
pub mod validation;
pub mod workflow;

pub use error::*;
pub use models::*;
pub use types::*;
pub use validation::*;
