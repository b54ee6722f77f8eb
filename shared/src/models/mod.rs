//! Data models
//!
//! Shared between ops-server and the dashboard (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes, timestamps are epoch milliseconds.

pub mod applicant;
pub mod asset;
pub mod asset_request;
pub mod cage;
pub mod client;
pub mod employee;
pub mod feeding;
pub mod job;
pub mod medicine;
pub mod pond;
pub mod request;
pub mod stock;
pub mod user;

// Re-exports
pub use applicant::*;
pub use asset::*;
pub use asset_request::*;
pub use cage::*;
pub use client::*;
pub use employee::*;
pub use feeding::*;
pub use job::*;
pub use medicine::*;
pub use pond::*;
pub use request::*;
pub use stock::*;
pub use user::*;
