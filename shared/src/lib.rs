//! Shared types for the ops backend
//!
//! Wire types used by the server and by API clients: domain models and
//! DTOs, the unified error system, gateway event envelopes and small
//! utilities (IDs, timestamps).

pub mod client;
pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode, OpResponse};
pub use message::GatewayEvent;
