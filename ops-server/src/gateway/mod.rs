//! 网关模块 - WebSocket 广播
//!
//! - [`GatewayHub`] - broadcast channel + 资源版本号
//! - [`ws::handle_ws`] - `/ws` 升级与会话循环

pub mod hub;
pub mod ws;

pub use hub::{BROADCAST_CAPACITY, GatewayHub, ResourceVersions};

use axum::{Router, routing::get};

use crate::core::ServerState;

/// `/ws` 不在 `/api/` 之下，由会话自身完成认证
pub fn router() -> Router<ServerState> {
    Router::new().route("/ws", get(ws::handle_ws))
}
