//! Upload Routes
//!
//! `POST /api/upload` 接收图片和文档; 文件由 `/uploads/*` 静态服务返回。

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// Build upload router (authentication required, no extra permission)
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/upload", post(handler::upload))
}
