//! Asset Requisition API Module
//!
//! PENDING → APPROVED → ISSUED → RETURNED, PENDING/APPROVED → REJECTED

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::ASSET_REQUESTS_CREATE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/asset-requests", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission("asset_requests:read")));

    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_permission(ASSET_REQUESTS_CREATE)));

    // 审批、发放、归还由资产管理员处理
    let manage_routes = Router::new()
        .route("/{id}/approve", post(handler::approve))
        .route("/{id}/reject", post(handler::reject))
        .route("/{id}/issue", post(handler::issue))
        .route("/{id}/return", post(handler::return_assets))
        .route("/{id}", axum::routing::delete(handler::delete))
        .layer(middleware::from_fn(require_permission("assets:write")));

    read_routes.merge(create_routes).merge(manage_routes)
}
