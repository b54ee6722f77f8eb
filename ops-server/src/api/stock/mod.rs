//! Stock-in API Module
//!
//! 库存记录与出入库流水

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stock", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/history", get(handler::history))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/history", get(handler::item_history))
        .layer(middleware::from_fn(require_permission("stock:read")));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/restock", post(handler::restock))
        .layer(middleware::from_fn(require_permission("stock:write")));

    read_routes.merge(manage_routes)
}
