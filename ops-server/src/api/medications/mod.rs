//! Medication (treatment record) API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::permissions::{AQUACULTURE_MANAGE, AQUACULTURE_WRITE};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/medications", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission("aquaculture:read")));

    let write_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_permission(AQUACULTURE_WRITE)));

    let manage_routes = Router::new()
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_permission(AQUACULTURE_MANAGE)));

    read_routes.merge(write_routes).merge(manage_routes)
}
