//! Grown-egg Pond API Module
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | /api/grown-egg-ponds | GET | aquaculture:read |
//! | /api/grown-egg-ponds | POST | aquaculture:write |
//! | /api/grown-egg-ponds/{id} | GET | aquaculture:read |
//! | /api/grown-egg-ponds/{id} | PUT | aquaculture:write |
//! | /api/grown-egg-ponds/{id} | DELETE | aquaculture:manage |
//! | /api/grown-egg-ponds/{id}/transfer | POST | aquaculture:write |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::permissions::{AQUACULTURE_MANAGE, AQUACULTURE_WRITE};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/grown-egg-ponds", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission("aquaculture:read")));

    let write_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update))
        .route("/{id}/transfer", post(handler::transfer))
        .layer(middleware::from_fn(require_permission(AQUACULTURE_WRITE)));

    let manage_routes = Router::new()
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_permission(AQUACULTURE_MANAGE)));

    read_routes.merge(write_routes).merge(manage_routes)
}
