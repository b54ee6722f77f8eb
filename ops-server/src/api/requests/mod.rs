//! Stock Requisition API Module
//!
//! | 路径 | 方法 | 权限 |
//! |------|------|------|
//! | / , /{id}, /{id}/summary | GET | requests:read |
//! | / , /{id} | POST, PUT | requests:create |
//! | /{id}/approve, /{id}/reject | POST | requests:approve |
//! | /{id}/issue, /issue-materials | POST | requests:issue |
//! | /receive-materials | POST | requests:receive |
//! | /{id}/close, /{id} | POST, DELETE | requests:manage |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::permissions::{
    REQUESTS_APPROVE, REQUESTS_CREATE, REQUESTS_ISSUE, REQUESTS_MANAGE, REQUESTS_RECEIVE,
};
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/requests", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/summary", get(handler::summary))
        .layer(middleware::from_fn(require_permission("requests:read")));

    let create_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update))
        .layer(middleware::from_fn(require_permission(REQUESTS_CREATE)));

    let approve_routes = Router::new()
        .route("/{id}/approve", post(handler::approve))
        .route("/{id}/reject", post(handler::reject))
        .layer(middleware::from_fn(require_permission(REQUESTS_APPROVE)));

    let issue_routes = Router::new()
        .route("/{id}/issue", post(handler::issue))
        .route("/issue-materials", post(handler::issue_materials))
        .layer(middleware::from_fn(require_permission(REQUESTS_ISSUE)));

    let receive_routes = Router::new()
        .route("/receive-materials", post(handler::receive_materials))
        .layer(middleware::from_fn(require_permission(REQUESTS_RECEIVE)));

    let manage_routes = Router::new()
        .route("/{id}/close", post(handler::close))
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_permission(REQUESTS_MANAGE)));

    read_routes
        .merge(create_routes)
        .merge(approve_routes)
        .merge(issue_routes)
        .merge(receive_routes)
        .merge(manage_routes)
}
