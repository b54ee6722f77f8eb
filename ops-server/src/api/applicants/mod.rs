//! Applicant API Module
//!
//! 招聘流程: APPLIED → SCREENING → INTERVIEW → OFFERED → HIRED, 任意未结束
//! 阶段可转为 REJECTED。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/applicants", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission("applicants:read")));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .route("/{id}/stage", patch(handler::change_stage))
        .layer(middleware::from_fn(require_permission("applicants:write")));

    read_routes.merge(manage_routes)
}
