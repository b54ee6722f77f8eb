//! Stock Requisition API Handlers
//!
//! 工作流动作返回 `{ success, data, message }`; 广播在事务提交之后。

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{employee, request};
use crate::mail;
use crate::requisition::quantity::summarize;
use crate::requisition::{IssueOutcome, service};
use crate::utils::{AppError, AppResult};
use shared::ErrorCode;
use shared::error::OpResponse;
use shared::models::{
    IssueMaterials, ReceiveMaterials, RejectRequest, Request, RequestCreate, RequestQuery,
    RequestSummary, RequestUpdate,
};

const RESOURCE: &str = "request";
const STOCK_RESOURCE: &str = "stock";

type OpResult = AppResult<Json<OpResponse<Request>>>;

fn publish_issue(state: &ServerState, outcome: &IssueOutcome) {
    let request = &outcome.request;
    state.broadcast(RESOURCE, "materialsIssued", request.id, Some(request));
    for item in &outcome.stock {
        state.broadcast(STOCK_RESOURCE, "stockUpdated", item.id, Some(item));
    }
}

/// Mail the requesting employee; a missing employee only skips the mail
async fn notify_requester(state: &ServerState, request: &Request, approver: Option<&str>) {
    let requester = match employee::find_by_id(&state.pool, request.requested_by).await {
        Ok(Some(requester)) => requester,
        Ok(None) => {
            tracing::warn!(request = %request.request_number, "Requesting employee no longer exists, mail skipped");
            return;
        }
        Err(e) => {
            tracing::warn!(request = %request.request_number, error = %e, "Failed to load requesting employee");
            return;
        }
    };
    let mail = match approver {
        Some(approver) => mail::request_approved(request, &requester, approver),
        None => mail::request_rejected(request, &requester),
    };
    state.notify(mail).await;
}

/// List requests, `?status=&site=&requested_by=`
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<RequestQuery>,
) -> AppResult<Json<Vec<Request>>> {
    let requests = request::find_all(&state.pool, &query).await?;
    Ok(Json(requests))
}

async fn load(state: &ServerState, id: i64) -> AppResult<Request> {
    request::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::RequestNotFound, format!("Request {} not found", id))
    })
}

/// Request with its items
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Request>> {
    Ok(Json(load(&state, id).await?))
}

/// Per item requested / issued / received / remaining
pub async fn summary(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RequestSummary>> {
    let request = load(&state, id).await?;
    Ok(Json(summarize(&request)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<RequestCreate>,
) -> OpResult {
    let request = service::create(&state.pool, &payload).await?;
    state.broadcast(RESOURCE, "requestCreated", request.id, Some(&request));

    let message = format!("Request {} created", request.request_number);
    Ok(Json(OpResponse::new(request, message)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RequestUpdate>,
) -> OpResult {
    let request = service::update(&state.pool, id, &payload).await?;
    state.broadcast(RESOURCE, "requestUpdated", id, Some(&request));

    let message = format!("Request {} updated", request.request_number);
    Ok(Json(OpResponse::new(request, message)))
}

/// Approve; the approver is the current user
pub async fn approve(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> OpResult {
    let request = service::approve(&state.pool, id, user.id).await?;
    state.broadcast(RESOURCE, "requestApproved", id, Some(&request));
    notify_requester(&state, &request, Some(&user.display_name)).await;

    let message = format!("Request {} approved", request.request_number);
    Ok(Json(OpResponse::new(request, message)))
}

pub async fn reject(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RejectRequest>,
) -> OpResult {
    let request = service::reject(&state.pool, id, &payload.reason).await?;
    state.broadcast(RESOURCE, "requestRejected", id, Some(&request));
    notify_requester(&state, &request, None).await;

    let message = format!("Request {} rejected", request.request_number);
    Ok(Json(OpResponse::new(request, message)))
}

/// Issue every item's full remaining quantity
pub async fn issue(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> OpResult {
    let outcome = service::issue_all(&state.pool, id, Some(user.id)).await?;
    publish_issue(&state, &outcome);

    let message = format!("Materials issued for {}", outcome.request.request_number);
    Ok(Json(OpResponse::new(outcome.request, message)))
}

/// Issue explicit quantities, all lines or none
pub async fn issue_materials(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<IssueMaterials>,
) -> OpResult {
    let outcome = service::issue_materials(&state.pool, &payload, Some(user.id)).await?;
    publish_issue(&state, &outcome);

    let message = format!(
        "{} line(s) issued for {}",
        payload.items.len(),
        outcome.request.request_number
    );
    Ok(Json(OpResponse::new(outcome.request, message)))
}

pub async fn receive_materials(
    State(state): State<ServerState>,
    Json(payload): Json<ReceiveMaterials>,
) -> OpResult {
    let request = service::receive_materials(&state.pool, &payload).await?;
    state.broadcast(RESOURCE, "materialsReceived", request.id, Some(&request));

    let message = format!("Materials received for {}", request.request_number);
    Ok(Json(OpResponse::new(request, message)))
}

pub async fn close(State(state): State<ServerState>, Path(id): Path<i64>) -> OpResult {
    let request = service::close(&state.pool, id).await?;
    state.broadcast(RESOURCE, "requestClosed", id, Some(&request));

    let message = format!("Request {} closed", request.request_number);
    Ok(Json(OpResponse::new(request, message)))
}

/// Delete a PENDING or REJECTED request
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> OpResult {
    let request = service::delete(&state.pool, id).await?;
    state.broadcast::<()>(RESOURCE, "requestDeleted", id, None);

    let message = format!("Request {} deleted", request.request_number);
    Ok(Json(OpResponse::new(request, message)))
}
