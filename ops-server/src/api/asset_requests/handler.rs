//! Asset Requisition API Handlers
//!
//! 发放与归还在同一事务中调整每个资产的可用数量。

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use sqlx::{SqliteConnection, SqlitePool};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::asset_request::NewAssetLine;
use crate::db::repository::{asset, asset_request, begin, commit, employee};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult};
use shared::ErrorCode;
use shared::error::OpResponse;
use shared::models::{
    Asset, AssetRequest, AssetRequestCreate, AssetRequestQuery, AssetRequestStatus, RejectRequest,
};

const RESOURCE: &str = "asset_request";
const ASSET_RESOURCE: &str = "asset";

type OpResult = AppResult<Json<OpResponse<AssetRequest>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Approve,
    Reject,
    Issue,
    Return,
    Delete,
}

impl Action {
    fn allowed_from(self) -> &'static [AssetRequestStatus] {
        use AssetRequestStatus::*;
        match self {
            Action::Approve => &[Pending],
            Action::Reject => &[Pending, Approved],
            Action::Issue => &[Approved],
            Action::Return => &[Issued],
            Action::Delete => &[Pending, Rejected],
        }
    }

    fn target(self) -> &'static str {
        match self {
            Action::Approve => "APPROVED",
            Action::Reject => "REJECTED",
            Action::Issue => "ISSUED",
            Action::Return => "RETURNED",
            Action::Delete => "DELETED",
        }
    }
}

fn ensure_transition(from: AssetRequestStatus, action: Action) -> AppResult<()> {
    if action.allowed_from().contains(&from) {
        return Ok(());
    }
    Err(AppError::invalid_transition(
        ErrorCode::AssetRequestInvalidTransition,
        from.as_str(),
        action.target(),
    ))
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::AssetRequestNotFound,
        format!("Asset request {} not found", id),
    )
}

async fn load(conn: &mut SqliteConnection, id: i64) -> AppResult<AssetRequest> {
    asset_request::find_by_id_in(conn, id)
        .await?
        .ok_or_else(|| not_found(id))
}

async fn create_request(pool: &SqlitePool, data: &AssetRequestCreate) -> AppResult<AssetRequest> {
    validate_optional_text(&data.purpose, "purpose", MAX_NOTE_LEN)?;
    if data.items.is_empty() {
        return Err(AppError::validation("At least one asset is required").with_detail("field", "items"));
    }

    let mut tx = begin(pool).await?;
    if !employee::exists(&mut tx, data.requested_by).await? {
        return Err(AppError::with_message(
            ErrorCode::EmployeeNotFound,
            format!("Employee {} not found", data.requested_by),
        ));
    }

    let mut seen = HashSet::new();
    let mut lines: Vec<NewAssetLine> = Vec::with_capacity(data.items.len());
    for item in &data.items {
        if item.quantity <= 0 {
            return Err(AppError::validation("quantity must be greater than zero")
                .with_detail("asset_id", item.asset_id));
        }
        if !seen.insert(item.asset_id) {
            return Err(AppError::validation("Each asset may appear only once")
                .with_detail("asset_id", item.asset_id));
        }
        let found = asset::find_by_id_in(&mut tx, item.asset_id).await?.ok_or_else(|| {
            AppError::with_message(
                ErrorCode::AssetNotFound,
                format!("Asset {} not found", item.asset_id),
            )
        })?;
        lines.push((found.id, found.name, item.quantity));
    }

    let purpose = data.purpose.as_deref().map(str::trim).filter(|p| !p.is_empty());
    let id = asset_request::insert(&mut tx, data.requested_by, purpose, &lines).await?;
    let request = load(&mut tx, id).await?;
    commit(tx).await?;

    tracing::info!(asset_request_id = id, items = lines.len(), "Asset request created");
    Ok(request)
}

async fn approve_request(pool: &SqlitePool, id: i64, approved_by: i64) -> AppResult<AssetRequest> {
    let mut tx = begin(pool).await?;
    let current = load(&mut tx, id).await?;
    ensure_transition(current.status, Action::Approve)?;

    for item in &current.items {
        let available = asset::find_by_id_in(&mut tx, item.asset_id)
            .await?
            .map(|a| a.quantity_available)
            .unwrap_or(0);
        if available < item.quantity {
            return Err(AppError::with_message(
                ErrorCode::AssetUnavailable,
                format!(
                    "Only {} unit(s) of {} available, {} requested",
                    available, item.asset_name, item.quantity
                ),
            ));
        }
    }

    asset_request::set_status(&mut tx, id, AssetRequestStatus::Approved, Some(approved_by), None)
        .await?;
    let request = load(&mut tx, id).await?;
    commit(tx).await?;
    Ok(request)
}

async fn reject_request(pool: &SqlitePool, id: i64, reason: &str) -> AppResult<AssetRequest> {
    validate_required_text(reason, "reason", MAX_NOTE_LEN)?;

    let mut tx = begin(pool).await?;
    let current = load(&mut tx, id).await?;
    ensure_transition(current.status, Action::Reject)?;

    asset_request::set_status(
        &mut tx,
        id,
        AssetRequestStatus::Rejected,
        None,
        Some(reason.trim()),
    )
    .await?;
    let request = load(&mut tx, id).await?;
    commit(tx).await?;
    Ok(request)
}

/// Issue (−) or return (+) every line, all or nothing
async fn move_units(
    pool: &SqlitePool,
    id: i64,
    action: Action,
) -> AppResult<(AssetRequest, Vec<Asset>)> {
    let (sign, next) = match action {
        Action::Issue => (-1, AssetRequestStatus::Issued),
        _ => (1, AssetRequestStatus::Returned),
    };

    let mut tx = begin(pool).await?;
    let current = load(&mut tx, id).await?;
    ensure_transition(current.status, action)?;

    let mut touched = Vec::with_capacity(current.items.len());
    for item in &current.items {
        let updated = asset::shift_available(&mut tx, item.asset_id, sign * item.quantity).await?;
        touched.push(updated);
    }
    asset_request::set_status(&mut tx, id, next, None, None).await?;
    let request = load(&mut tx, id).await?;
    commit(tx).await?;

    tracing::info!(asset_request_id = id, status = next.as_str(), assets = touched.len(), "Asset units moved");
    Ok((request, touched))
}

async fn delete_request(pool: &SqlitePool, id: i64) -> AppResult<AssetRequest> {
    let mut tx = begin(pool).await?;
    let current = load(&mut tx, id).await?;
    ensure_transition(current.status, Action::Delete)?;
    asset_request::delete(&mut tx, id).await?;
    commit(tx).await?;
    Ok(current)
}

fn publish_assets(state: &ServerState, assets: &[Asset]) {
    for asset in assets {
        state.broadcast(ASSET_RESOURCE, "assetUpdated", asset.id, Some(asset));
    }
}

/// List, `?status=&requested_by=`
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AssetRequestQuery>,
) -> AppResult<Json<Vec<AssetRequest>>> {
    let requests = asset_request::find_all(&state.pool, &query).await?;
    Ok(Json(requests))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AssetRequest>> {
    let request = asset_request::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(request))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AssetRequestCreate>,
) -> OpResult {
    let request = create_request(&state.pool, &payload).await?;
    state.broadcast(RESOURCE, "assetRequestCreated", request.id, Some(&request));
    Ok(Json(OpResponse::new(request, "Asset request created")))
}

pub async fn approve(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> OpResult {
    let request = approve_request(&state.pool, id, user.id).await?;
    state.broadcast(RESOURCE, "assetRequestApproved", id, Some(&request));
    Ok(Json(OpResponse::new(request, "Asset request approved")))
}

pub async fn reject(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RejectRequest>,
) -> OpResult {
    let request = reject_request(&state.pool, id, &payload.reason).await?;
    state.broadcast(RESOURCE, "assetRequestRejected", id, Some(&request));
    Ok(Json(OpResponse::new(request, "Asset request rejected")))
}

pub async fn issue(State(state): State<ServerState>, Path(id): Path<i64>) -> OpResult {
    let (request, assets) = move_units(&state.pool, id, Action::Issue).await?;
    state.broadcast(RESOURCE, "assetsIssued", id, Some(&request));
    publish_assets(&state, &assets);
    Ok(Json(OpResponse::new(request, "Assets issued")))
}

pub async fn return_assets(State(state): State<ServerState>, Path(id): Path<i64>) -> OpResult {
    let (request, assets) = move_units(&state.pool, id, Action::Return).await?;
    state.broadcast(RESOURCE, "assetsReturned", id, Some(&request));
    publish_assets(&state, &assets);
    Ok(Json(OpResponse::new(request, "Assets returned")))
}

pub async fn delete(State(state): State<ServerState>, Path(id): Path<i64>) -> OpResult {
    let request = delete_request(&state.pool, id).await?;
    state.broadcast::<()>(RESOURCE, "assetRequestDeleted", id, None);
    Ok(Json(OpResponse::new(request, "Asset request deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::{AssetCreate, AssetRequestItemInput, EmployeeCreate};

    struct Fixture {
        pool: SqlitePool,
        employee_id: i64,
        pump: Asset,
    }

    async fn setup(total: i64) -> Fixture {
        let pool = DbService::in_memory().await.unwrap().pool;
        let employee = employee::create(
            &pool,
            EmployeeCreate {
                first_name: "Jon".into(),
                last_name: "Arrieta".into(),
                email: "jon@farm.test".into(),
                phone: None,
                department: None,
                position: None,
                salary: None,
                hire_date: None,
                status: None,
                photo_url: None,
            },
        )
        .await
        .unwrap();
        let pump = asset::create(
            &pool,
            AssetCreate {
                name: "Water pump".into(),
                asset_code: "PUMP-01".into(),
                category: None,
                location: None,
                condition: None,
                quantity_total: Some(total),
                image_url: None,
                notes: None,
            },
        )
        .await
        .unwrap();
        Fixture {
            pool,
            employee_id: employee.id,
            pump,
        }
    }

    fn request_for(fx: &Fixture, quantity: i64) -> AssetRequestCreate {
        AssetRequestCreate {
            requested_by: fx.employee_id,
            purpose: Some("Cage cleaning".into()),
            items: vec![AssetRequestItemInput {
                asset_id: fx.pump.id,
                quantity,
            }],
        }
    }

    #[test]
    fn test_transition_table() {
        use AssetRequestStatus::*;
        assert!(ensure_transition(Pending, Action::Approve).is_ok());
        assert!(ensure_transition(Approved, Action::Reject).is_ok());
        assert!(ensure_transition(Rejected, Action::Delete).is_ok());
        let err = ensure_transition(Issued, Action::Delete).unwrap_err();
        assert_eq!(err.code, ErrorCode::AssetRequestInvalidTransition);
        assert!(ensure_transition(Pending, Action::Issue).is_err());
        assert!(ensure_transition(Returned, Action::Return).is_err());
    }

    #[tokio::test]
    async fn test_issue_and_return_cycle() {
        let fx = setup(3).await;
        let request = create_request(&fx.pool, &request_for(&fx, 2)).await.unwrap();
        assert_eq!(request.status, AssetRequestStatus::Pending);
        assert_eq!(request.items[0].asset_name, "Water pump");

        approve_request(&fx.pool, request.id, 1).await.unwrap();
        let (issued, assets) = move_units(&fx.pool, request.id, Action::Issue).await.unwrap();
        assert_eq!(issued.status, AssetRequestStatus::Issued);
        assert!(issued.issued_at.is_some());
        assert_eq!(assets[0].quantity_available, 1);

        // units out on request block deletion of the asset
        let err: AppError = asset::delete(&fx.pool, fx.pump.id).await.unwrap_err().into();
        assert_eq!(err.code, ErrorCode::AssetInUse);

        let (returned, assets) = move_units(&fx.pool, request.id, Action::Return).await.unwrap();
        assert_eq!(returned.status, AssetRequestStatus::Returned);
        assert_eq!(assets[0].quantity_available, 3);
    }

    #[tokio::test]
    async fn test_approve_checks_availability() {
        let fx = setup(1).await;
        let request = create_request(&fx.pool, &request_for(&fx, 2)).await.unwrap();
        let err = approve_request(&fx.pool, request.id, 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AssetUnavailable);

        let rejected = reject_request(&fx.pool, request.id, "Not enough pumps")
            .await
            .unwrap();
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Not enough pumps"));
        delete_request(&fx.pool, request.id).await.unwrap();
        let err = delete_request(&fx.pool, request.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AssetRequestNotFound);
    }

    #[tokio::test]
    async fn test_create_validation() {
        let fx = setup(1).await;
        let err = create_request(&fx.pool, &request_for(&fx, 0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        let mut unknown = request_for(&fx, 1);
        unknown.requested_by = 42;
        let err = create_request(&fx.pool, &unknown).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmployeeNotFound);
    }
}
