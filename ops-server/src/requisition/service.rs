//! 领料申请工作流
//!
//! 每个动作一个事务: 读取申请单 → 校验状态 → 改行/扣库存 → 重新推导状态 → 提交。
//! 任一行失败整单回滚。广播与邮件由 API 层在提交之后处理。

use std::collections::HashSet;

use shared::ErrorCode;
use shared::models::{
    IssueMaterials, LineQuantity, ReceiveMaterials, Request, RequestCreate, RequestItemInput,
    RequestUpdate, StockIn,
};
use sqlx::{SqliteConnection, SqlitePool};

use super::lifecycle::{RequestAction, ensure_transition};
use super::quantity::{
    derive_request_status, format_request_number, item_status, remaining_to_issue,
    remaining_to_receive,
};
use crate::AppError;
use crate::db::repository::request::{self as request_repo, NewItem};
use crate::db::repository::{begin, commit, employee, stock};
use crate::utils::quantity::{add, gte, to_decimal, to_f64};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_quantity, validate_required_text,
};

type ServiceResult<T> = Result<T, AppError>;

/// 发料结果: 申请单和被扣减的库存行
#[derive(Debug, Clone)]
pub struct IssueOutcome {
    pub request: Request,
    pub stock: Vec<StockIn>,
}

async fn load(conn: &mut SqliteConnection, id: i64) -> ServiceResult<Request> {
    Ok(request_repo::find_by_id_in(conn, id)
        .await?
        .ok_or_else(|| request_repo::not_found(id))?)
}

/// 校验行并生成带快照的插入数据
async fn build_items(
    conn: &mut SqliteConnection,
    inputs: &[RequestItemInput],
) -> ServiceResult<Vec<NewItem>> {
    if inputs.is_empty() {
        return Err(AppError::new(ErrorCode::RequestEmpty));
    }

    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(inputs.len());
    for input in inputs {
        validate_quantity(input.quantity, "quantity")?;
        if !seen.insert(input.stock_in_id) {
            return Err(AppError::with_message(
                ErrorCode::RequestDuplicateItem,
                format!("Stock item {} appears more than once", input.stock_in_id),
            )
            .with_detail("stock_in_id", input.stock_in_id));
        }
        let stock_in = stock::find_by_id_in(conn, input.stock_in_id)
            .await?
            .ok_or_else(|| stock::not_found(input.stock_in_id))?;
        items.push(NewItem {
            stock_in_id: stock_in.id,
            product_name: stock_in.product_name,
            unit: stock_in.unit,
            quantity: to_f64(to_decimal(input.quantity)),
        });
    }
    Ok(items)
}

fn validate_header(site: Option<&str>, purpose: &Option<String>) -> ServiceResult<()> {
    if let Some(site) = site {
        validate_required_text(site, "site", MAX_NAME_LEN)?;
    }
    validate_optional_text(purpose, "purpose", MAX_NOTE_LEN)?;
    Ok(())
}

/// 新建申请单 (PENDING)
pub async fn create(pool: &SqlitePool, data: &RequestCreate) -> ServiceResult<Request> {
    validate_header(Some(&data.site), &data.purpose)?;

    let mut tx = begin(pool).await?;
    if !employee::exists(&mut tx, data.requested_by).await? {
        return Err(AppError::with_message(
            ErrorCode::EmployeeNotFound,
            format!("Employee {} not found", data.requested_by),
        ));
    }
    let items = build_items(&mut tx, &data.items).await?;

    let seq = request_repo::next_seq(&mut tx).await?;
    let request_number = format_request_number(seq);
    let id = request_repo::insert(
        &mut tx,
        seq,
        &request_number,
        data.site.trim(),
        data.purpose.as_deref(),
        data.requested_by,
    )
    .await?;
    request_repo::insert_items(&mut tx, id, &items).await?;

    let request = load(&mut tx, id).await?;
    commit(tx).await?;

    tracing::info!(
        request_id = id,
        request_number = %request.request_number,
        items = request.items.len(),
        "Stock request created"
    );
    Ok(request)
}

/// 修改头信息或整体替换行 (仅 PENDING)
pub async fn update(pool: &SqlitePool, id: i64, data: &RequestUpdate) -> ServiceResult<Request> {
    validate_header(data.site.as_deref(), &data.purpose)?;

    let mut tx = begin(pool).await?;
    let current = load(&mut tx, id).await?;
    ensure_transition(current.status, RequestAction::Update)?;

    if let Some(inputs) = &data.items {
        let items = build_items(&mut tx, inputs).await?;
        request_repo::delete_items(&mut tx, id).await?;
        request_repo::insert_items(&mut tx, id, &items).await?;
    }
    request_repo::update_header(
        &mut tx,
        id,
        data.site.as_deref().map(str::trim),
        data.purpose.as_deref(),
    )
    .await?;

    let request = load(&mut tx, id).await?;
    commit(tx).await?;
    Ok(request)
}

pub async fn approve(pool: &SqlitePool, id: i64, approved_by: i64) -> ServiceResult<Request> {
    let mut tx = begin(pool).await?;
    let current = load(&mut tx, id).await?;
    ensure_transition(current.status, RequestAction::Approve)?;

    request_repo::set_approved(&mut tx, id, approved_by).await?;
    let request = load(&mut tx, id).await?;
    commit(tx).await?;

    tracing::info!(request_number = %request.request_number, approved_by, "Stock request approved");
    Ok(request)
}

pub async fn reject(pool: &SqlitePool, id: i64, reason: &str) -> ServiceResult<Request> {
    validate_required_text(reason, "reason", MAX_NOTE_LEN)?;

    let mut tx = begin(pool).await?;
    let current = load(&mut tx, id).await?;
    ensure_transition(current.status, RequestAction::Reject)?;

    request_repo::set_rejected(&mut tx, id, reason.trim()).await?;
    let request = load(&mut tx, id).await?;
    commit(tx).await?;

    tracing::info!(request_number = %request.request_number, "Stock request rejected");
    Ok(request)
}

fn check_unique_lines(lines: &[LineQuantity]) -> ServiceResult<()> {
    if lines.is_empty() {
        return Err(AppError::validation("items must not be empty").with_detail("field", "items"));
    }
    let mut seen = HashSet::new();
    for line in lines {
        if !seen.insert(line.item_id) {
            return Err(AppError::validation(format!(
                "Request item {} appears more than once",
                line.item_id
            ))
            .with_detail("item_id", line.item_id));
        }
    }
    Ok(())
}

fn item_not_found(request: &Request, item_id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::RequestItemNotFound,
        format!(
            "Item {} does not belong to request {}",
            item_id, request.request_number
        ),
    )
    .with_detail("item_id", item_id)
}

/// 在事务内按行发料, 返回被扣减的库存
async fn issue_lines(
    conn: &mut SqliteConnection,
    request: &Request,
    lines: &[LineQuantity],
    note: Option<&str>,
    created_by: Option<i64>,
) -> ServiceResult<Vec<StockIn>> {
    ensure_transition(request.status, RequestAction::Issue)?;
    check_unique_lines(lines)?;

    let meta = stock::MovementMeta {
        reference: Some(request.request_number.as_str()),
        note,
        created_by,
    };

    let mut touched = Vec::with_capacity(lines.len());
    for line in lines {
        validate_quantity(line.quantity, "quantity")?;
        let item = request
            .items
            .iter()
            .find(|i| i.id == line.item_id)
            .ok_or_else(|| item_not_found(request, line.item_id))?;

        let remaining = remaining_to_issue(item);
        if !gte(remaining, line.quantity) {
            return Err(AppError::with_message(
                ErrorCode::RequestOverIssue,
                format!(
                    "{}: issuing {} exceeds remaining {} {}",
                    item.product_name, line.quantity, remaining, item.unit
                ),
            )
            .with_detail("item_id", item.id)
            .with_detail("remaining", remaining));
        }

        let stock_in = stock::draw(conn, item.stock_in_id, line.quantity, &meta).await?;

        let issued = add(item.quantity_issued, line.quantity);
        let status = item_status(item.quantity_requested, issued, item.quantity_received);
        request_repo::update_item(conn, item.id, issued, item.quantity_received, status).await?;
        touched.push(stock_in);
    }

    let items = request_repo::find_items(conn, request.id).await?;
    request_repo::set_status(conn, request.id, derive_request_status(&items)).await?;
    Ok(touched)
}

/// 全部行按剩余数量发出
pub async fn issue_all(
    pool: &SqlitePool,
    id: i64,
    created_by: Option<i64>,
) -> ServiceResult<IssueOutcome> {
    let mut tx = begin(pool).await?;
    let current = load(&mut tx, id).await?;
    ensure_transition(current.status, RequestAction::Issue)?;

    let lines: Vec<LineQuantity> = current
        .items
        .iter()
        .map(|item| LineQuantity {
            item_id: item.id,
            quantity: remaining_to_issue(item),
        })
        .filter(|line| line.quantity > 0.0)
        .collect();

    let stock = issue_lines(&mut tx, &current, &lines, None, created_by).await?;
    let request = load(&mut tx, id).await?;
    commit(tx).await?;

    tracing::info!(
        request_number = %request.request_number,
        status = request.status.as_str(),
        lines = lines.len(),
        "Materials issued in full"
    );
    Ok(IssueOutcome { request, stock })
}

/// 按指定数量发料
pub async fn issue_materials(
    pool: &SqlitePool,
    data: &IssueMaterials,
    created_by: Option<i64>,
) -> ServiceResult<IssueOutcome> {
    validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;

    let mut tx = begin(pool).await?;
    let current = load(&mut tx, data.request_id).await?;
    let stock = issue_lines(
        &mut tx,
        &current,
        &data.items,
        data.note.as_deref(),
        created_by,
    )
    .await?;
    let request = load(&mut tx, data.request_id).await?;
    commit(tx).await?;

    tracing::info!(
        request_number = %request.request_number,
        status = request.status.as_str(),
        lines = data.items.len(),
        "Materials issued"
    );
    Ok(IssueOutcome { request, stock })
}

/// 确认收货
pub async fn receive_materials(pool: &SqlitePool, data: &ReceiveMaterials) -> ServiceResult<Request> {
    let mut tx = begin(pool).await?;
    let current = load(&mut tx, data.request_id).await?;
    ensure_transition(current.status, RequestAction::Receive)?;
    check_unique_lines(&data.items)?;

    for line in &data.items {
        validate_quantity(line.quantity, "quantity")?;
        let item = current
            .items
            .iter()
            .find(|i| i.id == line.item_id)
            .ok_or_else(|| item_not_found(&current, line.item_id))?;

        let remaining = remaining_to_receive(item);
        if !gte(remaining, line.quantity) {
            return Err(AppError::with_message(
                ErrorCode::RequestOverReceive,
                format!(
                    "{}: receiving {} exceeds outstanding {} {}",
                    item.product_name, line.quantity, remaining, item.unit
                ),
            )
            .with_detail("item_id", item.id)
            .with_detail("remaining", remaining));
        }

        let received = add(item.quantity_received, line.quantity);
        let status = item_status(item.quantity_requested, item.quantity_issued, received);
        request_repo::update_item(&mut tx, item.id, item.quantity_issued, received, status).await?;
    }

    let items = request_repo::find_items(&mut tx, current.id).await?;
    request_repo::set_status(&mut tx, current.id, derive_request_status(&items)).await?;
    let request = load(&mut tx, current.id).await?;
    commit(tx).await?;

    tracing::info!(
        request_number = %request.request_number,
        status = request.status.as_str(),
        "Materials received"
    );
    Ok(request)
}

pub async fn close(pool: &SqlitePool, id: i64) -> ServiceResult<Request> {
    let mut tx = begin(pool).await?;
    let current = load(&mut tx, id).await?;
    ensure_transition(current.status, RequestAction::Close)?;

    request_repo::set_status(&mut tx, id, shared::models::RequestStatus::Closed).await?;
    let request = load(&mut tx, id).await?;
    commit(tx).await?;
    Ok(request)
}

/// 删除 (PENDING / REJECTED), 返回被删除的申请单
pub async fn delete(pool: &SqlitePool, id: i64) -> ServiceResult<Request> {
    let mut tx = begin(pool).await?;
    let current = load(&mut tx, id).await?;
    ensure_transition(current.status, RequestAction::Delete)?;

    request_repo::delete(&mut tx, id).await?;
    commit(tx).await?;

    tracing::info!(request_number = %current.request_number, "Stock request deleted");
    Ok(current)
}
