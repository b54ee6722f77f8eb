//! Stock Request Repository
//!
//! Row-level access only. Lifecycle rules and quantity checks live in
//! `crate::requisition`; every mutating helper here takes the workflow's
//! transaction connection.

use super::{RepoError, RepoResult};
use shared::ErrorCode;
use shared::models::{Request, RequestItem, RequestItemStatus, RequestQuery, RequestStatus};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, request_number, site, purpose, requested_by, status, approved_by, \
                       approved_at, rejection_reason, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, request_id, stock_in_id, product_name, unit, quantity_requested, \
                            quantity_issued, quantity_received, status";

pub(crate) fn not_found(id: i64) -> RepoError {
    RepoError::rule(ErrorCode::RequestNotFound, format!("Request {id} not found"))
}

/// New line to insert
#[derive(Debug, Clone)]
pub struct NewItem {
    pub stock_in_id: i64,
    pub product_name: String,
    pub unit: String,
    pub quantity: f64,
}

pub async fn find_all(pool: &SqlitePool, query: &RequestQuery) -> RepoResult<Vec<Request>> {
    let mut conn = pool.acquire().await?;
    let mut requests = sqlx::query_as::<_, Request>(&format!(
        "SELECT {COLUMNS} FROM request \
         WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR site = ?2) AND (?3 IS NULL OR requested_by = ?3) \
         ORDER BY seq DESC"
    ))
    .bind(query.status)
    .bind(query.site.as_deref())
    .bind(query.requested_by)
    .fetch_all(&mut *conn)
    .await?;
    for request in &mut requests {
        request.items = find_items(&mut conn, request.id).await?;
    }
    Ok(requests)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Request>> {
    let mut conn = pool.acquire().await?;
    find_by_id_in(&mut conn, id).await
}

/// Header plus items
pub async fn find_by_id_in(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Request>> {
    let request =
        sqlx::query_as::<_, Request>(&format!("SELECT {COLUMNS} FROM request WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
    match request {
        Some(mut request) => {
            request.items = find_items(conn, id).await?;
            Ok(Some(request))
        }
        None => Ok(None),
    }
}

pub async fn find_items(conn: &mut SqliteConnection, request_id: i64) -> RepoResult<Vec<RequestItem>> {
    let items = sqlx::query_as::<_, RequestItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM request_item WHERE request_id = ? ORDER BY line_no"
    ))
    .bind(request_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

/// Next value of the request number sequence
pub async fn next_seq(conn: &mut SqliteConnection) -> RepoResult<i64> {
    let seq = sqlx::query_scalar::<_, i64>("SELECT COALESCE(MAX(seq), 0) + 1 FROM request")
        .fetch_one(conn)
        .await?;
    Ok(seq)
}

pub async fn insert(
    conn: &mut SqliteConnection,
    seq: i64,
    request_number: &str,
    site: &str,
    purpose: Option<&str>,
    requested_by: i64,
) -> RepoResult<i64> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO request (id, seq, request_number, site, purpose, requested_by, status, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'PENDING', ?7, ?7)",
    )
    .bind(id)
    .bind(seq)
    .bind(request_number)
    .bind(site)
    .bind(purpose)
    .bind(requested_by)
    .bind(now_millis())
    .execute(conn)
    .await?;
    Ok(id)
}

pub async fn insert_items(
    conn: &mut SqliteConnection,
    request_id: i64,
    items: &[NewItem],
) -> RepoResult<()> {
    for (line_no, item) in items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO request_item (id, request_id, line_no, stock_in_id, product_name, unit, quantity_requested, \
             quantity_issued, quantity_received, status) VALUES (?, ?, ?, ?, ?, ?, ?, 0, 0, 'PENDING')",
        )
        .bind(snowflake_id())
        .bind(request_id)
        .bind(line_no as i64)
        .bind(item.stock_in_id)
        .bind(&item.product_name)
        .bind(&item.unit)
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

pub async fn delete_items(conn: &mut SqliteConnection, request_id: i64) -> RepoResult<()> {
    sqlx::query("DELETE FROM request_item WHERE request_id = ?")
        .bind(request_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn update_header(
    conn: &mut SqliteConnection,
    id: i64,
    site: Option<&str>,
    purpose: Option<&str>,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE request SET site = COALESCE(?1, site), purpose = COALESCE(?2, purpose), updated_at = ?3 WHERE id = ?4",
    )
    .bind(site)
    .bind(purpose)
    .bind(now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn set_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: RequestStatus,
) -> RepoResult<()> {
    sqlx::query("UPDATE request SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now_millis())
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn set_approved(conn: &mut SqliteConnection, id: i64, approved_by: i64) -> RepoResult<()> {
    let now = now_millis();
    sqlx::query(
        "UPDATE request SET status = 'APPROVED', approved_by = ?1, approved_at = ?2, updated_at = ?2 WHERE id = ?3",
    )
    .bind(approved_by)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn set_rejected(conn: &mut SqliteConnection, id: i64, reason: &str) -> RepoResult<()> {
    sqlx::query(
        "UPDATE request SET status = 'REJECTED', rejection_reason = ?, updated_at = ? WHERE id = ?",
    )
    .bind(reason)
    .bind(now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn update_item(
    conn: &mut SqliteConnection,
    item_id: i64,
    issued: f64,
    received: f64,
    status: RequestItemStatus,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE request_item SET quantity_issued = ?, quantity_received = ?, status = ? WHERE id = ?",
    )
    .bind(issued)
    .bind(received)
    .bind(status)
    .bind(item_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM request WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}
