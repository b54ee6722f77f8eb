//! Asset Request Repository

use super::{RepoError, RepoResult};
use shared::ErrorCode;
use shared::models::{AssetRequest, AssetRequestItem, AssetRequestQuery, AssetRequestStatus};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, requested_by, purpose, status, approved_by, rejection_reason, issued_at, \
                       returned_at, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, asset_request_id, asset_id, asset_name, quantity";

pub(crate) fn not_found(id: i64) -> RepoError {
    RepoError::rule(
        ErrorCode::AssetRequestNotFound,
        format!("Asset request {id} not found"),
    )
}

/// Line to insert: (asset id, asset name snapshot, quantity)
pub type NewAssetLine = (i64, String, i64);

pub async fn find_all(pool: &SqlitePool, query: &AssetRequestQuery) -> RepoResult<Vec<AssetRequest>> {
    let mut conn = pool.acquire().await?;
    let mut requests = sqlx::query_as::<_, AssetRequest>(&format!(
        "SELECT {COLUMNS} FROM asset_request \
         WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR requested_by = ?2) \
         ORDER BY created_at DESC"
    ))
    .bind(query.status)
    .bind(query.requested_by)
    .fetch_all(&mut *conn)
    .await?;
    for request in &mut requests {
        request.items = find_items(&mut conn, request.id).await?;
    }
    Ok(requests)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<AssetRequest>> {
    let mut conn = pool.acquire().await?;
    find_by_id_in(&mut conn, id).await
}

pub async fn find_by_id_in(
    conn: &mut SqliteConnection,
    id: i64,
) -> RepoResult<Option<AssetRequest>> {
    let request = sqlx::query_as::<_, AssetRequest>(&format!(
        "SELECT {COLUMNS} FROM asset_request WHERE id = ?"
    ))
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

async fn find_items(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> RepoResult<Vec<AssetRequestItem>> {
    let items = sqlx::query_as::<_, AssetRequestItem>(&format!(
        "SELECT {ITEM_COLUMNS} FROM asset_request_item WHERE asset_request_id = ? ORDER BY line_no"
    ))
    .bind(request_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

pub async fn insert(
    conn: &mut SqliteConnection,
    requested_by: i64,
    purpose: Option<&str>,
    lines: &[NewAssetLine],
) -> RepoResult<i64> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO asset_request (id, requested_by, purpose, status, created_at, updated_at) \
         VALUES (?1, ?2, ?3, 'PENDING', ?4, ?4)",
    )
    .bind(id)
    .bind(requested_by)
    .bind(purpose)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    for (line_no, (asset_id, asset_name, quantity)) in lines.iter().enumerate() {
        sqlx::query(
            "INSERT INTO asset_request_item (id, asset_request_id, line_no, asset_id, asset_name, quantity) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(snowflake_id())
        .bind(id)
        .bind(line_no as i64)
        .bind(asset_id)
        .bind(asset_name)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;
    }
    Ok(id)
}

/// Write the new status and the columns that go with it
pub async fn set_status(
    conn: &mut SqliteConnection,
    id: i64,
    status: AssetRequestStatus,
    approved_by: Option<i64>,
    rejection_reason: Option<&str>,
) -> RepoResult<()> {
    let now = now_millis();
    let issued_at = (status == AssetRequestStatus::Issued).then_some(now);
    let returned_at = (status == AssetRequestStatus::Returned).then_some(now);
    sqlx::query(
        "UPDATE asset_request SET status = ?1, approved_by = COALESCE(?2, approved_by), \
         rejection_reason = COALESCE(?3, rejection_reason), issued_at = COALESCE(?4, issued_at), \
         returned_at = COALESCE(?5, returned_at), updated_at = ?6 WHERE id = ?7",
    )
    .bind(status)
    .bind(approved_by)
    .bind(rejection_reason)
    .bind(issued_at)
    .bind(returned_at)
    .bind(now)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM asset_request WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}
