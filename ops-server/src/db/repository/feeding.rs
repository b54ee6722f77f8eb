//! Feeding Repository

use super::{RepoError, RepoResult};
use shared::ErrorCode;
use shared::models::{Feeding, FeedingQuery, FeedingSummary, FeedingUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str =
    "id, cage_id, feed_type, quantity_kg, fed_at, fed_by, stock_in_id, notes, created_at, updated_at";

pub(crate) fn not_found(id: i64) -> RepoError {
    RepoError::rule(ErrorCode::FeedingNotFound, format!("Feeding {id} not found"))
}

/// Validated row ready for insert
#[derive(Debug, Clone)]
pub struct NewFeeding<'a> {
    pub cage_id: i64,
    pub feed_type: &'a str,
    pub quantity_kg: f64,
    pub fed_at: i64,
    pub fed_by: Option<i64>,
    pub stock_in_id: Option<i64>,
    pub notes: Option<&'a str>,
}

pub async fn find_all(pool: &SqlitePool, query: &FeedingQuery) -> RepoResult<Vec<Feeding>> {
    let feedings = sqlx::query_as::<_, Feeding>(&format!(
        "SELECT {COLUMNS} FROM feeding \
         WHERE (?1 IS NULL OR cage_id = ?1) AND (?2 IS NULL OR fed_at >= ?2) AND (?3 IS NULL OR fed_at <= ?3) \
         ORDER BY fed_at DESC"
    ))
    .bind(query.cage_id)
    .bind(query.from)
    .bind(query.to)
    .fetch_all(pool)
    .await?;
    Ok(feedings)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Feeding>> {
    let mut conn = pool.acquire().await?;
    find_by_id_in(&mut conn, id).await
}

pub async fn find_by_id_in(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Feeding>> {
    let feeding = sqlx::query_as::<_, Feeding>(&format!("SELECT {COLUMNS} FROM feeding WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(feeding)
}

pub async fn insert(conn: &mut SqliteConnection, data: &NewFeeding<'_>) -> RepoResult<Feeding> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO feeding (id, cage_id, feed_type, quantity_kg, fed_at, fed_by, stock_in_id, notes, \
         created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
    )
    .bind(id)
    .bind(data.cage_id)
    .bind(data.feed_type)
    .bind(data.quantity_kg)
    .bind(data.fed_at)
    .bind(data.fed_by)
    .bind(data.stock_in_id)
    .bind(data.notes)
    .bind(now_millis())
    .execute(&mut *conn)
    .await?;
    find_by_id_in(conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create feeding".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: FeedingUpdate) -> RepoResult<Feeding> {
    let rows = sqlx::query(
        "UPDATE feeding SET feed_type = COALESCE(?1, feed_type), fed_at = COALESCE(?2, fed_at), \
         fed_by = COALESCE(?3, fed_by), notes = COALESCE(?4, notes), updated_at = ?5 WHERE id = ?6",
    )
    .bind(data.feed_type.as_deref().map(str::trim))
    .bind(data.fed_at)
    .bind(data.fed_by)
    .bind(data.notes)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

/// Total kg and number of feedings, optionally for one cage
pub async fn summary(pool: &SqlitePool, cage_id: Option<i64>) -> RepoResult<FeedingSummary> {
    let summary = sqlx::query_as::<_, FeedingSummary>(
        "SELECT ?1 AS cage_id, CAST(COALESCE(SUM(quantity_kg), 0) AS REAL) AS total_kg, COUNT(*) AS count \
         FROM feeding WHERE (?1 IS NULL OR cage_id = ?1)",
    )
    .bind(cage_id)
    .fetch_one(pool)
    .await?;
    Ok(summary)
}

/// Removes the record only
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM feeding WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(true)
}
