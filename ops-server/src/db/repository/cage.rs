//! Cage Repository

use super::{RepoError, RepoResult};
use shared::ErrorCode;
use shared::models::{Cage, CageCreate, CageStatus, CageUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, code, location, species, capacity, current_stock, status, stocked_at, \
                       notes, created_at, updated_at";

pub(crate) fn not_found(id: i64) -> RepoError {
    RepoError::rule(ErrorCode::CageNotFound, format!("Cage {id} not found"))
}

fn code_taken(err: RepoError) -> RepoError {
    err.duplicate_as(ErrorCode::CageCodeExists, "Cage code already exists")
}

fn over_capacity(stock: i64, capacity: i64) -> RepoError {
    RepoError::rule(
        ErrorCode::CageOverCapacity,
        format!("Stock {stock} exceeds cage capacity {capacity}"),
    )
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Cage>> {
    let cages = sqlx::query_as::<_, Cage>(&format!("SELECT {COLUMNS} FROM cage ORDER BY code"))
        .fetch_all(pool)
        .await?;
    Ok(cages)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Cage>> {
    let mut conn = pool.acquire().await?;
    find_by_id_in(&mut conn, id).await
}

pub async fn find_by_id_in(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Cage>> {
    let cage = sqlx::query_as::<_, Cage>(&format!("SELECT {COLUMNS} FROM cage WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(cage)
}

pub async fn create(pool: &SqlitePool, data: CageCreate) -> RepoResult<Cage> {
    let capacity = data.capacity.unwrap_or(0);
    let stock = data.current_stock.unwrap_or(0);
    if capacity > 0 && stock > capacity {
        return Err(over_capacity(stock, capacity));
    }
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO cage (id, code, location, species, capacity, current_stock, status, stocked_at, notes, \
         created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
    )
    .bind(id)
    .bind(data.code.trim())
    .bind(data.location)
    .bind(data.species)
    .bind(capacity)
    .bind(stock)
    .bind(data.status.unwrap_or(CageStatus::Active))
    .bind(data.stocked_at)
    .bind(data.notes)
    .bind(now_millis())
    .execute(pool)
    .await
    .map_err(|e| code_taken(e.into()))?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create cage".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CageUpdate) -> RepoResult<Cage> {
    let mut tx = pool.begin().await?;
    let current = find_by_id_in(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    let capacity = data.capacity.unwrap_or(current.capacity);
    let stock = data.current_stock.unwrap_or(current.current_stock);
    if capacity > 0 && stock > capacity {
        return Err(over_capacity(stock, capacity));
    }

    sqlx::query(
        "UPDATE cage SET code = COALESCE(?1, code), location = COALESCE(?2, location), \
         species = COALESCE(?3, species), capacity = ?4, current_stock = ?5, status = COALESCE(?6, status), \
         stocked_at = COALESCE(?7, stocked_at), notes = COALESCE(?8, notes), updated_at = ?9 WHERE id = ?10",
    )
    .bind(data.code.as_deref().map(str::trim))
    .bind(data.location)
    .bind(data.species)
    .bind(capacity)
    .bind(stock)
    .bind(data.status)
    .bind(data.stocked_at)
    .bind(data.notes)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| code_taken(e.into()))?;

    let cage = find_by_id_in(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    tx.commit().await?;
    Ok(cage)
}

/// Stock `count` fish into an active cage with room (fry transfer)
pub async fn add_stock(conn: &mut SqliteConnection, id: i64, count: i64) -> RepoResult<Cage> {
    let cage = find_by_id_in(conn, id).await?.ok_or_else(|| not_found(id))?;
    if cage.status != CageStatus::Active {
        return Err(RepoError::rule(
            ErrorCode::CageNotActive,
            format!("Cage {} is not active", cage.code),
        ));
    }
    if !cage.has_room_for(count) {
        return Err(over_capacity(cage.current_stock.saturating_add(count), cage.capacity));
    }
    let now = now_millis();
    sqlx::query(
        "UPDATE cage SET current_stock = current_stock + ?1, \
         stocked_at = COALESCE(stocked_at, date(?2 / 1000, 'unixepoch')), updated_at = ?2 WHERE id = ?3",
    )
    .bind(count)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    find_by_id_in(conn, id).await?.ok_or_else(|| not_found(id))
}

/// Delete, refused while fish are stocked
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let cage = find_by_id(pool, id).await?.ok_or_else(|| not_found(id))?;
    if cage.current_stock > 0 {
        return Err(RepoError::rule(
            ErrorCode::CageHasStock,
            format!("Cage {} still holds {} fish", cage.code, cage.current_stock),
        ));
    }
    sqlx::query("DELETE FROM cage WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(true)
}
