//! Medicine Repository

use super::{RepoError, RepoResult};
use crate::utils::quantity;
use shared::ErrorCode;
use shared::models::{Medicine, MedicineCreate, MedicineUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str =
    "id, name, unit, quantity, expiry_date, supplier, notes, created_at, updated_at";

pub(crate) fn not_found(id: i64) -> RepoError {
    RepoError::rule(ErrorCode::MedicineNotFound, format!("Medicine {id} not found"))
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Medicine>> {
    let medicines =
        sqlx::query_as::<_, Medicine>(&format!("SELECT {COLUMNS} FROM medicine ORDER BY name"))
            .fetch_all(pool)
            .await?;
    Ok(medicines)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Medicine>> {
    let mut conn = pool.acquire().await?;
    find_by_id_in(&mut conn, id).await
}

pub async fn find_by_id_in(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Medicine>> {
    let medicine =
        sqlx::query_as::<_, Medicine>(&format!("SELECT {COLUMNS} FROM medicine WHERE id = ?"))
            .bind(id)
            .fetch_optional(conn)
            .await?;
    Ok(medicine)
}

/// Medicines with an expiry date on or before `until` (YYYY-MM-DD), soonest first
pub async fn find_expiring(pool: &SqlitePool, until: &str) -> RepoResult<Vec<Medicine>> {
    let medicines = sqlx::query_as::<_, Medicine>(&format!(
        "SELECT {COLUMNS} FROM medicine WHERE expiry_date IS NOT NULL AND expiry_date <= ? \
         ORDER BY expiry_date, name"
    ))
    .bind(until)
    .fetch_all(pool)
    .await?;
    Ok(medicines)
}

pub async fn create(pool: &SqlitePool, data: MedicineCreate) -> RepoResult<Medicine> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO medicine (id, name, unit, quantity, expiry_date, supplier, notes, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(data.unit.unwrap_or_else(|| "g".to_string()))
    .bind(quantity::to_f64(quantity::to_decimal(data.quantity.unwrap_or(0.0))))
    .bind(data.expiry_date)
    .bind(data.supplier)
    .bind(data.notes)
    .bind(now_millis())
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create medicine".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: MedicineUpdate) -> RepoResult<Medicine> {
    let rows = sqlx::query(
        "UPDATE medicine SET name = COALESCE(?1, name), unit = COALESCE(?2, unit), \
         quantity = COALESCE(?3, quantity), expiry_date = COALESCE(?4, expiry_date), \
         supplier = COALESCE(?5, supplier), notes = COALESCE(?6, notes), updated_at = ?7 WHERE id = ?8",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.unit)
    .bind(data.quantity.map(|q| quantity::to_f64(quantity::to_decimal(q))))
    .bind(data.expiry_date)
    .bind(data.supplier)
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

/// Deduct a dose; insufficient quantity is refused
pub async fn deduct(conn: &mut SqliteConnection, id: i64, amount: f64) -> RepoResult<Medicine> {
    let medicine = find_by_id_in(conn, id).await?.ok_or_else(|| not_found(id))?;
    if !quantity::gte(medicine.quantity, amount) {
        return Err(RepoError::rule(
            ErrorCode::MedicineInsufficient,
            format!(
                "Insufficient {}: {} {} left, {} needed",
                medicine.name, medicine.quantity, medicine.unit, amount
            ),
        ));
    }
    sqlx::query("UPDATE medicine SET quantity = ?, updated_at = ? WHERE id = ?")
        .bind(quantity::sub(medicine.quantity, amount))
        .bind(now_millis())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    find_by_id_in(conn, id).await?.ok_or_else(|| not_found(id))
}

/// Delete, refused while treatment records reference the medicine
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let used = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM medication WHERE medicine_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if used > 0 {
        return Err(RepoError::rule(
            ErrorCode::MedicineInUse,
            format!("Medicine {id} is referenced by {used} treatment record(s)"),
        ));
    }
    let rows = sqlx::query("DELETE FROM medicine WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(true)
}
