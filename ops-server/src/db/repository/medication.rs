//! Medication (treatment record) Repository

use super::{RepoError, RepoResult};
use shared::ErrorCode;
use shared::models::{Medication, MedicationQuery};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, medicine_id, cage_id, pool_id, dosage, administered_at, administered_by, \
                       reason, created_at";

pub(crate) fn not_found(id: i64) -> RepoError {
    RepoError::rule(ErrorCode::MedicationNotFound, format!("Medication {id} not found"))
}

/// Validated row ready for insert
#[derive(Debug, Clone)]
pub struct NewMedication<'a> {
    pub medicine_id: i64,
    pub cage_id: Option<i64>,
    pub pool_id: Option<i64>,
    pub dosage: f64,
    pub administered_at: i64,
    pub administered_by: Option<i64>,
    pub reason: Option<&'a str>,
}

pub async fn find_all(pool: &SqlitePool, query: &MedicationQuery) -> RepoResult<Vec<Medication>> {
    let medications = sqlx::query_as::<_, Medication>(&format!(
        "SELECT {COLUMNS} FROM medication \
         WHERE (?1 IS NULL OR cage_id = ?1) AND (?2 IS NULL OR pool_id = ?2) AND (?3 IS NULL OR medicine_id = ?3) \
         ORDER BY administered_at DESC"
    ))
    .bind(query.cage_id)
    .bind(query.pool_id)
    .bind(query.medicine_id)
    .fetch_all(pool)
    .await?;
    Ok(medications)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Medication>> {
    let medication =
        sqlx::query_as::<_, Medication>(&format!("SELECT {COLUMNS} FROM medication WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(medication)
}

pub async fn insert(conn: &mut SqliteConnection, data: &NewMedication<'_>) -> RepoResult<Medication> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO medication (id, medicine_id, cage_id, pool_id, dosage, administered_at, administered_by, \
         reason, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.medicine_id)
    .bind(data.cage_id)
    .bind(data.pool_id)
    .bind(data.dosage)
    .bind(data.administered_at)
    .bind(data.administered_by)
    .bind(data.reason)
    .bind(now_millis())
    .execute(&mut *conn)
    .await?;
    let medication =
        sqlx::query_as::<_, Medication>(&format!("SELECT {COLUMNS} FROM medication WHERE id = ?"))
            .bind(id)
            .fetch_one(conn)
            .await?;
    Ok(medication)
}

/// Removes the record only, the dose is not restored
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM medication WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(true)
}
