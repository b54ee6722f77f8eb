//! Applicant Repository

use super::{RepoError, RepoResult};
use shared::ErrorCode;
use shared::models::{Applicant, ApplicantCreate, ApplicantQuery, ApplicantStage, ApplicantUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, job_id, full_name, email, phone, resume_url, stage, notes, employee_id, \
                       created_at, updated_at";

fn not_found(id: i64) -> RepoError {
    RepoError::rule(ErrorCode::ApplicantNotFound, format!("Applicant {id} not found"))
}

fn already_applied(err: RepoError) -> RepoError {
    err.duplicate_as(
        ErrorCode::ApplicantDuplicate,
        "Applicant already applied for this job",
    )
}

pub async fn find_all(pool: &SqlitePool, query: &ApplicantQuery) -> RepoResult<Vec<Applicant>> {
    let applicants = sqlx::query_as::<_, Applicant>(&format!(
        "SELECT {COLUMNS} FROM applicant \
         WHERE (?1 IS NULL OR job_id = ?1) AND (?2 IS NULL OR stage = ?2) \
         ORDER BY created_at DESC"
    ))
    .bind(query.job_id)
    .bind(query.stage)
    .fetch_all(pool)
    .await?;
    Ok(applicants)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Applicant>> {
    let mut conn = pool.acquire().await?;
    find_by_id_in(&mut conn, id).await
}

pub async fn find_by_id_in(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Applicant>> {
    let applicant =
        sqlx::query_as::<_, Applicant>(&format!("SELECT {COLUMNS} FROM applicant WHERE id = ?"))
            .bind(id)
            .fetch_optional(conn)
            .await?;
    Ok(applicant)
}

/// Insert with stage APPLIED; the caller has checked the job is open
pub async fn create(pool: &SqlitePool, data: ApplicantCreate) -> RepoResult<Applicant> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO applicant (id, job_id, full_name, email, phone, resume_url, stage, notes, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'APPLIED', ?7, ?8, ?8)",
    )
    .bind(id)
    .bind(data.job_id)
    .bind(data.full_name.trim())
    .bind(data.email.trim())
    .bind(data.phone)
    .bind(data.resume_url)
    .bind(data.notes)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| already_applied(e.into()))?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create applicant".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ApplicantUpdate) -> RepoResult<Applicant> {
    let rows = sqlx::query(
        "UPDATE applicant SET full_name = COALESCE(?1, full_name), email = COALESCE(?2, email), \
         phone = COALESCE(?3, phone), resume_url = COALESCE(?4, resume_url), notes = COALESCE(?5, notes), \
         updated_at = ?6 WHERE id = ?7",
    )
    .bind(data.full_name.as_deref().map(str::trim))
    .bind(data.email.as_deref().map(str::trim))
    .bind(data.phone)
    .bind(data.resume_url)
    .bind(data.notes)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| already_applied(e.into()))?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

/// Set the stage (and the hired employee) inside the stage-change transaction.
/// A non-empty `note` is appended to the applicant's notes.
pub async fn set_stage(
    conn: &mut SqliteConnection,
    id: i64,
    stage: ApplicantStage,
    employee_id: Option<i64>,
    note: Option<&str>,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE applicant SET stage = ?1, employee_id = COALESCE(?2, employee_id), \
         notes = CASE WHEN ?3 IS NULL THEN notes \
                      WHEN notes IS NULL OR notes = '' THEN ?3 \
                      ELSE notes || char(10) || ?3 END, \
         updated_at = ?4 WHERE id = ?5",
    )
    .bind(stage)
    .bind(employee_id)
    .bind(note)
    .bind(now_millis())
    .bind(id)
    .execute(conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

pub async fn count_hired(conn: &mut SqliteConnection, job_id: i64) -> RepoResult<i64> {
    let hired = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM applicant WHERE job_id = ? AND stage = 'HIRED'",
    )
    .bind(job_id)
    .fetch_one(conn)
    .await?;
    Ok(hired)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM applicant WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(true)
}
