//! Job Repository

use super::{RepoError, RepoResult};
use shared::ErrorCode;
use shared::models::{EmploymentType, Job, JobCreate, JobStatus, JobUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, title, department, description, location, employment_type, status, \
                       openings, closing_date, created_at, updated_at";

fn not_found(id: i64) -> RepoError {
    RepoError::rule(ErrorCode::JobNotFound, format!("Job {id} not found"))
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Job>> {
    let jobs = sqlx::query_as::<_, Job>(&format!(
        "SELECT {COLUMNS} FROM job ORDER BY status DESC, created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(jobs)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Job>> {
    let mut conn = pool.acquire().await?;
    find_by_id_in(&mut conn, id).await
}

pub async fn find_by_id_in(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Job>> {
    let job = sqlx::query_as::<_, Job>(&format!("SELECT {COLUMNS} FROM job WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(job)
}

pub async fn create(pool: &SqlitePool, data: JobCreate) -> RepoResult<Job> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO job (id, title, department, description, location, employment_type, status, \
         openings, closing_date, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'OPEN', ?7, ?8, ?9, ?9)",
    )
    .bind(id)
    .bind(data.title.trim())
    .bind(data.department)
    .bind(data.description)
    .bind(data.location)
    .bind(data.employment_type.unwrap_or(EmploymentType::FullTime))
    .bind(data.openings.unwrap_or(1))
    .bind(data.closing_date)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create job".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: JobUpdate) -> RepoResult<Job> {
    let rows = sqlx::query(
        "UPDATE job SET title = COALESCE(?1, title), department = COALESCE(?2, department), \
         description = COALESCE(?3, description), location = COALESCE(?4, location), \
         employment_type = COALESCE(?5, employment_type), status = COALESCE(?6, status), \
         openings = COALESCE(?7, openings), closing_date = COALESCE(?8, closing_date), \
         updated_at = ?9 WHERE id = ?10",
    )
    .bind(data.title.as_deref().map(str::trim))
    .bind(data.department)
    .bind(data.description)
    .bind(data.location)
    .bind(data.employment_type)
    .bind(data.status)
    .bind(data.openings)
    .bind(data.closing_date)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    find_by_id(pool, id).await?.ok_or_else(|| not_found(id))
}

pub async fn set_status(conn: &mut SqliteConnection, id: i64, status: JobStatus) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE job SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now_millis())
        .bind(id)
        .execute(conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(())
}

pub async fn close(pool: &SqlitePool, id: i64) -> RepoResult<Job> {
    let mut conn = pool.acquire().await?;
    set_status(&mut conn, id, JobStatus::Closed).await?;
    find_by_id_in(&mut conn, id).await?.ok_or_else(|| not_found(id))
}

/// Delete a job without applicants
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let applicants = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM applicant WHERE job_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if applicants > 0 {
        return Err(RepoError::rule(
            ErrorCode::JobHasApplicants,
            format!("Job {id} has {applicants} applicant(s)"),
        ));
    }
    let rows = sqlx::query("DELETE FROM job WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(true)
}
