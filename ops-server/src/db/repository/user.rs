//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{Role, User};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const COLUMNS: &str =
    "id, username, display_name, hash_pass, role, employee_id, is_active, created_at, updated_at";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM app_user ORDER BY username"
    ))
    .fetch_all(pool)
    .await?;
    Ok(users)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM app_user WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM app_user WHERE username = ? LIMIT 1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM app_user")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Active admins other than `exclude_id`
pub async fn count_other_active_admins(pool: &SqlitePool, exclude_id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM app_user WHERE role = 'ADMIN' AND is_active = 1 AND id != ?",
    )
    .bind(exclude_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Insert a user with an already hashed password
pub async fn create(
    pool: &SqlitePool,
    username: &str,
    display_name: &str,
    hash_pass: &str,
    role: Role,
    employee_id: Option<i64>,
) -> RepoResult<User> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO app_user (id, username, display_name, hash_pass, role, employee_id, is_active, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)",
    )
    .bind(id)
    .bind(username)
    .bind(display_name)
    .bind(hash_pass)
    .bind(role)
    .bind(employee_id)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Partial update, `hash_pass` is the new hash when the password changes
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    display_name: Option<&str>,
    hash_pass: Option<&str>,
    role: Option<Role>,
    employee_id: Option<i64>,
    is_active: Option<bool>,
) -> RepoResult<User> {
    let rows = sqlx::query(
        "UPDATE app_user SET display_name = COALESCE(?1, display_name), hash_pass = COALESCE(?2, hash_pass), \
         role = COALESCE(?3, role), employee_id = COALESCE(?4, employee_id), is_active = COALESCE(?5, is_active), \
         updated_at = ?6 WHERE id = ?7",
    )
    .bind(display_name)
    .bind(hash_pass)
    .bind(role)
    .bind(employee_id)
    .bind(is_active)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM app_user WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
