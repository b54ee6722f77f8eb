//! Client Repository

use super::{RepoError, RepoResult};
use shared::ErrorCode;
use shared::models::{Client, ClientCreate, ClientUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, company, email, phone, address, notes, created_at, updated_at";

fn not_found(id: i64) -> RepoError {
    RepoError::rule(ErrorCode::ClientNotFound, format!("Client {id} not found"))
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Client>> {
    let clients = sqlx::query_as::<_, Client>(&format!("SELECT {COLUMNS} FROM client ORDER BY name"))
        .fetch_all(pool)
        .await?;
    Ok(clients)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Client>> {
    let client = sqlx::query_as::<_, Client>(&format!("SELECT {COLUMNS} FROM client WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(client)
}

pub async fn create(pool: &SqlitePool, data: ClientCreate) -> RepoResult<Client> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO client (id, name, company, email, phone, address, notes, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(data.company)
    .bind(data.email)
    .bind(data.phone)
    .bind(data.address)
    .bind(data.notes)
    .bind(now_millis())
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create client".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ClientUpdate) -> RepoResult<Client> {
    let rows = sqlx::query(
        "UPDATE client SET name = COALESCE(?1, name), company = COALESCE(?2, company), \
         email = COALESCE(?3, email), phone = COALESCE(?4, phone), address = COALESCE(?5, address), \
         notes = COALESCE(?6, notes), updated_at = ?7 WHERE id = ?8",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.company)
    .bind(data.email)
    .bind(data.phone)
    .bind(data.address)
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

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM client WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(not_found(id));
    }
    Ok(true)
}
