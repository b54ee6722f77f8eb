//! Asset Repository

use super::{RepoError, RepoResult};
use shared::ErrorCode;
use shared::models::{Asset, AssetCondition, AssetCreate, AssetUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const COLUMNS: &str = "id, name, asset_code, category, location, condition, quantity_total, \
                       quantity_available, image_url, notes, created_at, updated_at";

pub(crate) fn not_found(id: i64) -> RepoError {
    RepoError::rule(ErrorCode::AssetNotFound, format!("Asset {id} not found"))
}

fn code_taken(err: RepoError) -> RepoError {
    err.duplicate_as(ErrorCode::AssetCodeExists, "Asset code already exists")
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Asset>> {
    let assets = sqlx::query_as::<_, Asset>(&format!("SELECT {COLUMNS} FROM asset ORDER BY name"))
        .fetch_all(pool)
        .await?;
    Ok(assets)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Asset>> {
    let mut conn = pool.acquire().await?;
    find_by_id_in(&mut conn, id).await
}

pub async fn find_by_id_in(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<Asset>> {
    let asset = sqlx::query_as::<_, Asset>(&format!("SELECT {COLUMNS} FROM asset WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(asset)
}

/// `quantity_available` starts equal to `quantity_total`
pub async fn create(pool: &SqlitePool, data: AssetCreate) -> RepoResult<Asset> {
    let id = snowflake_id();
    let total = data.quantity_total.unwrap_or(1);
    sqlx::query(
        "INSERT INTO asset (id, name, asset_code, category, location, condition, quantity_total, \
         quantity_available, image_url, notes, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?8, ?9, ?10, ?10)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(data.asset_code.trim())
    .bind(data.category)
    .bind(data.location)
    .bind(data.condition.unwrap_or(AssetCondition::Good))
    .bind(total)
    .bind(data.image_url)
    .bind(data.notes)
    .bind(now_millis())
    .execute(pool)
    .await
    .map_err(|e| code_taken(e.into()))?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create asset".into()))
}

/// A new `quantity_total` shifts `quantity_available` by the same delta
pub async fn update(pool: &SqlitePool, id: i64, data: AssetUpdate) -> RepoResult<Asset> {
    let mut tx = pool.begin().await?;
    let current = find_by_id_in(&mut tx, id).await?.ok_or_else(|| not_found(id))?;

    let (total, available) = match data.quantity_total {
        Some(total) => {
            let available = current.quantity_available + (total - current.quantity_total);
            if available < 0 {
                return Err(RepoError::rule(
                    ErrorCode::AssetInUse,
                    format!(
                        "{} units of {} are out on request, total cannot drop to {}",
                        current.quantity_total - current.quantity_available,
                        current.name,
                        total
                    ),
                ));
            }
            (total, available)
        }
        None => (current.quantity_total, current.quantity_available),
    };

    sqlx::query(
        "UPDATE asset SET name = COALESCE(?1, name), asset_code = COALESCE(?2, asset_code), \
         category = COALESCE(?3, category), location = COALESCE(?4, location), \
         condition = COALESCE(?5, condition), quantity_total = ?6, quantity_available = ?7, \
         image_url = COALESCE(?8, image_url), notes = COALESCE(?9, notes), updated_at = ?10 WHERE id = ?11",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.asset_code.as_deref().map(str::trim))
    .bind(data.category)
    .bind(data.location)
    .bind(data.condition)
    .bind(total)
    .bind(available)
    .bind(data.image_url)
    .bind(data.notes)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| code_taken(e.into()))?;

    let asset = find_by_id_in(&mut tx, id).await?.ok_or_else(|| not_found(id))?;
    tx.commit().await?;
    Ok(asset)
}

/// Move `delta` units in (+) or out (−) of availability
pub async fn shift_available(
    conn: &mut SqliteConnection,
    id: i64,
    delta: i64,
) -> RepoResult<Asset> {
    let asset = find_by_id_in(conn, id).await?.ok_or_else(|| not_found(id))?;
    let available = asset.quantity_available + delta;
    if available < 0 {
        return Err(RepoError::rule(
            ErrorCode::AssetUnavailable,
            format!(
                "Only {} unit(s) of {} available, {} requested",
                asset.quantity_available, asset.name, -delta
            ),
        ));
    }
    if available > asset.quantity_total {
        return Err(RepoError::Validation(format!(
            "Returning more units of {} than were issued",
            asset.name
        )));
    }
    sqlx::query("UPDATE asset SET quantity_available = ?, updated_at = ? WHERE id = ?")
        .bind(available)
        .bind(now_millis())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    find_by_id_in(conn, id).await?.ok_or_else(|| not_found(id))
}

/// Delete, refused while units are out on request
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let asset = find_by_id(pool, id).await?.ok_or_else(|| not_found(id))?;
    if asset.quantity_available < asset.quantity_total {
        return Err(RepoError::rule(
            ErrorCode::AssetInUse,
            format!(
                "{} unit(s) of {} are out on request",
                asset.quantity_total - asset.quantity_available,
                asset.name
            ),
        ));
    }
    sqlx::query("DELETE FROM asset WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(true)
}
