//! Hatchery Repository: parent fish pools and grown-egg ponds

use super::{RepoError, RepoResult};
use shared::ErrorCode;
use shared::models::{
    GrownEggPond, GrownEggPondCreate, GrownEggPondUpdate, ParentFishPool, ParentFishPoolCreate,
    ParentFishPoolUpdate, PondStage, PoolStatus,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const POOL_COLUMNS: &str = "id, name, species, male_count, female_count, water_temperature, status, \
                            notes, created_at, updated_at";

const POND_COLUMNS: &str = "id, name, parent_pool_id, egg_count, hatched_count, spawned_at, stage, \
                            transferred_to, transferred_count, notes, created_at, updated_at";

pub(crate) fn pool_not_found(id: i64) -> RepoError {
    RepoError::rule(ErrorCode::PoolNotFound, format!("Parent fish pool {id} not found"))
}

pub(crate) fn pond_not_found(id: i64) -> RepoError {
    RepoError::rule(ErrorCode::PondNotFound, format!("Grown-egg pond {id} not found"))
}

fn pool_name_taken(err: RepoError) -> RepoError {
    err.duplicate_as(ErrorCode::PoolNameExists, "Parent fish pool name already exists")
}

fn check_counts(egg_count: i64, hatched_count: i64) -> RepoResult<()> {
    if hatched_count > egg_count {
        return Err(RepoError::Validation(format!(
            "hatched_count ({hatched_count}) cannot exceed egg_count ({egg_count})"
        )));
    }
    Ok(())
}

// ==================== Parent fish pools ====================

pub async fn find_all_pools(pool: &SqlitePool) -> RepoResult<Vec<ParentFishPool>> {
    let pools = sqlx::query_as::<_, ParentFishPool>(&format!(
        "SELECT {POOL_COLUMNS} FROM parent_fish_pool ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(pools)
}

pub async fn find_pool(pool: &SqlitePool, id: i64) -> RepoResult<Option<ParentFishPool>> {
    let found = sqlx::query_as::<_, ParentFishPool>(&format!(
        "SELECT {POOL_COLUMNS} FROM parent_fish_pool WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(found)
}

pub async fn pool_exists(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM parent_fish_pool WHERE id = ?")
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

pub async fn create_pool(pool: &SqlitePool, data: ParentFishPoolCreate) -> RepoResult<ParentFishPool> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO parent_fish_pool (id, name, species, male_count, female_count, water_temperature, status, \
         notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(data.species)
    .bind(data.male_count.unwrap_or(0))
    .bind(data.female_count.unwrap_or(0))
    .bind(data.water_temperature)
    .bind(data.status.unwrap_or(PoolStatus::Active))
    .bind(data.notes)
    .bind(now_millis())
    .execute(pool)
    .await
    .map_err(|e| pool_name_taken(e.into()))?;
    find_pool(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create parent fish pool".into()))
}

pub async fn update_pool(
    pool: &SqlitePool,
    id: i64,
    data: ParentFishPoolUpdate,
) -> RepoResult<ParentFishPool> {
    let rows = sqlx::query(
        "UPDATE parent_fish_pool SET name = COALESCE(?1, name), species = COALESCE(?2, species), \
         male_count = COALESCE(?3, male_count), female_count = COALESCE(?4, female_count), \
         water_temperature = COALESCE(?5, water_temperature), status = COALESCE(?6, status), \
         notes = COALESCE(?7, notes), updated_at = ?8 WHERE id = ?9",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.species)
    .bind(data.male_count)
    .bind(data.female_count)
    .bind(data.water_temperature)
    .bind(data.status)
    .bind(data.notes)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| pool_name_taken(e.into()))?;
    if rows.rows_affected() == 0 {
        return Err(pool_not_found(id));
    }
    find_pool(pool, id).await?.ok_or_else(|| pool_not_found(id))
}

/// Delete, refused while grown-egg ponds reference the pool
pub async fn delete_pool(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let ponds = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM grown_egg_pond WHERE parent_pool_id = ?",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    if ponds > 0 {
        return Err(RepoError::rule(
            ErrorCode::PoolInUse,
            format!("Parent fish pool {id} is referenced by {ponds} grown-egg pond(s)"),
        ));
    }
    let rows = sqlx::query("DELETE FROM parent_fish_pool WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(pool_not_found(id));
    }
    Ok(true)
}

// ==================== Grown-egg ponds ====================

pub async fn find_all_ponds(pool: &SqlitePool) -> RepoResult<Vec<GrownEggPond>> {
    let ponds = sqlx::query_as::<_, GrownEggPond>(&format!(
        "SELECT {POND_COLUMNS} FROM grown_egg_pond ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(ponds)
}

pub async fn find_pond(pool: &SqlitePool, id: i64) -> RepoResult<Option<GrownEggPond>> {
    let mut conn = pool.acquire().await?;
    find_pond_in(&mut conn, id).await
}

pub async fn find_pond_in(conn: &mut SqliteConnection, id: i64) -> RepoResult<Option<GrownEggPond>> {
    let pond = sqlx::query_as::<_, GrownEggPond>(&format!(
        "SELECT {POND_COLUMNS} FROM grown_egg_pond WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(pond)
}

pub async fn create_pond(pool: &SqlitePool, data: GrownEggPondCreate) -> RepoResult<GrownEggPond> {
    let egg_count = data.egg_count.unwrap_or(0);
    let hatched_count = data.hatched_count.unwrap_or(0);
    check_counts(egg_count, hatched_count)?;
    if data.stage == Some(PondStage::Transferred) {
        return Err(RepoError::rule(
            ErrorCode::PondInvalidStage,
            "A pond reaches TRANSFERRED only through a fry transfer",
        ));
    }

    let mut conn = pool.acquire().await?;
    if let Some(parent) = data.parent_pool_id {
        if !pool_exists(&mut conn, parent).await? {
            return Err(pool_not_found(parent));
        }
    }

    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO grown_egg_pond (id, name, parent_pool_id, egg_count, hatched_count, spawned_at, stage, \
         transferred_count, notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?9, ?9)",
    )
    .bind(id)
    .bind(data.name.trim())
    .bind(data.parent_pool_id)
    .bind(egg_count)
    .bind(hatched_count)
    .bind(data.spawned_at)
    .bind(data.stage.unwrap_or(PondStage::Incubating))
    .bind(data.notes)
    .bind(now_millis())
    .execute(&mut *conn)
    .await?;
    find_pond_in(&mut conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create grown-egg pond".into()))
}

pub async fn update_pond(
    pool: &SqlitePool,
    id: i64,
    data: GrownEggPondUpdate,
) -> RepoResult<GrownEggPond> {
    let mut tx = pool.begin().await?;
    let current = find_pond_in(&mut tx, id).await?.ok_or_else(|| pond_not_found(id))?;

    if current.stage == PondStage::Transferred {
        return Err(RepoError::rule(
            ErrorCode::PondInvalidStage,
            format!("Pond {} has already been transferred", current.name),
        ));
    }
    if data.stage == Some(PondStage::Transferred) {
        return Err(RepoError::rule(
            ErrorCode::PondInvalidStage,
            "Use the transfer action to move fry out of a pond",
        ));
    }
    check_counts(
        data.egg_count.unwrap_or(current.egg_count),
        data.hatched_count.unwrap_or(current.hatched_count),
    )?;
    if let Some(parent) = data.parent_pool_id {
        if !pool_exists(&mut tx, parent).await? {
            return Err(pool_not_found(parent));
        }
    }

    sqlx::query(
        "UPDATE grown_egg_pond SET name = COALESCE(?1, name), parent_pool_id = COALESCE(?2, parent_pool_id), \
         egg_count = COALESCE(?3, egg_count), hatched_count = COALESCE(?4, hatched_count), \
         spawned_at = COALESCE(?5, spawned_at), stage = COALESCE(?6, stage), notes = COALESCE(?7, notes), \
         updated_at = ?8 WHERE id = ?9",
    )
    .bind(data.name.as_deref().map(str::trim))
    .bind(data.parent_pool_id)
    .bind(data.egg_count)
    .bind(data.hatched_count)
    .bind(data.spawned_at)
    .bind(data.stage)
    .bind(data.notes)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    let pond = find_pond_in(&mut tx, id).await?.ok_or_else(|| pond_not_found(id))?;
    tx.commit().await?;
    Ok(pond)
}

/// Mark the pond transferred after its fry went into `cage_id`
pub async fn mark_transferred(
    conn: &mut SqliteConnection,
    id: i64,
    cage_id: i64,
    count: i64,
) -> RepoResult<GrownEggPond> {
    sqlx::query(
        "UPDATE grown_egg_pond SET stage = 'TRANSFERRED', transferred_to = ?1, transferred_count = ?2, \
         updated_at = ?3 WHERE id = ?4",
    )
    .bind(cage_id)
    .bind(count)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *conn)
    .await?;
    find_pond_in(conn, id).await?.ok_or_else(|| pond_not_found(id))
}

pub async fn delete_pond(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM grown_egg_pond WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(pond_not_found(id));
    }
    Ok(true)
}
