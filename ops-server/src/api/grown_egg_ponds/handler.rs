//! Grown-egg Pond API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use sqlx::SqlitePool;

use crate::core::ServerState;
use crate::db::repository::{begin, cage, commit, pond};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_non_negative_count, validate_optional_date,
    validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::ErrorCode;
use shared::error::OpResponse;
use shared::models::{
    Cage, FryTransfer, GrownEggPond, GrownEggPondCreate, GrownEggPondUpdate, PondStage,
};

const RESOURCE: &str = "grown_egg_pond";
const CAGE_RESOURCE: &str = "cage";

fn validate_fields(
    egg_count: Option<i64>,
    hatched_count: Option<i64>,
    spawned_at: &Option<String>,
    notes: &Option<String>,
) -> AppResult<()> {
    if let Some(count) = egg_count {
        validate_non_negative_count(count, "egg_count")?;
    }
    if let Some(count) = hatched_count {
        validate_non_negative_count(count, "hatched_count")?;
    }
    validate_optional_date(spawned_at, "spawned_at")?;
    validate_optional_text(notes, "notes", MAX_NOTE_LEN)?;
    Ok(())
}

/// HATCHED 池的鱼苗转入网箱: 网箱增加存量，池子变为 TRANSFERRED (同一事务)
async fn transfer_fry(
    pool: &SqlitePool,
    id: i64,
    data: &FryTransfer,
) -> AppResult<(GrownEggPond, Cage)> {
    if data.count <= 0 {
        return Err(
            AppError::validation("count must be greater than zero").with_detail("field", "count"),
        );
    }
    validate_non_negative_count(data.count, "count")?;

    let mut tx = begin(pool).await?;
    let current = pond::find_pond_in(&mut tx, id)
        .await?
        .ok_or_else(|| pond::pond_not_found(id))?;
    if current.stage != PondStage::Hatched {
        return Err(AppError::invalid_transition(
            ErrorCode::PondInvalidStage,
            current.stage.as_str(),
            PondStage::Transferred.as_str(),
        ));
    }
    if data.count > current.hatched_count {
        return Err(AppError::with_message(
            ErrorCode::PondInsufficientFry,
            format!(
                "Pond {} has {} hatched fry, {} requested",
                current.name, current.hatched_count, data.count
            ),
        ));
    }

    let stocked = cage::add_stock(&mut tx, data.cage_id, data.count).await?;
    let transferred = pond::mark_transferred(&mut tx, id, stocked.id, data.count).await?;
    commit(tx).await?;

    tracing::info!(
        pond = %transferred.name,
        cage = %stocked.code,
        count = data.count,
        "Fry transferred"
    );
    Ok((transferred, stocked))
}

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<GrownEggPond>>> {
    let ponds = pond::find_all_ponds(&state.pool).await?;
    Ok(Json(ponds))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<GrownEggPond>> {
    let found = pond::find_pond(&state.pool, id)
        .await?
        .ok_or_else(|| pond::pond_not_found(id))?;
    Ok(Json(found))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<GrownEggPondCreate>,
) -> AppResult<Json<GrownEggPond>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_fields(
        payload.egg_count,
        payload.hatched_count,
        &payload.spawned_at,
        &payload.notes,
    )?;

    let created = pond::create_pond(&state.pool, payload).await?;
    state.broadcast(RESOURCE, "grownEggPondCreated", created.id, Some(&created));
    Ok(Json(created))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<GrownEggPondUpdate>,
) -> AppResult<Json<GrownEggPond>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_fields(
        payload.egg_count,
        payload.hatched_count,
        &payload.spawned_at,
        &payload.notes,
    )?;

    let updated = pond::update_pond(&state.pool, id, payload).await?;
    state.broadcast(RESOURCE, "grownEggPondUpdated", id, Some(&updated));
    Ok(Json(updated))
}

/// `POST /{id}/transfer`
pub async fn transfer(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<FryTransfer>,
) -> AppResult<Json<OpResponse<GrownEggPond>>> {
    let (transferred, stocked) = transfer_fry(&state.pool, id, &payload).await?;
    state.broadcast(RESOURCE, "fryTransferred", id, Some(&transferred));
    state.broadcast(CAGE_RESOURCE, "cageUpdated", stocked.id, Some(&stocked));

    let message = format!("{} fry moved to cage {}", payload.count, stocked.code);
    Ok(Json(OpResponse::new(transferred, message)))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = pond::delete_pond(&state.pool, id).await?;
    if result {
        state.broadcast::<()>(RESOURCE, "grownEggPondDeleted", id, None);
    }
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::{CageCreate, CageStatus, CageUpdate};

    async fn setup(stage: PondStage, hatched: i64, capacity: i64) -> (SqlitePool, i64, i64) {
        let pool = DbService::in_memory().await.unwrap().pool;
        let pond = pond::create_pond(
            &pool,
            GrownEggPondCreate {
                name: "Hatchery 3".into(),
                parent_pool_id: None,
                egg_count: Some(10_000),
                hatched_count: Some(hatched),
                spawned_at: Some("2026-03-01".into()),
                stage: Some(stage),
                notes: None,
            },
        )
        .await
        .unwrap();
        let cage = cage::create(
            &pool,
            CageCreate {
                code: "NURSERY-1".into(),
                location: None,
                species: None,
                capacity: Some(capacity),
                current_stock: Some(500),
                status: None,
                stocked_at: None,
                notes: None,
            },
        )
        .await
        .unwrap();
        (pool, pond.id, cage.id)
    }

    #[tokio::test]
    async fn test_transfer_moves_fry_into_cage() {
        let (pool, pond_id, cage_id) = setup(PondStage::Hatched, 8000, 0).await;
        let (pond, cage) = transfer_fry(&pool, pond_id, &FryTransfer { cage_id, count: 7500 })
            .await
            .unwrap();
        assert_eq!(pond.stage, PondStage::Transferred);
        assert_eq!(pond.transferred_to, Some(cage_id));
        assert_eq!(pond.transferred_count, 7500);
        assert_eq!(cage.current_stock, 8000);

        // a transferred pond cannot move again
        let err = transfer_fry(&pool, pond_id, &FryTransfer { cage_id, count: 1 })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PondInvalidStage);
    }

    #[tokio::test]
    async fn test_transfer_rules() {
        let (pool, pond_id, cage_id) = setup(PondStage::Incubating, 0, 0).await;
        let err = transfer_fry(&pool, pond_id, &FryTransfer { cage_id, count: 10 })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PondInvalidStage);

        let (pool, pond_id, cage_id) = setup(PondStage::Hatched, 100, 0).await;
        let err = transfer_fry(&pool, pond_id, &FryTransfer { cage_id, count: 101 })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PondInsufficientFry);
        let err = transfer_fry(&pool, pond_id, &FryTransfer { cage_id, count: 0 })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_cage_failure_leaves_pond_hatched() {
        let (pool, pond_id, cage_id) = setup(PondStage::Hatched, 800, 1000).await;
        let err = transfer_fry(&pool, pond_id, &FryTransfer { cage_id, count: 600 })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CageOverCapacity);

        cage::update(
            &pool,
            cage_id,
            CageUpdate {
                status: Some(CageStatus::Maintenance),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let err = transfer_fry(&pool, pond_id, &FryTransfer { cage_id, count: 100 })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CageNotActive);

        let pond = pond::find_pond(&pool, pond_id).await.unwrap().unwrap();
        assert_eq!(pond.stage, PondStage::Hatched);
    }

    #[tokio::test]
    async fn test_oversized_counts_are_refused() {
        let (pool, pond_id, cage_id) = setup(PondStage::Hatched, i64::MAX, i64::MAX).await;
        let err = transfer_fry(&pool, pond_id, &FryTransfer { cage_id, count: i64::MAX })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        // 500 already stocked: the sum would overflow
        let mut tx = begin(&pool).await.unwrap();
        let err = cage::add_stock(&mut tx, cage_id, i64::MAX).await.unwrap_err();
        assert_eq!(AppError::from(err).code, ErrorCode::CageOverCapacity);
        drop(tx);

        let pond = pond::find_pond(&pool, pond_id).await.unwrap().unwrap();
        assert_eq!(pond.stage, PondStage::Hatched);
    }
}
