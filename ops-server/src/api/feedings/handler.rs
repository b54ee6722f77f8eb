//! Feeding API Handlers
//!
//! 关联库存时，投喂记录与出库在同一事务中完成。

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::feeding::NewFeeding;
use crate::db::repository::{begin, cage, commit, employee, feeding, stock};
use crate::utils::quantity;
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_quantity,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::ErrorCode;
use shared::models::{
    CageStatus, Feeding, FeedingCreate, FeedingQuery, FeedingSummary, FeedingUpdate, StockIn,
};
use shared::util::now_millis;

const RESOURCE: &str = "feeding";
const STOCK_RESOURCE: &str = "stock";

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub cage_id: Option<i64>,
}

fn validate_create(data: &FeedingCreate) -> AppResult<()> {
    validate_required_text(&data.feed_type, "feed_type", MAX_SHORT_TEXT_LEN)?;
    validate_quantity(data.quantity_kg, "quantity_kg")?;
    validate_optional_text(&data.notes, "notes", MAX_NOTE_LEN)?;
    Ok(())
}

async fn record(
    pool: &SqlitePool,
    data: &FeedingCreate,
    created_by: i64,
) -> AppResult<(Feeding, Option<StockIn>)> {
    validate_create(data)?;

    let mut tx = begin(pool).await?;
    let target = cage::find_by_id_in(&mut tx, data.cage_id).await?.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::CageNotFound,
            format!("Cage {} not found", data.cage_id),
        )
    })?;
    if target.status != CageStatus::Active {
        return Err(AppError::with_message(
            ErrorCode::CageNotActive,
            format!("Cage {} is not active", target.code),
        ));
    }
    if let Some(fed_by) = data.fed_by
        && !employee::exists(&mut tx, fed_by).await?
    {
        return Err(AppError::with_message(
            ErrorCode::EmployeeNotFound,
            format!("Employee {} not found", fed_by),
        ));
    }

    let drawn = match data.stock_in_id {
        Some(stock_in_id) => {
            let reference = format!("FEED-{}", target.code);
            let meta = stock::MovementMeta {
                reference: Some(reference.as_str()),
                note: Some(data.feed_type.trim()),
                created_by: Some(created_by),
            };
            Some(stock::draw(&mut tx, stock_in_id, data.quantity_kg, &meta).await?)
        }
        None => None,
    };

    let row = NewFeeding {
        cage_id: target.id,
        feed_type: data.feed_type.trim(),
        quantity_kg: quantity::to_f64(quantity::to_decimal(data.quantity_kg)),
        fed_at: data.fed_at.unwrap_or_else(now_millis),
        fed_by: data.fed_by,
        stock_in_id: data.stock_in_id,
        notes: data.notes.as_deref(),
    };
    let created = feeding::insert(&mut tx, &row).await?;
    commit(tx).await?;

    tracing::info!(
        feeding_id = created.id,
        cage = %target.code,
        quantity_kg = created.quantity_kg,
        from_stock = drawn.is_some(),
        "Feeding recorded"
    );
    Ok((created, drawn))
}

/// List, `?cage_id=&from=&to=` (epoch millis)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<FeedingQuery>,
) -> AppResult<Json<Vec<Feeding>>> {
    let feedings = feeding::find_all(&state.pool, &query).await?;
    Ok(Json(feedings))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Feeding>> {
    let found = feeding::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| feeding::not_found(id))?;
    Ok(Json(found))
}

/// Total kg and count, optionally for one cage
pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<Json<FeedingSummary>> {
    let mut summary = feeding::summary(&state.pool, query.cage_id).await?;
    summary.total_kg = quantity::to_f64(quantity::to_decimal(summary.total_kg));
    Ok(Json(summary))
}

pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<FeedingCreate>,
) -> AppResult<Json<Feeding>> {
    let (created, drawn) = record(&state.pool, &payload, user.id).await?;
    state.broadcast(RESOURCE, "feedingCreated", created.id, Some(&created));
    if let Some(item) = drawn {
        state.broadcast(STOCK_RESOURCE, "stockUpdated", item.id, Some(&item));
    }
    Ok(Json(created))
}

/// Quantity and stock link stay fixed
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<FeedingUpdate>,
) -> AppResult<Json<Feeding>> {
    if let Some(feed_type) = &payload.feed_type {
        validate_required_text(feed_type, "feed_type", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    if let Some(fed_by) = payload.fed_by {
        if employee::find_by_id(&state.pool, fed_by).await?.is_none() {
            return Err(AppError::with_message(
                ErrorCode::EmployeeNotFound,
                format!("Employee {} not found", fed_by),
            ));
        }
    }

    let updated = feeding::update(&state.pool, id, payload).await?;
    state.broadcast(RESOURCE, "feedingUpdated", id, Some(&updated));
    Ok(Json(updated))
}

/// Removes the record; drawn stock is not restored
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = feeding::delete(&state.pool, id).await?;
    if result {
        state.broadcast::<()>(RESOURCE, "feedingDeleted", id, None);
    }
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::{CageCreate, CageUpdate, StockInCreate};

    async fn setup() -> (SqlitePool, i64) {
        let pool = DbService::in_memory().await.unwrap().pool;
        let cage = cage::create(
            &pool,
            CageCreate {
                code: "C-07".into(),
                location: None,
                species: None,
                capacity: None,
                current_stock: Some(1200),
                status: None,
                stocked_at: None,
                notes: None,
            },
        )
        .await
        .unwrap();
        (pool, cage.id)
    }

    fn feed(cage_id: i64, kg: f64, stock_in_id: Option<i64>) -> FeedingCreate {
        FeedingCreate {
            cage_id,
            feed_type: "Pellet 4mm".into(),
            quantity_kg: kg,
            fed_at: None,
            fed_by: None,
            stock_in_id,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_feeding_draws_stock() {
        let (pool, cage_id) = setup().await;
        let pellets = stock::create(
            &pool,
            StockInCreate {
                product_name: "Pellet 4mm".into(),
                sku: None,
                category: Some("Feed".into()),
                unit: Some("kg".into()),
                quantity: 50.0,
                unit_price: None,
                reorder_level: None,
                store: "Main".into(),
                supplier: None,
                notes: None,
            },
            None,
        )
        .await
        .unwrap();

        let (created, drawn) = record(&pool, &feed(cage_id, 12.5, Some(pellets.id)), 1)
            .await
            .unwrap();
        assert_eq!(created.stock_in_id, Some(pellets.id));
        assert_eq!(drawn.unwrap().quantity, 37.5);

        // insufficient stock rolls the feeding back
        let err = record(&pool, &feed(cage_id, 40.0, Some(pellets.id)), 1)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::StockInsufficient);

        let summary = feeding::summary(&pool, Some(cage_id)).await.unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.total_kg, 12.5);
    }

    #[tokio::test]
    async fn test_inactive_cage_refused() {
        let (pool, cage_id) = setup().await;
        cage::update(
            &pool,
            cage_id,
            CageUpdate {
                status: Some(CageStatus::Fallow),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let err = record(&pool, &feed(cage_id, 3.0, None), 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CageNotActive);
    }

    #[tokio::test]
    async fn test_quantity_must_be_positive() {
        let (pool, cage_id) = setup().await;
        let err = record(&pool, &feed(cage_id, 0.0, None), 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let err = record(&pool, &feed(999, 1.0, None), 1).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CageNotFound);
    }
}
