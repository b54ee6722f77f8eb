//! Stock-in API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::stock;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_non_negative, validate_optional_text,
    validate_quantity, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::ErrorCode;
use shared::models::{
    HistoryQuery, Restock, StockHistory, StockIn, StockInCreate, StockInUpdate, StockQuery,
};

const RESOURCE: &str = "stock";

fn validate_create(payload: &StockInCreate) -> AppResult<()> {
    validate_required_text(&payload.product_name, "product_name", MAX_NAME_LEN)?;
    validate_required_text(&payload.store, "store", MAX_NAME_LEN)?;
    validate_optional_text(&payload.sku, "sku", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.category, "category", MAX_NAME_LEN)?;
    validate_optional_text(&payload.unit, "unit", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.supplier, "supplier", MAX_NAME_LEN)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    validate_non_negative(payload.quantity, "quantity")?;
    if let Some(price) = payload.unit_price {
        validate_non_negative(price, "unit_price")?;
    }
    if let Some(level) = payload.reorder_level {
        validate_non_negative(level, "reorder_level")?;
    }
    Ok(())
}

fn validate_update(payload: &StockInUpdate) -> AppResult<()> {
    if let Some(name) = &payload.product_name {
        validate_required_text(name, "product_name", MAX_NAME_LEN)?;
    }
    if let Some(store) = &payload.store {
        validate_required_text(store, "store", MAX_NAME_LEN)?;
    }
    if let Some(unit) = &payload.unit {
        validate_required_text(unit, "unit", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(&payload.sku, "sku", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.category, "category", MAX_NAME_LEN)?;
    validate_optional_text(&payload.supplier, "supplier", MAX_NAME_LEN)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    for (value, field) in [
        (payload.quantity, "quantity"),
        (payload.unit_price, "unit_price"),
        (payload.reorder_level, "reorder_level"),
    ] {
        if let Some(v) = value {
            validate_non_negative(v, field)?;
        }
    }
    Ok(())
}

/// List stock, `?store=&search=&low_stock=true`
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<StockQuery>,
) -> AppResult<Json<Vec<StockIn>>> {
    let items = stock::find_all(&state.pool, &query).await?;
    Ok(Json(items))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<StockIn>> {
    let item = stock::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::StockNotFound, format!("Stock item {} not found", id))
    })?;
    Ok(Json(item))
}

/// Movement ledger, `?stock_in_id=&limit=`
pub async fn history(
    State(state): State<ServerState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<StockHistory>>> {
    let rows = stock::history(&state.pool, &query).await?;
    Ok(Json(rows))
}

/// Ledger of one stock item
pub async fn item_history(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<StockHistory>>> {
    let query = HistoryQuery {
        stock_in_id: Some(id),
        ..query
    };
    let rows = stock::history(&state.pool, &query).await?;
    Ok(Json(rows))
}

/// Create a stock-in record; a positive opening quantity is booked as `IN`
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<StockInCreate>,
) -> AppResult<Json<StockIn>> {
    validate_create(&payload)?;
    let item = stock::create(&state.pool, payload, Some(user.id)).await?;

    state.broadcast(RESOURCE, "stockCreated", item.id, Some(&item));
    Ok(Json(item))
}

/// Update; a changed quantity is booked as `ADJUSTMENT`
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<StockInUpdate>,
) -> AppResult<Json<StockIn>> {
    validate_update(&payload)?;
    let item = stock::update(&state.pool, id, payload, Some(user.id)).await?;

    state.broadcast(RESOURCE, "stockUpdated", id, Some(&item));
    Ok(Json(item))
}

pub async fn restock(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<Restock>,
) -> AppResult<Json<StockIn>> {
    validate_quantity(payload.quantity, "quantity")?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let item = stock::restock(
        &state.pool,
        id,
        payload.quantity,
        payload.note.as_deref(),
        Some(user.id),
    )
    .await?;
    tracing::info!(stock_in_id = id, quantity = payload.quantity, balance = item.quantity, "Stock restocked");

    state.broadcast(RESOURCE, "stockRestocked", id, Some(&item));
    Ok(Json(item))
}

/// Delete, refused while an open requisition references the item
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = stock::delete(&state.pool, id).await?;
    if result {
        state.broadcast::<()>(RESOURCE, "stockDeleted", id, None);
    }
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_create() {
        let payload = StockInCreate {
            product_name: "Pellet 4mm".into(),
            sku: Some("FEED-4".into()),
            category: Some("Feed".into()),
            unit: Some("kg".into()),
            quantity: 250.0,
            unit_price: Some(1.2),
            reorder_level: Some(50.0),
            store: "Main Warehouse".into(),
            supplier: None,
            notes: None,
        };
        assert!(validate_create(&payload).is_ok());

        let negative = StockInCreate {
            quantity: -1.0,
            ..payload.clone()
        };
        assert!(validate_create(&negative).is_err());

        let no_store = StockInCreate {
            store: " ".into(),
            ..payload
        };
        assert!(validate_create(&no_store).is_err());
    }

    #[test]
    fn test_validate_update() {
        assert!(validate_update(&StockInUpdate::default()).is_ok());
        let update = StockInUpdate {
            reorder_level: Some(f64::NAN),
            ..Default::default()
        };
        assert!(validate_update(&update).is_err());
    }
}
