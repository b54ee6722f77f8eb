//! Asset API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::asset;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_non_negative_count,
    validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::ErrorCode;
use shared::models::{Asset, AssetCreate, AssetUpdate};

const RESOURCE: &str = "asset";

fn validate_details(
    category: &Option<String>,
    location: &Option<String>,
    image_url: &Option<String>,
    notes: &Option<String>,
) -> AppResult<()> {
    validate_optional_text(category, "category", MAX_NAME_LEN)?;
    validate_optional_text(location, "location", MAX_NAME_LEN)?;
    validate_optional_text(image_url, "image_url", MAX_URL_LEN)?;
    validate_optional_text(notes, "notes", MAX_NOTE_LEN)?;
    Ok(())
}

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Asset>>> {
    let assets = asset::find_all(&state.pool).await?;
    Ok(Json(assets))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Asset>> {
    let asset = asset::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::AssetNotFound, format!("Asset {} not found", id))
    })?;
    Ok(Json(asset))
}

/// Create; every unit starts available
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<AssetCreate>,
) -> AppResult<Json<Asset>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.asset_code, "asset_code", MAX_SHORT_TEXT_LEN)?;
    validate_details(
        &payload.category,
        &payload.location,
        &payload.image_url,
        &payload.notes,
    )?;
    if let Some(total) = payload.quantity_total {
        validate_non_negative_count(total, "quantity_total")?;
    }

    let asset = asset::create(&state.pool, payload).await?;
    state.broadcast(RESOURCE, "assetCreated", asset.id, Some(&asset));
    Ok(Json(asset))
}

/// Update; a new total shifts availability by the same delta
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AssetUpdate>,
) -> AppResult<Json<Asset>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(code) = &payload.asset_code {
        validate_required_text(code, "asset_code", MAX_SHORT_TEXT_LEN)?;
    }
    validate_details(
        &payload.category,
        &payload.location,
        &payload.image_url,
        &payload.notes,
    )?;
    if let Some(total) = payload.quantity_total {
        validate_non_negative_count(total, "quantity_total")?;
    }

    let asset = asset::update(&state.pool, id, payload).await?;
    state.broadcast(RESOURCE, "assetUpdated", id, Some(&asset));
    Ok(Json(asset))
}

/// Delete, refused while units are out on request
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = asset::delete(&state.pool, id).await?;
    if result {
        state.broadcast::<()>(RESOURCE, "assetDeleted", id, None);
    }
    Ok(Json(result))
}
