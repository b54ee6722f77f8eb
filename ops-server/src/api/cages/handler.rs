//! Cage API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::cage;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_non_negative_count,
    validate_optional_date, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::ErrorCode;
use shared::models::{Cage, CageCreate, CageUpdate};

const RESOURCE: &str = "cage";

fn validate_counts(capacity: Option<i64>, current_stock: Option<i64>) -> AppResult<()> {
    if let Some(capacity) = capacity {
        validate_non_negative_count(capacity, "capacity")?;
    }
    if let Some(stock) = current_stock {
        validate_non_negative_count(stock, "current_stock")?;
    }
    Ok(())
}

fn validate_details(
    location: &Option<String>,
    species: &Option<String>,
    stocked_at: &Option<String>,
    notes: &Option<String>,
) -> AppResult<()> {
    validate_optional_text(location, "location", MAX_NAME_LEN)?;
    validate_optional_text(species, "species", MAX_SHORT_TEXT_LEN)?;
    validate_optional_date(stocked_at, "stocked_at")?;
    validate_optional_text(notes, "notes", MAX_NOTE_LEN)?;
    Ok(())
}

fn validate_create(data: &CageCreate) -> AppResult<()> {
    validate_required_text(&data.code, "code", MAX_SHORT_TEXT_LEN)?;
    validate_counts(data.capacity, data.current_stock)?;
    validate_details(&data.location, &data.species, &data.stocked_at, &data.notes)
}

fn validate_update(data: &CageUpdate) -> AppResult<()> {
    if let Some(code) = &data.code {
        validate_required_text(code, "code", MAX_SHORT_TEXT_LEN)?;
    }
    validate_counts(data.capacity, data.current_stock)?;
    validate_details(&data.location, &data.species, &data.stocked_at, &data.notes)
}

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Cage>>> {
    let cages = cage::find_all(&state.pool).await?;
    Ok(Json(cages))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Cage>> {
    let cage = cage::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::CageNotFound, format!("Cage {} not found", id))
    })?;
    Ok(Json(cage))
}

/// Create; capacity 0 means unlimited
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CageCreate>,
) -> AppResult<Json<Cage>> {
    validate_create(&payload)?;

    let cage = cage::create(&state.pool, payload).await?;
    state.broadcast(RESOURCE, "cageCreated", cage.id, Some(&cage));
    Ok(Json(cage))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CageUpdate>,
) -> AppResult<Json<Cage>> {
    validate_update(&payload)?;

    let cage = cage::update(&state.pool, id, payload).await?;
    state.broadcast(RESOURCE, "cageUpdated", id, Some(&cage));
    Ok(Json(cage))
}

/// Delete, refused while fish are stocked
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = cage::delete(&state.pool, id).await?;
    if result {
        state.broadcast::<()>(RESOURCE, "cageDeleted", id, None);
    }
    Ok(Json(result))
}
