//! Parent Fish Pool API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::pond;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_non_negative_count,
    validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::models::{ParentFishPool, ParentFishPoolCreate, ParentFishPoolUpdate};

const RESOURCE: &str = "parent_fish_pool";

fn validate_fields(
    male_count: Option<i64>,
    female_count: Option<i64>,
    water_temperature: Option<f64>,
    species: &Option<String>,
    notes: &Option<String>,
) -> AppResult<()> {
    if let Some(count) = male_count {
        validate_non_negative_count(count, "male_count")?;
    }
    if let Some(count) = female_count {
        validate_non_negative_count(count, "female_count")?;
    }
    if let Some(temp) = water_temperature
        && !temp.is_finite()
    {
        return Err(AppError::validation("water_temperature must be a number")
            .with_detail("field", "water_temperature"));
    }
    validate_optional_text(species, "species", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(notes, "notes", MAX_NOTE_LEN)?;
    Ok(())
}

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<ParentFishPool>>> {
    let pools = pond::find_all_pools(&state.pool).await?;
    Ok(Json(pools))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ParentFishPool>> {
    let found = pond::find_pool(&state.pool, id)
        .await?
        .ok_or_else(|| pond::pool_not_found(id))?;
    Ok(Json(found))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ParentFishPoolCreate>,
) -> AppResult<Json<ParentFishPool>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_fields(
        payload.male_count,
        payload.female_count,
        payload.water_temperature,
        &payload.species,
        &payload.notes,
    )?;

    let created = pond::create_pool(&state.pool, payload).await?;
    state.broadcast(RESOURCE, "parentFishPoolCreated", created.id, Some(&created));
    Ok(Json(created))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ParentFishPoolUpdate>,
) -> AppResult<Json<ParentFishPool>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_fields(
        payload.male_count,
        payload.female_count,
        payload.water_temperature,
        &payload.species,
        &payload.notes,
    )?;

    let updated = pond::update_pool(&state.pool, id, payload).await?;
    state.broadcast(RESOURCE, "parentFishPoolUpdated", id, Some(&updated));
    Ok(Json(updated))
}

/// Delete, refused while grown-egg ponds reference it
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = pond::delete_pool(&state.pool, id).await?;
    if result {
        state.broadcast::<()>(RESOURCE, "parentFishPoolDeleted", id, None);
    }
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_fields() {
        assert!(validate_fields(Some(4), Some(12), Some(18.5), &None, &None).is_ok());
        assert!(validate_fields(Some(-1), None, None, &None, &None).is_err());
        assert!(validate_fields(None, None, Some(f64::NAN), &None, &None).is_err());
    }
}
