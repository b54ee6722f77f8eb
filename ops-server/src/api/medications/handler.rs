//! Medication API Handlers
//!
//! 用药记录创建时在同一事务中扣减药品库存；删除记录不回补。

use axum::{
    Json,
    extract::{Path, Query, State},
};
use sqlx::SqlitePool;

use crate::core::ServerState;
use crate::db::repository::medication::NewMedication;
use crate::db::repository::{begin, cage, commit, employee, medication, medicine, pond};
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text, validate_quantity};
use crate::utils::{AppError, AppResult};
use shared::ErrorCode;
use shared::models::{Medication, MedicationCreate, MedicationQuery, Medicine};
use shared::util::{now_millis, today};

const RESOURCE: &str = "medication";
const MEDICINE_RESOURCE: &str = "medicine";

/// Exactly one of cage / pool
fn check_target(cage_id: Option<i64>, pool_id: Option<i64>) -> AppResult<()> {
    match (cage_id, pool_id) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        _ => Err(AppError::new(ErrorCode::MedicationTargetInvalid)),
    }
}

async fn administer(
    pool: &SqlitePool,
    data: &MedicationCreate,
) -> AppResult<(Medication, Medicine)> {
    check_target(data.cage_id, data.pool_id)?;
    validate_quantity(data.dosage, "dosage")?;
    validate_optional_text(&data.reason, "reason", MAX_NOTE_LEN)?;

    let mut tx = begin(pool).await?;
    let current = medicine::find_by_id_in(&mut tx, data.medicine_id)
        .await?
        .ok_or_else(|| medicine::not_found(data.medicine_id))?;
    if current.is_expired(&today()) {
        return Err(AppError::with_message(
            ErrorCode::MedicineExpired,
            format!(
                "{} expired on {}",
                current.name,
                current.expiry_date.as_deref().unwrap_or_default()
            ),
        ));
    }

    if let Some(cage_id) = data.cage_id
        && cage::find_by_id_in(&mut tx, cage_id).await?.is_none()
    {
        return Err(cage::not_found(cage_id).into());
    }
    if let Some(pool_id) = data.pool_id
        && !pond::pool_exists(&mut tx, pool_id).await?
    {
        return Err(pond::pool_not_found(pool_id).into());
    }
    if let Some(by) = data.administered_by
        && !employee::exists(&mut tx, by).await?
    {
        return Err(AppError::with_message(
            ErrorCode::EmployeeNotFound,
            format!("Employee {} not found", by),
        ));
    }

    let remaining = medicine::deduct(&mut tx, current.id, data.dosage).await?;
    let row = NewMedication {
        medicine_id: current.id,
        cage_id: data.cage_id,
        pool_id: data.pool_id,
        dosage: data.dosage,
        administered_at: data.administered_at.unwrap_or_else(now_millis),
        administered_by: data.administered_by,
        reason: data.reason.as_deref(),
    };
    let created = medication::insert(&mut tx, &row).await?;
    commit(tx).await?;

    tracing::info!(
        medication_id = created.id,
        medicine = %remaining.name,
        dosage = data.dosage,
        remaining = remaining.quantity,
        "Medication administered"
    );
    Ok((created, remaining))
}

/// List, `?cage_id=&pool_id=&medicine_id=`
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<MedicationQuery>,
) -> AppResult<Json<Vec<Medication>>> {
    let medications = medication::find_all(&state.pool, &query).await?;
    Ok(Json(medications))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Medication>> {
    let found = medication::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| medication::not_found(id))?;
    Ok(Json(found))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MedicationCreate>,
) -> AppResult<Json<Medication>> {
    let (created, remaining) = administer(&state.pool, &payload).await?;
    state.broadcast(RESOURCE, "medicationCreated", created.id, Some(&created));
    state.broadcast(MEDICINE_RESOURCE, "medicineUpdated", remaining.id, Some(&remaining));
    Ok(Json(created))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = medication::delete(&state.pool, id).await?;
    if result {
        state.broadcast::<()>(RESOURCE, "medicationDeleted", id, None);
    }
    Ok(Json(result))
}
