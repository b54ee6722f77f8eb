//! Medicine API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{Days, NaiveDate, Utc};

use crate::core::ServerState;
use crate::db::repository::medicine;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_non_negative, validate_optional_date,
    validate_optional_text, validate_required_text,
};
use crate::utils::AppResult;
use shared::models::{ExpiringQuery, Medicine, MedicineCreate, MedicineUpdate};

const RESOURCE: &str = "medicine";

/// `?days=` 缺省 30 天
const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 30;
const MAX_EXPIRY_WINDOW_DAYS: i64 = 3650;

/// Last date (inclusive) of the expiry window starting at `today`
fn expiry_cutoff(today: NaiveDate, days: Option<i64>) -> String {
    let days = days
        .unwrap_or(DEFAULT_EXPIRY_WINDOW_DAYS)
        .clamp(0, MAX_EXPIRY_WINDOW_DAYS) as u64;
    today
        .checked_add_days(Days::new(days))
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string()
}

fn validate_details(
    unit: &Option<String>,
    expiry_date: &Option<String>,
    supplier: &Option<String>,
    notes: &Option<String>,
) -> AppResult<()> {
    validate_optional_text(unit, "unit", MAX_SHORT_TEXT_LEN)?;
    validate_optional_date(expiry_date, "expiry_date")?;
    validate_optional_text(supplier, "supplier", MAX_NAME_LEN)?;
    validate_optional_text(notes, "notes", MAX_NOTE_LEN)?;
    Ok(())
}

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Medicine>>> {
    let medicines = medicine::find_all(&state.pool).await?;
    Ok(Json(medicines))
}

/// Expiring within `?days=` (already expired included), soonest first
pub async fn expiring(
    State(state): State<ServerState>,
    Query(query): Query<ExpiringQuery>,
) -> AppResult<Json<Vec<Medicine>>> {
    let until = expiry_cutoff(Utc::now().date_naive(), query.days);
    let medicines = medicine::find_expiring(&state.pool, &until).await?;
    Ok(Json(medicines))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Medicine>> {
    let found = medicine::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| medicine::not_found(id))?;
    Ok(Json(found))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MedicineCreate>,
) -> AppResult<Json<Medicine>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_details(
        &payload.unit,
        &payload.expiry_date,
        &payload.supplier,
        &payload.notes,
    )?;
    if let Some(quantity) = payload.quantity {
        validate_non_negative(quantity, "quantity")?;
    }

    let created = medicine::create(&state.pool, payload).await?;
    state.broadcast(RESOURCE, "medicineCreated", created.id, Some(&created));
    Ok(Json(created))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MedicineUpdate>,
) -> AppResult<Json<Medicine>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_details(
        &payload.unit,
        &payload.expiry_date,
        &payload.supplier,
        &payload.notes,
    )?;
    if let Some(quantity) = payload.quantity {
        validate_non_negative(quantity, "quantity")?;
    }

    let updated = medicine::update(&state.pool, id, payload).await?;
    state.broadcast(RESOURCE, "medicineUpdated", id, Some(&updated));
    Ok(Json(updated))
}

/// Delete, refused while treatment records reference it
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = medicine::delete(&state.pool, id).await?;
    if result {
        state.broadcast::<()>(RESOURCE, "medicineDeleted", id, None);
    }
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_expiry_cutoff() {
        assert_eq!(expiry_cutoff(date("2026-01-20"), None), "2026-02-19");
        assert_eq!(expiry_cutoff(date("2026-12-30"), Some(5)), "2027-01-04");
        assert_eq!(expiry_cutoff(date("2026-01-20"), Some(-3)), "2026-01-20");
    }

    #[tokio::test]
    async fn test_find_expiring_window() {
        let pool = DbService::in_memory().await.unwrap().pool;
        for (name, expiry) in [
            ("Formalin", Some("2026-01-10")),
            ("Oxytetracycline", Some("2026-02-01")),
            ("Salt", None),
            ("Praziquantel", Some("2027-06-01")),
        ] {
            medicine::create(
                &pool,
                MedicineCreate {
                    name: name.into(),
                    unit: None,
                    quantity: Some(100.0),
                    expiry_date: expiry.map(String::from),
                    supplier: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
        }

        let until = expiry_cutoff(date("2026-01-20"), Some(30));
        let names: Vec<String> = medicine::find_expiring(&pool, &until)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["Formalin", "Oxytetracycline"]);
    }
}
