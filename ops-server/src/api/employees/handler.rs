//! Employee API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::core::ServerState;
use crate::db::repository::employee;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_email, validate_non_negative,
    validate_optional_date, validate_optional_email, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::ErrorCode;
use shared::models::{Employee, EmployeeCreate, EmployeeQuery, EmployeeUpdate};

const RESOURCE: &str = "employee";

fn validate_create(payload: &EmployeeCreate) -> AppResult<()> {
    validate_required_text(&payload.first_name, "first_name", MAX_NAME_LEN)?;
    validate_required_text(&payload.last_name, "last_name", MAX_NAME_LEN)?;
    validate_email(&payload.email, "email")?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.department, "department", MAX_NAME_LEN)?;
    validate_optional_text(&payload.position, "position", MAX_NAME_LEN)?;
    validate_optional_text(&payload.photo_url, "photo_url", MAX_URL_LEN)?;
    validate_optional_date(&payload.hire_date, "hire_date")?;
    if let Some(salary) = payload.salary {
        validate_non_negative(salary, "salary")?;
    }
    Ok(())
}

fn validate_update(payload: &EmployeeUpdate) -> AppResult<()> {
    if let Some(name) = &payload.first_name {
        validate_required_text(name, "first_name", MAX_NAME_LEN)?;
    }
    if let Some(name) = &payload.last_name {
        validate_required_text(name, "last_name", MAX_NAME_LEN)?;
    }
    validate_optional_email(&payload.email, "email")?;
    validate_optional_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.department, "department", MAX_NAME_LEN)?;
    validate_optional_text(&payload.position, "position", MAX_NAME_LEN)?;
    validate_optional_text(&payload.photo_url, "photo_url", MAX_URL_LEN)?;
    validate_optional_date(&payload.hire_date, "hire_date")?;
    if let Some(salary) = payload.salary {
        validate_non_negative(salary, "salary")?;
    }
    Ok(())
}

/// List employees, `?status=&department=&search=`
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<EmployeeQuery>,
) -> AppResult<Json<Vec<Employee>>> {
    let employees = employee::find_all(&state.pool, &query).await?;
    Ok(Json(employees))
}

/// Get employee by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Employee>> {
    let employee = employee::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::EmployeeNotFound, format!("Employee {} not found", id))
        })?;
    Ok(Json(employee))
}

/// Create a new employee
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<Json<Employee>> {
    validate_create(&payload)?;
    let employee = employee::create(&state.pool, payload).await?;

    state.broadcast(RESOURCE, "employeeCreated", employee.id, Some(&employee));
    Ok(Json(employee))
}

/// Update an employee
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<Employee>> {
    validate_update(&payload)?;
    let employee = employee::update(&state.pool, id, payload).await?;

    state.broadcast(RESOURCE, "employeeUpdated", id, Some(&employee));
    Ok(Json(employee))
}

/// Hard delete, refused while open requisitions reference the employee
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = employee::delete(&state.pool, id).await?;

    if result {
        state.broadcast::<()>(RESOURCE, "employeeDeleted", id, None);
    }
    Ok(Json(result))
}
