//! User API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::{CurrentUser, password};
use crate::core::ServerState;
use crate::db::repository::{RepoError, employee, user};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_PASSWORD_LEN, MAX_SHORT_TEXT_LEN, MIN_PASSWORD_LEN, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::ErrorCode;
use shared::models::{Role, User, UserCreate, UserUpdate};

const RESOURCE: &str = "user";

fn validate_password(value: &str) -> AppResult<()> {
    let len = value.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(AppError::validation(format!(
            "password must be {MIN_PASSWORD_LEN}-{MAX_PASSWORD_LEN} characters"
        ))
        .with_detail("field", "password"));
    }
    Ok(())
}

async fn ensure_employee(state: &ServerState, employee_id: Option<i64>) -> AppResult<()> {
    if let Some(id) = employee_id
        && employee::find_by_id(&state.pool, id).await?.is_none()
    {
        return Err(AppError::with_message(
            ErrorCode::EmployeeNotFound,
            format!("Employee {id} not found"),
        ));
    }
    Ok(())
}

async fn load(state: &ServerState, id: i64) -> AppResult<User> {
    user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found")))
}

fn username_taken(err: RepoError) -> AppError {
    err.duplicate_as(ErrorCode::UsernameExists, "Username already exists")
        .into()
}

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<User>>> {
    let users = user::find_all(&state.pool).await?;
    Ok(Json(users))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    Ok(Json(load(&state, id).await?))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<User>> {
    validate_required_text(&payload.username, "username", MAX_SHORT_TEXT_LEN)?;
    validate_password(&payload.password)?;
    if let Some(name) = &payload.display_name {
        validate_required_text(name, "display_name", MAX_NAME_LEN)?;
    }
    ensure_employee(&state, payload.employee_id).await?;

    let username = payload.username.trim();
    let display_name = payload
        .display_name
        .as_deref()
        .map(str::trim)
        .unwrap_or(username);
    let hash = password::hash_password(&payload.password)?;
    let created = user::create(
        &state.pool,
        username,
        display_name,
        &hash,
        payload.role,
        payload.employee_id,
    )
    .await
    .map_err(username_taken)?;

    tracing::info!(user_id = created.id, username = %created.username, role = created.role.as_str(), "User created");
    state.broadcast(RESOURCE, "userCreated", created.id, Some(&created));
    Ok(Json(created))
}

/// Update a user
///
/// 最后一个启用的 ADMIN 不能被停用或降级
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    if let Some(name) = &payload.display_name {
        validate_required_text(name, "display_name", MAX_NAME_LEN)?;
    }
    if let Some(pw) = &payload.password {
        validate_password(pw)?;
    }
    ensure_employee(&state, payload.employee_id).await?;

    let existing = load(&state, id).await?;
    let loses_admin = payload.is_active == Some(false)
        || payload.role.is_some_and(|role| role != Role::Admin);
    if existing.role == Role::Admin
        && existing.is_active
        && loses_admin
        && user::count_other_active_admins(&state.pool, id).await? == 0
    {
        return Err(AppError::with_message(
            ErrorCode::LastAdminRequired,
            "At least one active administrator is required",
        ));
    }

    let hash = payload
        .password
        .as_deref()
        .map(password::hash_password)
        .transpose()?;
    let updated = user::update(
        &state.pool,
        id,
        payload.display_name.as_deref().map(str::trim),
        hash.as_deref(),
        payload.role,
        payload.employee_id,
        payload.is_active,
    )
    .await?;

    state.broadcast(RESOURCE, "userUpdated", updated.id, Some(&updated));
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    if current.id == id {
        return Err(AppError::new(ErrorCode::CannotDeleteSelf));
    }
    let existing = load(&state, id).await?;
    if existing.role == Role::Admin
        && existing.is_active
        && user::count_other_active_admins(&state.pool, id).await? == 0
    {
        return Err(AppError::new(ErrorCode::LastAdminRequired));
    }

    let result = user::delete(&state.pool, id).await?;
    if result {
        tracing::info!(user_id = id, deleted_by = current.id, "User deleted");
        state.broadcast::<()>(RESOURCE, "userDeleted", id, None);
    }
    Ok(Json(result))
}
