//! Job Posting API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::job;
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, validate_optional_date, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::ErrorCode;
use shared::models::{Job, JobCreate, JobUpdate};

const RESOURCE: &str = "job";

fn validate_openings(openings: Option<i64>) -> AppResult<()> {
    match openings {
        Some(n) if n < 1 => Err(AppError::validation("openings must be at least 1")
            .with_detail("field", "openings")),
        _ => Ok(()),
    }
}

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Job>>> {
    let jobs = job::find_all(&state.pool).await?;
    Ok(Json(jobs))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Job>> {
    let job = job::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::JobNotFound, format!("Job {} not found", id)))?;
    Ok(Json(job))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<JobCreate>,
) -> AppResult<Json<Job>> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_optional_text(&payload.department, "department", MAX_NAME_LEN)?;
    validate_optional_text(&payload.location, "location", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;
    validate_optional_date(&payload.closing_date, "closing_date")?;
    validate_openings(payload.openings)?;

    let job = job::create(&state.pool, payload).await?;
    state.broadcast(RESOURCE, "jobCreated", job.id, Some(&job));
    Ok(Json(job))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<JobUpdate>,
) -> AppResult<Json<Job>> {
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.department, "department", MAX_NAME_LEN)?;
    validate_optional_text(&payload.location, "location", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;
    validate_optional_date(&payload.closing_date, "closing_date")?;
    validate_openings(payload.openings)?;

    let job = job::update(&state.pool, id, payload).await?;
    state.broadcast(RESOURCE, "jobUpdated", id, Some(&job));
    Ok(Json(job))
}

/// Stop accepting applicants
pub async fn close(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Job>> {
    let job = job::close(&state.pool, id).await?;
    tracing::info!(job_id = id, title = %job.title, "Job closed");
    state.broadcast(RESOURCE, "jobClosed", id, Some(&job));
    Ok(Json(job))
}

/// Delete, refused while applicants exist
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = job::delete(&state.pool, id).await?;
    if result {
        state.broadcast::<()>(RESOURCE, "jobDeleted", id, None);
    }
    Ok(Json(result))
}
