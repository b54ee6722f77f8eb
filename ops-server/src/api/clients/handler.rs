//! Client API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::client;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_email,
    validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};
use shared::ErrorCode;
use shared::models::{Client, ClientCreate, ClientUpdate};

const RESOURCE: &str = "client";

fn validate_details(
    company: &Option<String>,
    email: &Option<String>,
    phone: &Option<String>,
    address: &Option<String>,
    notes: &Option<String>,
) -> AppResult<()> {
    validate_optional_text(company, "company", MAX_NAME_LEN)?;
    validate_optional_email(email, "email")?;
    validate_optional_text(phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(notes, "notes", MAX_NOTE_LEN)?;
    Ok(())
}

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Client>>> {
    let clients = client::find_all(&state.pool).await?;
    Ok(Json(clients))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Client>> {
    let client = client::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ClientNotFound, format!("Client {} not found", id))
        })?;
    Ok(Json(client))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ClientCreate>,
) -> AppResult<Json<Client>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_details(
        &payload.company,
        &payload.email,
        &payload.phone,
        &payload.address,
        &payload.notes,
    )?;

    let client = client::create(&state.pool, payload).await?;
    state.broadcast(RESOURCE, "clientCreated", client.id, Some(&client));
    Ok(Json(client))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ClientUpdate>,
) -> AppResult<Json<Client>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_details(
        &payload.company,
        &payload.email,
        &payload.phone,
        &payload.address,
        &payload.notes,
    )?;

    let client = client::update(&state.pool, id, payload).await?;
    state.broadcast(RESOURCE, "clientUpdated", id, Some(&client));
    Ok(Json(client))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = client::delete(&state.pool, id).await?;
    if result {
        state.broadcast::<()>(RESOURCE, "clientDeleted", id, None);
    }
    Ok(Json(result))
}
