//! Authentication Handlers
//!
//! Handles login, logout, and the current user lookup

use std::time::Duration;

use axum::{Json, extract::State};
use http::header::{HeaderName, SET_COOKIE};

use crate::AppError;
use crate::auth::permissions::permissions_for_role;
use crate::auth::{CurrentUser, TokenSubject, cookie, password};
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use shared::ErrorCode;
use shared::client::{LoginRequest, LoginResponse, UserInfo};
use shared::error::ApiResponse;
use shared::models::User;

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

type CookieHeader = [(HeaderName, String); 1];

fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id,
        username: user.username.clone(),
        display_name: user.display_name.clone(),
        role: user.role.as_str().to_string(),
        employee_id: user.employee_id,
        permissions: permissions_for_role(user.role),
    }
}

/// Login handler
///
/// Authenticates credentials, returns a JWT and sets the `access_token` cookie
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieHeader, Json<LoginResponse>), AppError> {
    let username = req.username.trim().to_string();
    let found = user::find_by_username(&state.pool, &username).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error for unknown user and wrong password
    let account = match found {
        Some(account) if password::verify_password(&req.password, &account.hash_pass) => account,
        Some(_) => {
            security_log!("WARN", "login_failed", username = username.clone(), reason = "invalid_password");
            return Err(AppError::invalid_credentials());
        }
        None => {
            security_log!("WARN", "login_failed", username = username.clone(), reason = "user_not_found");
            return Err(AppError::invalid_credentials());
        }
    };

    if !account.is_active {
        security_log!("WARN", "login_disabled", username = username.clone());
        return Err(AppError::with_message(
            ErrorCode::AccountDisabled,
            "Account has been disabled",
        ));
    }

    let token = state
        .get_jwt_service()
        .generate_token(&TokenSubject {
            user_id: account.id,
            username: &account.username,
            display_name: &account.display_name,
            role: account.role,
            employee_id: account.employee_id,
        })
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = account.id,
        username = %account.username,
        role = account.role.as_str(),
        "User logged in"
    );

    let session = cookie::access_token_cookie(&token, state.config.cookie_secure);
    let response = LoginResponse {
        token,
        user: user_info(&account),
    };
    Ok(([(SET_COOKIE, session.to_string())], Json(response)))
}

/// Get current user info (fresh from the database)
pub async fn me(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> Result<Json<UserInfo>, AppError> {
    let account = user::find_by_id(&state.pool, current.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    if !account.is_active {
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }
    Ok(Json(user_info(&account)))
}

/// Logout handler, clears the session cookie
pub async fn logout(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> Result<(CookieHeader, Json<ApiResponse<()>>), AppError> {
    tracing::info!(
        user_id = current.id,
        username = %current.username,
        "User logged out"
    );
    let removal = cookie::removal_cookie(state.config.cookie_secure);
    Ok(([(SET_COOKIE, removal.to_string())], Json(ApiResponse::ok())))
}
