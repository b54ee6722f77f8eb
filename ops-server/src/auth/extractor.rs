//! JWT Extractor
//!
//! Handlers take `user: CurrentUser` directly. The value placed by
//! [`require_auth`](super::require_auth) is reused; otherwise the token is
//! validated here.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;
use crate::auth::{CurrentUser, JwtService, cookie};
use crate::core::ServerState;
use crate::security_log;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let token = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(JwtService::extract_from_header)
            .map(str::to_owned)
            .or_else(|| cookie::access_token_from_headers(&parts.headers));

        let Some(token) = token else {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
            return Err(AppError::not_authenticated());
        };

        let user = state
            .jwt_service
            .validate_token(&token)
            .and_then(CurrentUser::try_from)
            .map_err(|e| {
                security_log!(
                    "WARN",
                    "auth_failed",
                    error = format!("{}", e),
                    uri = format!("{:?}", parts.uri)
                );
                AppError::from(e)
            })?;

        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
