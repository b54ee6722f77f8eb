//! 认证中间件
//!
//! 为 JWT 认证和授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::ErrorCode;

use crate::AppError;
use crate::auth::permissions::permissions_for_role;
use crate::auth::{CurrentUser, JwtError, JwtService, cookie};
use crate::core::ServerState;
use crate::db::repository::user as user_repo;
use crate::security_log;

/// 认证中间件 - 要求用户登录
///
/// 令牌来源 (按顺序):
/// 1. `Authorization: Bearer <token>`
/// 2. `access_token` cookie
///
/// 验证成功后按数据库中的账户刷新角色与启用状态, 再将 [`CurrentUser`]
/// 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径 (`/health`, `/uploads/*`, `/ws` 自行认证)
/// - `/api/auth/login`
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if !path.starts_with("/api/") || path == "/api/auth/login" {
        return Ok(next.run(req).await);
    }

    let header_token = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|header| {
            JwtService::extract_from_header(header)
                .map(str::to_owned)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))
        })
        .transpose()?;

    let token = match header_token.or_else(|| cookie::access_token_from_headers(req.headers())) {
        Some(token) => token,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::not_authenticated());
        }
    };

    match state
        .jwt_service
        .validate_token(&token)
        .and_then(CurrentUser::try_from)
    {
        Ok(user) => {
            let user = refresh_account(&state, user).await?;
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );
            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// 用数据库中的账户刷新令牌身份
///
/// 被停用或删除的账户立即失效; 角色变更立即生效, 无需等待令牌过期。
pub(crate) async fn refresh_account(
    state: &ServerState,
    mut user: CurrentUser,
) -> Result<CurrentUser, AppError> {
    match user_repo::find_by_id(&state.pool, user.id).await? {
        Some(account) if account.is_active => {
            user.role = account.role.as_str().to_string();
            user.permissions = permissions_for_role(account.role);
            user.display_name = account.display_name;
            user.employee_id = account.employee_id;
            Ok(user)
        }
        _ => {
            security_log!("WARN", "auth_account_disabled", user_id = user.id);
            Err(AppError::with_message(
                ErrorCode::AccountDisabled,
                "Account has been disabled",
            ))
        }
    }
}

/// 权限检查中间件 - 要求特定权限
///
/// ```ignore
/// Router::new()
///     .route("/", post(handler::create))
///     .layer(middleware::from_fn(require_permission("stock:write")));
/// ```
///
/// 无权限返回 403 Forbidden
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(AppError::not_authenticated)?;

            if !user.has_permission(permission) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id,
                    username = user.username.clone(),
                    required_permission = permission
                );
                return Err(AppError::permission_denied(format!(
                    "Permission denied: {}",
                    permission
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

/// 管理员中间件 - 要求 ADMIN 角色
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::not_authenticated)?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id,
            username = user.username.clone(),
            user_role = user.role.clone()
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}
