//! HTTP 服务器
//!
//! [`build_app`] 组装路由与中间件, [`Server::run`] 监听端口直到 Ctrl-C。

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::{Router, middleware};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;

use crate::auth::require_auth;
use crate::core::{Config, ServerState};

/// multipart 边界和表单字段的额外余量
const BODY_LIMIT_SLACK: usize = 64 * 1024;

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();
    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// 所有业务路由 (不含状态)
pub fn routes() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(crate::api::router())
        .merge(crate::gateway::router())
}

/// 组装完整应用
///
/// 层顺序 (外 → 内): 访问日志, 压缩, CORS, 超时, 认证, 路由
pub fn build_app(state: &ServerState) -> Router {
    let config = &state.config;
    crate::api::health::mark_started();
    routes()
        .nest_service("/uploads", ServeDir::new(config.uploads_dir()))
        // require_auth 内部跳过公共路由
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes + BODY_LIMIT_SLACK))
        .with_state(state.clone())
        .layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            Duration::from_millis(config.request_timeout_ms),
        ))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
}

/// HTTP 服务器
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    /// 仅配置, `run` 时初始化状态
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// 使用已初始化的状态
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    /// 启动服务器, 阻塞直到收到关闭信号
    pub async fn run(self) -> anyhow::Result<()> {
        let state = match self.state {
            Some(state) => state,
            None => ServerState::initialize(&self.config).await?,
        };

        let app = build_app(&state);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!(
            %addr,
            environment = %self.config.environment,
            work_dir = %self.config.work_dir,
            "Starting HTTP server"
        );

        let handle = axum_server::Handle::new();

        let handle_clone = handle.clone();
        let grace = Duration::from_millis(self.config.shutdown_timeout_ms);
        tokio::spawn(async move {
            shutdown_signal().await;
            tracing::info!(grace_ms = grace.as_millis() as u64, "Shutdown signal received");
            handle_clone.graceful_shutdown(Some(grace));
        });

        axum_server::bind(addr)
            .handle(handle)
            .serve(app.into_make_service())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
