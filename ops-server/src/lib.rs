//! Ops Server - 养殖场与仓库运营后台
//!
//! # 架构概述
//!
//! - **数据库** (`db`): SQLite (sqlx) 存储与仓储函数
//! - **认证** (`auth`): JWT + Argon2 认证体系, 基于角色的权限
//! - **领料流程** (`requisition`): 申请单状态机与数量核算
//! - **网关** (`gateway`): WebSocket 广播, 所有仪表盘实时刷新
//! - **邮件** (`mail`): 模板化通知, 写入 outbox
//! - **HTTP API** (`api`): RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! ops-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、权限
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 连接池与仓储
//! ├── requisition/   # 领料申请生命周期
//! ├── gateway/       # WebSocket 广播中心
//! ├── mail/          # 邮件模板与发送
//! └── utils/         # 日志、校验、数量运算
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod gateway;
pub mod mail;
pub mod requisition;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use gateway::GatewayHub;
pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境: 加载 .env, 初始化日志
///
/// `LOG_DIR` 存在时同时写入按天滚动的日志文件
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let json = std::env::var("ENVIRONMENT")
        .map(|e| e == "production")
        .unwrap_or(false);
    let log_dir = std::env::var("LOG_DIR").ok();

    init_logger_with_file(&level, json, log_dir.as_deref())
}

pub fn print_banner() {
    println!(
        r#"
  ____                   _____
 / __ \____  _____      / ___/___  ______   _____  _____
/ / / / __ \/ ___/______\__ \/ _ \/ ___/ | / / _ \/ ___/
/ /_/ / /_/ (__  )_____/__/ /  __/ /   | |/ /  __/ /
\____/ .___/____/     /____/\___/_/    |___/\___/_/
    /_/
    "#
    );
}
