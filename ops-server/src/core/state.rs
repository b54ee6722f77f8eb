//! 服务器状态
//!
//! [`ServerState`] 持有所有服务的共享引用，通过 axum `State` 注入处理器。
//! 所有字段都是廉价克隆 (连接池 / Arc / broadcast Sender)。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use shared::models::Role;
use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::auth::password::hash_password;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::user;
use crate::gateway::GatewayHub;
use crate::mail::{Mailer, OutboxMailer, OutgoingMail};

/// 服务器状态 - 持有所有服务的共享引用
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 不可变配置 |
/// | pool | SQLite 连接池 |
/// | jwt_service | JWT 认证服务 |
/// | gateway | WebSocket 广播中心 |
/// | mailer | 邮件发送 (默认写入 outbox) |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub gateway: GatewayHub,
    pub mailer: Arc<dyn Mailer>,
}

impl ServerState {
    /// 手动构造, 通常使用 [`ServerState::initialize`]
    pub fn new(config: Config, pool: SqlitePool, mailer: Arc<dyn Mailer>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config,
            pool,
            jwt_service,
            gateway: GatewayHub::new(),
            mailer,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 工作目录结构
    /// 2. 数据库 (迁移)
    /// 3. 各服务 (JWT, Gateway, Mailer)
    /// 4. 空用户表时创建初始管理员
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        config
            .ensure_work_dir_structure()
            .context("Failed to create work directory structure")?;

        let db_path = config.database_file();
        let db = DbService::new(&db_path.to_string_lossy())
            .await
            .context("Failed to initialize database")?;

        let state = Self::with_outbox(config.clone(), db.pool);
        state.seed_admin().await?;
        Ok(state)
    }

    /// 内存数据库版本 (测试)
    pub async fn initialize_in_memory(config: &Config) -> anyhow::Result<Self> {
        config
            .ensure_work_dir_structure()
            .context("Failed to create work directory structure")?;
        let db = DbService::in_memory()
            .await
            .context("Failed to open in-memory database")?;

        let state = Self::with_outbox(config.clone(), db.pool);
        state.seed_admin().await?;
        Ok(state)
    }

    fn with_outbox(config: Config, pool: SqlitePool) -> Self {
        let mailer = Arc::new(OutboxMailer::new(
            config.outbox_dir(),
            config.mail_from.clone(),
        ));
        Self::new(config, pool, mailer)
    }

    /// 用户表为空时创建初始管理员
    ///
    /// 生产环境必须通过 `ADMIN_PASSWORD` 提供密码
    async fn seed_admin(&self) -> anyhow::Result<()> {
        if user::count(&self.pool).await? > 0 {
            return Ok(());
        }
        let password = self.config.admin_password.as_deref().context(
            "No users exist and ADMIN_PASSWORD is not set, cannot create the initial administrator",
        )?;
        let hash = hash_password(password)?;
        let admin = user::create(
            &self.pool,
            &self.config.admin_username,
            "Administrator",
            &hash,
            Role::Admin,
            None,
        )
        .await?;
        tracing::info!(username = %admin.username, "Initial administrator created");
        Ok(())
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        self.config.work_dir_path()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// 广播资源变更
    ///
    /// 版本号由 Gateway 按资源自动递增; 没有连接时事件被丢弃。
    ///
    /// - `resource`: 资源类型 (如 "employee", "request", "cage")
    /// - `event`: 事件名 (如 "employeeCreated", "materialsIssued")
    /// - `id`: 资源 ID
    /// - `data`: 资源数据 (删除时为 None)
    pub fn broadcast<T: Serialize>(
        &self,
        resource: &str,
        event: &str,
        id: impl ToString,
        data: Option<&T>,
    ) -> u64 {
        let payload = data.and_then(|d| serde_json::to_value(d).ok());
        self.gateway.publish(resource, event, id, payload)
    }

    /// 发送邮件, 失败只记录日志
    pub async fn notify(&self, mail: OutgoingMail) {
        let to = mail.to.clone();
        if let Err(e) = self.mailer.send(mail).await {
            tracing::warn!(to = %to, error = %e, "Failed to queue notification mail");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_seeds_admin_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_overrides(dir.path().to_string_lossy(), 0);
        config.admin_password = Some("admin123".into());

        let state = ServerState::initialize(&config).await.unwrap();
        assert_eq!(user::count(&state.pool).await.unwrap(), 1);
        let admin = user::find_by_username(&state.pool, &config.admin_username)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(dir.path().join("outbox").is_dir());
        drop(state);

        // Second start on the same database keeps the single admin
        let state = ServerState::initialize(&config).await.unwrap();
        assert_eq!(user::count(&state.pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_admin_password_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_overrides(dir.path().to_string_lossy(), 0);
        config.admin_password = None;
        assert!(ServerState::initialize_in_memory(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_broadcast_bumps_version() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
        let state = ServerState::initialize_in_memory(&config).await.unwrap();
        let mut rx = state.gateway.subscribe();

        let v1 = state.broadcast("cage", "cageCreated", 7, Some(&serde_json::json!({"code": "A1"})));
        let v2 = state.broadcast::<()>("cage", "cageDeleted", 7, None);
        assert_eq!((v1, v2), (1, 2));

        let first = rx.recv().await.unwrap();
        assert_eq!(first.event, "cageCreated");
        assert_eq!(first.id, "7");
        let second = rx.recv().await.unwrap();
        assert!(second.data.is_none());
    }
}
