use std::path::PathBuf;

use crate::auth::JwtConfig;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | DATABASE_PATH | <WORK_DIR>/database/ops.db | SQLite 文件 |
/// | ENVIRONMENT | development | 运行环境 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | 优雅关闭窗口(毫秒) |
/// | MAX_UPLOAD_BYTES | 10485760 | 上传文件上限 |
/// | ADMIN_USERNAME | admin | 初始管理员 |
/// | ADMIN_PASSWORD | admin123 (仅开发环境) | 初始管理员密码 |
/// | COOKIE_SECURE | production 时为 true | Cookie Secure 标记 |
/// | MAIL_FROM | no-reply@ops.local | 发件人 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/ops HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、上传文件、日志等
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 数据库路径 (None = work_dir/database/ops.db)
    pub database_path: Option<String>,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 关闭超时时间 (毫秒)
    pub shutdown_timeout_ms: u64,
    /// 上传文件大小上限 (字节)
    pub max_upload_bytes: usize,
    pub admin_username: String,
    /// 生产环境必须显式提供
    pub admin_password: Option<String>,
    pub cookie_secure: bool,
    pub mail_from: String,
}

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_parse("HTTP_PORT").unwrap_or(3000),
            database_path: std::env::var("DATABASE_PATH").ok(),
            jwt: JwtConfig::default(),
            request_timeout_ms: env_parse("REQUEST_TIMEOUT_MS").unwrap_or(30000),
            shutdown_timeout_ms: env_parse("SHUTDOWN_TIMEOUT_MS").unwrap_or(10000),
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES").unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password: std::env::var("ADMIN_PASSWORD")
                .ok()
                .or_else(|| (!is_production).then(|| "admin123".to_string())),
            cookie_secure: env_parse("COOKIE_SECURE").unwrap_or(is_production),
            mail_from: std::env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@ops.local".into()),
            environment,
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config.database_path = None;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn work_dir_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir)
    }

    pub fn database_dir(&self) -> PathBuf {
        self.work_dir_path().join("database")
    }

    /// SQLite 文件路径
    pub fn database_file(&self) -> PathBuf {
        match &self.database_path {
            Some(path) => PathBuf::from(path),
            None => self.database_dir().join("ops.db"),
        }
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.work_dir_path().join("uploads")
    }

    pub fn outbox_dir(&self) -> PathBuf {
        self.work_dir_path().join("outbox")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.work_dir_path().join("logs")
    }

    /// 确保工作目录结构存在
    ///
    /// ```text
    /// work_dir/
    /// ├── database/
    /// ├── uploads/
    /// ├── outbox/
    /// └── logs/
    /// ```
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        for dir in [
            self.database_dir(),
            self.uploads_dir(),
            self.outbox_dir(),
            self.logs_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        if let Some(parent) = self.database_file().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_dir_layout() {
        let config = Config::with_overrides("/tmp/ops-test", 0);
        assert_eq!(config.http_port, 0);
        assert_eq!(
            config.database_file(),
            PathBuf::from("/tmp/ops-test/database/ops.db")
        );
        assert_eq!(config.uploads_dir(), PathBuf::from("/tmp/ops-test/uploads"));
        assert_eq!(config.outbox_dir(), PathBuf::from("/tmp/ops-test/outbox"));
    }

    #[test]
    fn test_ensure_work_dir_structure() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
        config.ensure_work_dir_structure().unwrap();
        assert!(dir.path().join("database").is_dir());
        assert!(dir.path().join("uploads").is_dir());
        assert!(dir.path().join("outbox").is_dir());
        assert!(dir.path().join("logs").is_dir());
    }
}
