//! 统一配置中心
//!
//! 提供应用的全局配置管理，包括：
//! - 服务监听地址与 CORS
//! - 存储后端选择（内存 / PostgreSQL）
//! - 数据库连接
//! - 日志过滤
//!
//! 加载优先级：内置默认值 -> 可选配置文件（`APP_CONFIG_FILE`）-> 环境变量（`APP_*`，
//! 嵌套字段用 `__` 分隔，例如 `APP_SERVER__PORT=5000`）。

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(nested)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[validate(nested)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    /// 为空或包含 `*` 时允许任意来源
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

/// 数据库配置，仅在 PostgreSQL 后端下使用
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[validate(range(min = 1))]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info,tower_http=debug".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 5000,
                cors_origins: vec!["*".into()],
            },
            storage: StorageConfig::default(),
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 5,
            },
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// 按默认值 -> 配置文件 -> 环境变量的顺序加载并校验
    pub fn load() -> Result<Self, ConfigError> {
        let mut fig = Figment::new().merge(Serialized::defaults(AppConfig::default()));
        if let Ok(path) = std::env::var("APP_CONFIG_FILE") {
            if path.ends_with(".yml") || path.ends_with(".yaml") {
                fig = fig.merge(Yaml::file(path));
            } else if path.ends_with(".json") {
                fig = fig.merge(Json::file(path));
            } else {
                fig = fig.merge(Toml::file(path));
            }
        }
        fig = fig.merge(Env::prefixed("APP_").split("__"));

        Self::from_figment(fig)
    }

    pub fn from_figment(fig: Figment) -> Result<Self, ConfigError> {
        let cfg: AppConfig = fig.extract().map_err(Box::new)?;
        cfg.check()?;
        Ok(cfg)
    }

    /// 字段级校验之外的跨字段约束
    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.storage.backend == StorageBackend::Postgres && self.database.url.trim().is_empty() {
            return Err(ConfigError::InvalidDatabaseUrl(
                "database.url is required for the postgres backend".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 日志中可安全输出的配置摘要
    pub fn sanitize(&self) -> String {
        let database = match self.database.url.split_once('@') {
            Some((_, host)) => format!("postgres://[REDACTED]@{host}"),
            None if self.database.url.is_empty() => "-".to_string(),
            None => "[REDACTED]".to_string(),
        };
        format!(
            "bind={} storage={:?} database={} max_connections={}",
            self.bind_address(),
            self.storage.backend,
            database,
            self.database.max_connections
        )
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),
}
