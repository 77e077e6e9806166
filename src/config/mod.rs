use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub store: StoreBackend,
    /// Present when `store` is MySQL
    pub database: Option<DatabaseConfig>,
    pub server: ServerConfig,
    pub access: AccessConfig,
    pub reports: ReportsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Configuration(format!("Invalid LOG_FORMAT: {}", other))),
        }
    }
}

/// Where reports are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Mysql,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(StoreBackend::Mysql),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(AppError::Configuration(format!("Invalid REPORT_STORE: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessConfig {
    /// YAML file listing users, token digests and grants
    pub directory_path: PathBuf,
    pub permission_timeout_ms: u64,
}

impl AccessConfig {
    pub fn permission_timeout(&self) -> Duration {
        Duration::from_millis(self.permission_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportsConfig {
    pub max_page_size: i64,
}

/// Read and parse an env var, falling back to `default` when unset
pub(crate) fn env_or<T: FromStr>(key: &str, default: &str) -> Result<T> {
    env::var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::Configuration(format!("Invalid {}", key)))
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let store: StoreBackend = env::var("REPORT_STORE")
            .unwrap_or_else(|_| "mysql".to_string())
            .parse()?;

        let database = match store {
            StoreBackend::Mysql => Some(DatabaseConfig::from_env()?),
            StoreBackend::Memory => None,
        };

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_format: env::var("LOG_FORMAT")
                    .unwrap_or_else(|_| "pretty".to_string())
                    .parse()?,
            },
            store,
            database,
            server: ServerConfig::from_env()?,
            access: AccessConfig {
                directory_path: PathBuf::from(
                    env::var("ACCESS_DIRECTORY_PATH")
                        .unwrap_or_else(|_| "config/access.yaml".to_string()),
                ),
                permission_timeout_ms: env_or("PERMISSION_TIMEOUT_MS", "2000")?,
            },
            reports: ReportsConfig {
                max_page_size: env_or("REPORTS_MAX_PAGE_SIZE", "100")?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.access.permission_timeout_ms == 0 {
            return Err(AppError::Configuration(
                "Permission timeout must be greater than 0".to_string(),
            ));
        }

        if self.reports.max_page_size <= 0 {
            return Err(AppError::Configuration(
                "Max page size must be greater than 0".to_string(),
            ));
        }

        if self.store == StoreBackend::Mysql && self.database.is_none() {
            return Err(AppError::Configuration(
                "DATABASE_URL is required for the mysql store".to_string(),
            ));
        }

        if let Some(database) = &self.database {
            database.validate()?;
        }

        if self.server.workers == 0 {
            return Err(AppError::Configuration(
                "Server workers must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
