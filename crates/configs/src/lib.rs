use std::path::PathBuf;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

/// Backend names accepted in `storage.backend`, canonical name first.
pub const KV_BACKEND_NAMES: &[&str] = &["kv", "redb", "badger"];
pub const SQL_BACKEND_NAMES: &[&str] = &["sql", "postgres", "sqlite"];

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub kv: KvConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: default_backend(), kv: KvConfig::default(), database: DatabaseConfig::default() }
    }
}

/// Embedded store settings. Without a path the store lives in memory.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct KvConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
            run_migrations: default_run_migrations(),
        }
    }
}

fn default_backend() -> String { "kv".into() }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_run_migrations() -> bool { true }

pub fn load_default() -> Result<AppConfig> {
    let _ = dotenvy::dotenv();
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.storage.normalize_and_validate()
    }
}

impl StorageConfig {
    /// In-memory KV store; handy for tests and throwaway runs.
    pub fn kv_in_memory() -> Self {
        Self { backend: "kv".into(), ..Self::default() }
    }

    pub fn kv_at(path: impl Into<PathBuf>) -> Self {
        Self { backend: "kv".into(), kv: KvConfig { path: Some(path.into()) }, ..Self::default() }
    }

    pub fn sql(url: impl Into<String>) -> Self {
        Self {
            backend: "sql".into(),
            database: DatabaseConfig { url: url.into(), ..DatabaseConfig::default() },
            ..Self::default()
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.backend = self.backend.trim().to_ascii_lowercase();
        if self.backend.is_empty() {
            self.backend = default_backend();
        }
        if self.is_sql() {
            self.database.normalize_from_env();
            self.database.validate()?;
        } else if self.is_kv() {
            self.kv.normalize_from_env();
        }
        // Unknown names are reported by the repository factory, which owns the list of backends.
        Ok(())
    }

    pub fn is_kv(&self) -> bool {
        KV_BACKEND_NAMES.contains(&self.backend.as_str())
    }

    pub fn is_sql(&self) -> bool {
        SQL_BACKEND_NAMES.contains(&self.backend.as_str())
    }
}

impl KvConfig {
    pub fn normalize_from_env(&mut self) {
        if self.path.as_ref().map_or(true, |p| p.as_os_str().is_empty()) {
            self.path = std::env::var("KV_PATH").ok().filter(|p| !p.trim().is_empty()).map(PathBuf::from);
        }
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        // fall back to DATABASE_URL when the file leaves url empty
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("storage.database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://") || lower.starts_with("sqlite:")) {
            return Err(anyhow!("storage.database.url must start with postgres://, postgresql:// or sqlite:"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("storage.database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("storage.database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("storage.database timeouts must be positive seconds"));
        }
        Ok(())
    }
}
