//! Storage factory for creating repository instances
//!
//! The only place that names the concrete backends; callers receive the
//! contract as `Arc<dyn Repo>`.

use std::str::FromStr;
use std::sync::Arc;

use configs::{StorageConfig, KV_BACKEND_NAMES, SQL_BACKEND_NAMES};
use tracing::info;

use crate::errors::FactoryError;
use crate::kv::KvRepository;
use crate::repository::Repo;
use crate::sql::SqlRepository;

/// Storage backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Embedded ordered key-value store
    Kv,
    /// Relational database (PostgreSQL, SQLite)
    Sql,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Kv => "kv",
            BackendKind::Sql => "sql",
        }
    }

    /// Every accepted name, grouped by backend.
    pub fn supported_names() -> Vec<&'static str> {
        KV_BACKEND_NAMES.iter().chain(SQL_BACKEND_NAMES).copied().collect()
    }
}

impl FromStr for BackendKind {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if KV_BACKEND_NAMES.contains(&name.as_str()) {
            Ok(BackendKind::Kv)
        } else if SQL_BACKEND_NAMES.contains(&name.as_str()) {
            Ok(BackendKind::Sql)
        } else {
            Err(FactoryError::Unsupported { name: s.to_string(), supported: Self::supported_names() })
        }
    }
}

/// Build the repository named by `cfg.backend`.
pub async fn new_repository(cfg: &StorageConfig) -> Result<Arc<dyn Repo>, FactoryError> {
    let kind = BackendKind::from_str(&cfg.backend)?;
    let mut cfg = cfg.clone();
    cfg.normalize_and_validate().map_err(|e| FactoryError::Config(e.to_string()))?;

    let repo: Arc<dyn Repo> = match kind {
        BackendKind::Kv => match cfg.kv.path.as_deref() {
            Some(path) => Arc::new(KvRepository::open(path).await?),
            None => Arc::new(KvRepository::in_memory()?),
        },
        BackendKind::Sql => Arc::new(SqlRepository::connect(&cfg.database).await?),
    };
    info!(backend = kind.as_str(), "repository_ready");
    Ok(repo)
}
