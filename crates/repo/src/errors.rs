use thiserror::Error;
use uuid::Uuid;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Outcome of a failed repository call, identical across backends.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },
    /// The parent service of a write could not be loaded.
    #[error("load service {service_id}: {source}")]
    LoadService {
        service_id: Uuid,
        #[source]
        source: Box<RepositoryError>,
    },
    #[error("storage failure during {op}: {source}")]
    Storage {
        op: &'static str,
        #[source]
        source: BoxError,
    },
}

impl RepositoryError {
    pub fn service_not_found(id: Uuid) -> Self {
        Self::NotFound { entity: "service", key: id.to_string() }
    }

    pub fn translation_not_found(service_id: Uuid, language: &str) -> Self {
        Self::NotFound { entity: "translation", key: format!("{service_id}/{language}") }
    }

    pub fn storage(op: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Storage { op, source: source.into() }
    }

    pub(crate) fn load_service(service_id: Uuid, source: RepositoryError) -> Self {
        Self::LoadService { service_id, source: Box::new(source) }
    }

    /// True when the failure means "no such key", including a missing parent.
    pub fn is_not_found(&self) -> bool {
        match self {
            RepositoryError::NotFound { .. } => true,
            RepositoryError::LoadService { source, .. } => source.is_not_found(),
            RepositoryError::Storage { .. } => false,
        }
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            RepositoryError::NotFound { .. } => 1003,
            RepositoryError::LoadService { source, .. } => source.code(),
            RepositoryError::Storage { .. } => 1200,
        }
    }
}

/// Errors raised while building a repository from configuration.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("unsupported storage backend {name:?}; supported backends: {}", .supported.join(", "))]
    Unsupported { name: String, supported: Vec<&'static str> },
    #[error("invalid storage configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
