use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{LoadTranslationsOpts, Service, Translation};
use crate::errors::{RepoResult, RepositoryError};

/// Persistence of services, the roots of the data model.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    /// Insert or update by id. A nil id is replaced by a fresh v4 id; the stored value is returned.
    async fn save_service(&self, service: Service) -> RepoResult<Service>;
    async fn load_service(&self, id: Uuid) -> RepoResult<Service>;
    async fn load_services(&self) -> RepoResult<Vec<Service>>;
    /// Fails with `NotFound` when nothing was stored under `id`.
    async fn delete_service(&self, id: Uuid) -> RepoResult<()>;
}

/// Persistence of per-language translations of a service.
#[async_trait]
pub trait TranslationRepository: Send + Sync {
    /// Find-or-create the `(service_id, language)` translation and upsert its
    /// messages by id, atomically. A missing service yields a `LoadService`
    /// error that classifies as not found, and nothing is written.
    async fn save_translation(&self, service_id: Uuid, translation: &Translation) -> RepoResult<()>;

    /// Translations of a service ordered by language. Unknown services give an
    /// empty list; requested languages that do not exist are skipped.
    async fn load_translations(&self, service_id: Uuid, opts: &LoadTranslationsOpts) -> RepoResult<Vec<Translation>>;

    async fn load_translation(&self, service_id: Uuid, language: &str) -> RepoResult<Translation> {
        self.load_translations(service_id, &LoadTranslationsOpts::languages([language]))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::translation_not_found(service_id, language))
    }
}

/// The full storage contract handed to the transport layer.
pub trait Repo: ServiceRepository + TranslationRepository {}

impl<T: ServiceRepository + TranslationRepository + ?Sized> Repo for T {}
