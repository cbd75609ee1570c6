//! Repository over an embedded, ordered, transactional key-value store (redb).
//!
//! Every value lives in one table keyed by the strings built in [`keys`].
//! There are no foreign keys, so writes that need a parent service load it
//! first inside the same write transaction.

pub mod keys;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use redb::backends::InMemoryBackend;
use redb::{Database, ReadOnlyTable, ReadableTable, Table, TableDefinition};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{LoadTranslationsOpts, Service, Translation};
use crate::errors::{RepoResult, RepositoryError};
use crate::repository::{ServiceRepository, TranslationRepository};

const ENTRIES: TableDefinition<&str, &[u8]> = TableDefinition::new("entries");

type Entries<'txn> = Table<'txn, &'static str, &'static [u8]>;
type ReadEntries = ReadOnlyTable<&'static str, &'static [u8]>;

fn storage<E: Into<redb::Error>>(op: &'static str) -> impl Fn(E) -> RepositoryError {
    move |e| {
        let e: redb::Error = e.into();
        RepositoryError::storage(op, e)
    }
}

/// KV-backed repository. Cloning shares the underlying database handle.
#[derive(Clone)]
pub struct KvRepository {
    db: Arc<Database>,
}

impl KvRepository {
    /// Open or create a database file, creating its directory if needed.
    pub async fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let path = path.as_ref().to_path_buf();
        common::env::ensure_parent_dir(&path)
            .await
            .map_err(|e| RepositoryError::storage("open", e))?;
        let shown = path.display().to_string();
        let db = tokio::task::spawn_blocking(move || Database::create(&path))
            .await
            .map_err(|e| RepositoryError::storage("open", e))?
            .map_err(storage("open"))?;
        info!(path = %shown, "kv_store_opened");
        Self::init(db)
    }

    /// Volatile store, dropped with the last handle.
    pub fn in_memory() -> RepoResult<Self> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .map_err(storage("open"))?;
        info!("kv_store_opened_in_memory");
        Self::init(db)
    }

    fn init(db: Database) -> RepoResult<Self> {
        // Create the table up front so read transactions can always open it.
        write(&db, "init", |_| Ok(()))?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Run a blocking store closure off the async runtime.
    async fn run<T, F>(&self, op: &'static str, f: F) -> RepoResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> RepoResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| RepositoryError::storage(op, e))?
    }
}

/// One read-write transaction: commit when `f` succeeds, abort otherwise.
fn write<T>(db: &Database, op: &'static str, f: impl FnOnce(&mut Entries<'_>) -> RepoResult<T>) -> RepoResult<T> {
    let txn = db.begin_write().map_err(storage(op))?;
    let result = {
        let mut table = txn.open_table(ENTRIES).map_err(storage(op))?;
        f(&mut table)
    };
    match result {
        Ok(value) => {
            txn.commit().map_err(storage(op))?;
            Ok(value)
        }
        Err(e) => {
            if let Err(abort_err) = txn.abort() {
                warn!(op, error = %abort_err, "kv_abort_failed");
            }
            Err(e)
        }
    }
}

fn read<T>(db: &Database, op: &'static str, f: impl FnOnce(&ReadEntries) -> RepoResult<T>) -> RepoResult<T> {
    let txn = db.begin_read().map_err(storage(op))?;
    let table = txn.open_table(ENTRIES).map_err(storage(op))?;
    f(&table)
}

fn get_service(table: &impl ReadableTable<&'static str, &'static [u8]>, id: Uuid) -> RepoResult<Service> {
    let key = keys::service(id);
    let guard = table
        .get(key.as_str())
        .map_err(storage("load_service"))?
        .ok_or_else(|| RepositoryError::service_not_found(id))?;
    keys::decode(guard.value())
}

fn get_translation(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    service_id: Uuid,
    language: &str,
) -> RepoResult<Option<Translation>> {
    let key = keys::translation(service_id, language);
    match table.get(key.as_str()).map_err(storage("load_translation"))? {
        Some(guard) => keys::decode(guard.value()).map(Some),
        None => Ok(None),
    }
}

/// Visit every `(key, value)` whose key starts with `prefix`, in key order.
fn scan_prefix(
    table: &impl ReadableTable<&'static str, &'static [u8]>,
    prefix: &str,
    mut visit: impl FnMut(&str, &[u8]) -> RepoResult<()>,
) -> RepoResult<()> {
    for entry in table.range(prefix..).map_err(storage("scan"))? {
        let (key, value) = entry.map_err(storage("scan"))?;
        if !key.value().starts_with(prefix) {
            break;
        }
        visit(key.value(), value.value())?;
    }
    Ok(())
}

#[async_trait]
impl ServiceRepository for KvRepository {
    #[instrument(skip(self, service), fields(service_id = %service.id))]
    async fn save_service(&self, mut service: Service) -> RepoResult<Service> {
        if service.id.is_nil() {
            service.id = Uuid::new_v4();
        }
        let saved = self
            .run("save_service", move |db| {
                let bytes = keys::encode(&service)?;
                write(db, "save_service", |table| {
                    table
                        .insert(keys::service(service.id).as_str(), bytes.as_slice())
                        .map_err(storage("save_service"))?;
                    Ok(())
                })?;
                Ok(service)
            })
            .await?;
        info!(service_id = %saved.id, "service_saved");
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn load_service(&self, id: Uuid) -> RepoResult<Service> {
        self.run("load_service", move |db| read(db, "load_service", |table| get_service(table, id)))
            .await
    }

    #[instrument(skip(self))]
    async fn load_services(&self) -> RepoResult<Vec<Service>> {
        let services: Vec<Service> = self
            .run("load_services", |db| {
                read(db, "load_services", |table| {
                    let mut out = Vec::new();
                    scan_prefix(table, keys::SERVICE_PREFIX, |_, value| {
                        out.push(keys::decode(value)?);
                        Ok(())
                    })?;
                    Ok(out)
                })
            })
            .await?;
        debug!(count = services.len(), "services_loaded");
        Ok(services)
    }

    #[instrument(skip(self))]
    async fn delete_service(&self, id: Uuid) -> RepoResult<()> {
        let removed = self
            .run("delete_service", move |db| {
                write(db, "delete_service", |table| {
                    // redb's remove is silent on missing keys
                    let service_key = keys::service(id);
                    let exists = table
                        .get(service_key.as_str())
                        .map_err(storage("delete_service"))?
                        .is_some();
                    if !exists {
                        return Err(RepositoryError::service_not_found(id));
                    }

                    let mut translation_keys = Vec::new();
                    scan_prefix(&*table, &keys::translation_prefix(id), |key, _| {
                        translation_keys.push(key.to_string());
                        Ok(())
                    })?;
                    for key in &translation_keys {
                        table.remove(key.as_str()).map_err(storage("delete_service"))?;
                    }
                    table.remove(service_key.as_str()).map_err(storage("delete_service"))?;
                    Ok(translation_keys.len())
                })
            })
            .await;

        match removed {
            Ok(translations) => {
                info!(service_id = %id, translations, "service_deleted");
                Ok(())
            }
            Err(e) => {
                if e.is_not_found() {
                    warn!(service_id = %id, "delete_missing_service");
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl TranslationRepository for KvRepository {
    #[instrument(skip(self, translation), fields(language = %translation.language, messages = translation.messages.len()))]
    async fn save_translation(&self, service_id: Uuid, translation: &Translation) -> RepoResult<()> {
        let incoming = translation.clone();
        self.run("save_translation", move |db| {
            write(db, "save_translation", |table| {
                get_service(&*table, service_id).map_err(|e| RepositoryError::load_service(service_id, e))?;

                let mut stored = get_translation(&*table, service_id, &incoming.language)?
                    .unwrap_or_else(|| Translation::new(incoming.language.clone()));
                stored.original = incoming.original;
                stored.merge_messages(incoming.messages);

                let bytes = keys::encode(&stored)?;
                table
                    .insert(keys::translation(service_id, &stored.language).as_str(), bytes.as_slice())
                    .map_err(storage("save_translation"))?;
                Ok(())
            })
        })
        .await?;
        info!(service_id = %service_id, "translation_saved");
        Ok(())
    }

    #[instrument(skip(self, opts), fields(filter = ?opts.filter_languages))]
    async fn load_translations(&self, service_id: Uuid, opts: &LoadTranslationsOpts) -> RepoResult<Vec<Translation>> {
        let languages = opts.normalized_languages();
        let translations: Vec<Translation> = self
            .run("load_translations", move |db| {
                read(db, "load_translations", |table| {
                    match get_service(table, service_id) {
                        Ok(_) => {}
                        Err(e) if e.is_not_found() => return Ok(Vec::new()),
                        Err(e) => return Err(e),
                    }

                    if !languages.is_empty() {
                        let mut out = Vec::with_capacity(languages.len());
                        for language in &languages {
                            if let Some(translation) = get_translation(table, service_id, language)? {
                                out.push(translation);
                            }
                        }
                        return Ok(out);
                    }

                    let mut out = Vec::new();
                    scan_prefix(table, &keys::translation_prefix(service_id), |_, value| {
                        out.push(keys::decode(value)?);
                        Ok(())
                    })?;
                    Ok(out)
                })
            })
            .await?;
        debug!(service_id = %service_id, count = translations.len(), "translations_loaded");
        Ok(translations)
    }
}
