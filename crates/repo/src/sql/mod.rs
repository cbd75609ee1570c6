//! Repository over a relational database through SeaORM.
//!
//! Works against PostgreSQL in production and SQLite in tests; the schema is
//! owned by the `migration` crate.

use std::sync::Arc;

use async_trait::async_trait;
use configs::DatabaseConfig;
use migration::MigratorTrait;
use models::{message, service, translation};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{LoadTranslationsOpts, Message, MessageStatus, Service, Translation};
use crate::errors::{RepoResult, RepositoryError};
use crate::repository::{ServiceRepository, TranslationRepository};

fn db_err(op: &'static str) -> impl Fn(DbErr) -> RepositoryError {
    move |e| RepositoryError::storage(op, e)
}

/// Optional transaction opened by the caller. Writes issued with an ambient
/// transaction run inside it and leave commit/rollback to the caller.
#[derive(Clone, Copy, Default)]
pub struct TxContext<'a> {
    ambient: Option<&'a DatabaseTransaction>,
}

impl<'a> TxContext<'a> {
    pub fn ambient(txn: &'a DatabaseTransaction) -> Self {
        Self { ambient: Some(txn) }
    }

    pub fn transaction(&self) -> Option<&'a DatabaseTransaction> {
        self.ambient
    }
}

/// SeaORM-backed repository implementation.
#[derive(Clone)]
pub struct SqlRepository {
    db: DatabaseConnection,
    /// Present on SQLite only. A deferred transaction that read first cannot
    /// be promoted while another connection writes, so writes take turns.
    write_lock: Option<Arc<Mutex<()>>>,
}

impl SqlRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        let write_lock = (db.get_database_backend() == DatabaseBackend::Sqlite).then(|| Arc::new(Mutex::new(())));
        Self { db, write_lock }
    }

    /// Connect with pool settings from configuration, migrating when asked to.
    pub async fn connect(cfg: &DatabaseConfig) -> RepoResult<Self> {
        let db = models::db::connect_with_config(cfg).await.map_err(db_err("connect"))?;
        if cfg.run_migrations {
            migration::Migrator::up(&db, None).await.map_err(db_err("migrate"))?;
            info!("database_migrated");
        }
        Ok(Self::new(db))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Open a transaction that callers can pass to the `*_in` methods.
    /// On SQLite the caller should not run other writes on this repository
    /// until it commits or rolls back.
    pub async fn begin(&self) -> RepoResult<DatabaseTransaction> {
        self.db.begin().await.map_err(db_err("begin"))
    }

    async fn write_guard(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.write_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }

    #[instrument(skip(self, ctx, service), fields(service_id = %service.id, ambient = ctx.transaction().is_some()))]
    pub async fn save_service_in(&self, ctx: TxContext<'_>, mut service: Service) -> RepoResult<Service> {
        if service.id.is_nil() {
            service.id = Uuid::new_v4();
        }
        match ctx.transaction() {
            Some(txn) => upsert_service(txn, &service).await?,
            None => {
                let _guard = self.write_guard().await;
                upsert_service(&self.db, &service).await?
            }
        }
        info!(service_id = %service.id, "service_saved");
        Ok(service)
    }

    #[instrument(
        skip(self, ctx, translation),
        fields(language = %translation.language, messages = translation.messages.len(), ambient = ctx.transaction().is_some())
    )]
    pub async fn save_translation_in(
        &self,
        ctx: TxContext<'_>,
        service_id: Uuid,
        translation: &Translation,
    ) -> RepoResult<()> {
        if let Some(txn) = ctx.transaction() {
            write_translation(txn, service_id, translation).await?;
        } else {
            let _guard = self.write_guard().await;
            let txn = self.begin().await?;
            if let Err(e) = write_translation(&txn, service_id, translation).await {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = %rollback_err, "rollback_failed");
                }
                return Err(e);
            }
            txn.commit().await.map_err(db_err("commit"))?;
        }
        info!(service_id = %service_id, "translation_saved");
        Ok(())
    }
}

async fn upsert_service<C: ConnectionTrait>(conn: &C, service: &Service) -> RepoResult<()> {
    let am = service::ActiveModel { id: Set(service.id), name: Set(service.name.clone()) };
    service::Entity::insert(am)
        .on_conflict(OnConflict::column(service::Column::Id).update_column(service::Column::Name).to_owned())
        .exec_without_returning(conn)
        .await
        .map_err(db_err("save_service"))?;
    Ok(())
}

/// Parent check, translation find-or-create, then message upserts, all on `conn`.
async fn write_translation<C: ConnectionTrait>(conn: &C, service_id: Uuid, translation: &Translation) -> RepoResult<()> {
    let parent = service::Entity::find_by_id(service_id).one(conn).await.map_err(db_err("load_service"))?;
    if parent.is_none() {
        return Err(RepositoryError::load_service(service_id, RepositoryError::service_not_found(service_id)));
    }

    // DO UPDATE (not DO NOTHING) locks the translation row until commit, so
    // concurrent saves of one translation run one after another and the
    // ordinal read below sees every committed message.
    let am = translation::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_id: Set(service_id),
        language: Set(translation.language.clone()),
        original: Set(translation.original),
    };
    translation::Entity::insert(am)
        .on_conflict(
            OnConflict::columns([translation::Column::ServiceId, translation::Column::Language])
                .update_column(translation::Column::Original)
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .map_err(db_err("save_translation"))?;
    let translation_id = translation::Entity::find()
        .filter(translation::Column::ServiceId.eq(service_id))
        .filter(translation::Column::Language.eq(translation.language.as_str()))
        .one(conn)
        .await
        .map_err(db_err("load_translation"))?
        .ok_or_else(|| RepositoryError::storage("save_translation", "translation row missing after upsert"))?
        .id;

    // New messages go after everything already stored; conflicting ids keep their ordinal.
    let max_ordinal: Option<i32> = message::Entity::find()
        .select_only()
        .column_as(Expr::col(message::Column::Ordinal).max(), "max_ordinal")
        .filter(message::Column::TranslationId.eq(translation_id))
        .into_tuple::<Option<i32>>()
        .one(conn)
        .await
        .map_err(db_err("save_messages"))?
        .flatten();
    let base = max_ordinal.map_or(0, |max| max + 1);

    for (offset, msg) in translation.messages.iter().enumerate() {
        let positions = serde_json::to_string(&msg.positions).map_err(|e| RepositoryError::storage("encode positions", e))?;
        let am = message::ActiveModel {
            translation_id: Set(translation_id),
            id: Set(msg.id.clone()),
            message: Set(msg.message.clone()),
            description: Set(msg.description.clone()),
            positions: Set(positions),
            status: Set(msg.status.as_str().to_string()),
            ordinal: Set(base + offset as i32),
        };
        message::Entity::insert(am)
            .on_conflict(
                OnConflict::columns([message::Column::TranslationId, message::Column::Id])
                    .update_columns([
                        message::Column::Message,
                        message::Column::Description,
                        message::Column::Positions,
                        message::Column::Status,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(db_err("save_messages"))?;
    }
    Ok(())
}

fn message_from_row(row: message::Model) -> RepoResult<Message> {
    let positions: Vec<String> =
        serde_json::from_str(&row.positions).map_err(|e| RepositoryError::storage("decode positions", e))?;
    let status: MessageStatus = row.status.parse().map_err(|e: String| RepositoryError::storage("decode status", e))?;
    Ok(Message { id: row.id, message: row.message, description: row.description, positions, status })
}

#[async_trait]
impl ServiceRepository for SqlRepository {
    async fn save_service(&self, service: Service) -> RepoResult<Service> {
        self.save_service_in(TxContext::default(), service).await
    }

    #[instrument(skip(self))]
    async fn load_service(&self, id: Uuid) -> RepoResult<Service> {
        let row = service::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err("load_service"))?
            .ok_or_else(|| RepositoryError::service_not_found(id))?;
        Ok(Service { id: row.id, name: row.name })
    }

    #[instrument(skip(self))]
    async fn load_services(&self) -> RepoResult<Vec<Service>> {
        let rows = service::Entity::find()
            .order_by_asc(service::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err("load_services"))?;
        debug!(count = rows.len(), "services_loaded");
        Ok(rows.into_iter().map(|r| Service { id: r.id, name: r.name }).collect())
    }

    #[instrument(skip(self))]
    async fn delete_service(&self, id: Uuid) -> RepoResult<()> {
        let _guard = self.write_guard().await;
        let res = service::Entity::delete_by_id(id).exec(&self.db).await.map_err(db_err("delete_service"))?;
        if res.rows_affected == 0 {
            warn!(service_id = %id, "delete_missing_service");
            return Err(RepositoryError::service_not_found(id));
        }
        info!(service_id = %id, "service_deleted");
        Ok(())
    }
}

#[async_trait]
impl TranslationRepository for SqlRepository {
    async fn save_translation(&self, service_id: Uuid, translation: &Translation) -> RepoResult<()> {
        self.save_translation_in(TxContext::default(), service_id, translation).await
    }

    #[instrument(skip(self, opts), fields(filter = ?opts.filter_languages))]
    async fn load_translations(&self, service_id: Uuid, opts: &LoadTranslationsOpts) -> RepoResult<Vec<Translation>> {
        // Unknown services have no translation rows, so they fall out as an empty list.
        let mut query = translation::Entity::find()
            .find_also_related(message::Entity)
            .filter(translation::Column::ServiceId.eq(service_id));
        let languages = opts.normalized_languages();
        if !languages.is_empty() {
            query = query.filter(translation::Column::Language.is_in(languages));
        }
        let rows = query
            .order_by_asc(translation::Column::Language)
            .order_by_asc(message::Column::Ordinal)
            .all(&self.db)
            .await
            .map_err(db_err("load_translations"))?;

        // Rows arrive grouped by translation; start a new one whenever the row's translation changes.
        let mut groups: Vec<(Uuid, Translation)> = Vec::new();
        for (tr, msg) in rows {
            if groups.last().map(|(id, _)| *id) != Some(tr.id) {
                groups.push((tr.id, Translation { language: tr.language, original: tr.original, messages: Vec::new() }));
            }
            if let (Some(msg), Some((_, group))) = (msg, groups.last_mut()) {
                group.messages.push(message_from_row(msg)?);
            }
        }
        // Database collations differ; byte order matches the KV key order.
        let mut translations: Vec<Translation> = groups.into_iter().map(|(_, tr)| tr).collect();
        translations.sort_by(|a, b| a.language.cmp(&b.language));
        debug!(service_id = %service_id, count = translations.len(), "translations_loaded");
        Ok(translations)
    }
}
