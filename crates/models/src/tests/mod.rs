use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

use crate::db::connect_with_config;

/// Connection and pool configuration tests
pub mod db_tests;

/// CRUD operations and relations across the three entities
pub mod crud_tests;

/// Transaction handling tests
pub mod transaction_tests;

/// Migrated SQLite database in a throwaway file under the temp dir.
pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let path = std::env::temp_dir().join(format!("models_test_{}.db", uuid::Uuid::new_v4()));
    let cfg = DatabaseConfig { url: format!("sqlite://{}?mode=rwc", path.display()), ..DatabaseConfig::default() };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
