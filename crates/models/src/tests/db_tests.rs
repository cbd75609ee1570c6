use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use anyhow::Result;

use super::setup_test_db;

/// Migrated database answers queries and reports the SQLite backend
#[tokio::test]
async fn test_basic_connection() -> Result<()> {
    let db = setup_test_db().await?;
    assert_eq!(db.get_database_backend(), DatabaseBackend::Sqlite);

    let stmt = Statement::from_string(DatabaseBackend::Sqlite, "SELECT 1 AS test".to_string());
    let row = db.query_one(stmt).await?.expect("one row");
    let test_value: i32 = row.try_get("", "test")?;
    assert_eq!(test_value, 1);
    Ok(())
}

/// All three tables exist after migrating
#[tokio::test]
async fn test_schema_created() -> Result<()> {
    let db = setup_test_db().await?;
    for table in ["service", "translation", "message"] {
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
            [table.into()],
        );
        assert!(db.query_one(stmt).await?.is_some(), "missing table {table}");
    }
    Ok(())
}
