#![cfg(test)]
use configs::DatabaseConfig;

use crate::sql::SqlRepository;

pub fn init_logging() {
    common::utils::logging::init_test_logging();
}

/// Fresh migrated SQLite database in its own file under the temp dir.
pub async fn sql_repo() -> Result<SqlRepository, anyhow::Error> {
    init_logging();
    let path = std::env::temp_dir().join(format!("repo_sql_{}.db", uuid::Uuid::new_v4()));
    let cfg = DatabaseConfig { url: format!("sqlite://{}?mode=rwc", path.display()), ..DatabaseConfig::default() };
    Ok(SqlRepository::connect(&cfg).await?)
}
