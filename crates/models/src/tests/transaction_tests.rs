use crate::{service, translation};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use anyhow::Result;
use uuid::Uuid;

use super::setup_test_db;

/// Test basic transaction commit
#[tokio::test]
async fn test_transaction_commit() -> Result<()> {
    let db = setup_test_db().await?;

    let txn = db.begin().await?;
    let created = service::ActiveModel { id: Set(Uuid::new_v4()), name: Set("tx_commit".into()) }.insert(&txn).await?;
    txn.commit().await?;

    let found = service::Entity::find_by_id(created.id).one(&db).await?;
    assert_eq!(found.map(|s| s.name), Some("tx_commit".to_string()));
    Ok(())
}

/// Test transaction rollback
#[tokio::test]
async fn test_transaction_rollback() -> Result<()> {
    let db = setup_test_db().await?;

    let txn = db.begin().await?;
    let created = service::ActiveModel { id: Set(Uuid::new_v4()), name: Set("tx_rollback".into()) }.insert(&txn).await?;
    txn.rollback().await?;

    assert!(service::Entity::find_by_id(created.id).one(&db).await?.is_none());
    Ok(())
}

/// A failing statement aborts everything written earlier in the same transaction
#[tokio::test]
async fn test_transaction_error_handling() -> Result<()> {
    let db = setup_test_db().await?;
    let svc = service::ActiveModel { id: Set(Uuid::new_v4()), name: Set("tx_error".into()) }.insert(&db).await?;

    let result = async {
        let txn = db.begin().await?;
        let row = |lang: &str| translation::ActiveModel {
            id: Set(Uuid::new_v4()),
            service_id: Set(svc.id),
            language: Set(lang.to_string()),
            original: Set(false),
        };
        row("en").insert(&txn).await?;
        // (service_id, language) is unique
        row("en").insert(&txn).await?;
        txn.commit().await?;
        Ok::<(), anyhow::Error>(())
    }
    .await;
    assert!(result.is_err());

    let left = translation::Entity::find().filter(translation::Column::ServiceId.eq(svc.id)).all(&db).await?;
    assert!(left.is_empty());
    Ok(())
}
