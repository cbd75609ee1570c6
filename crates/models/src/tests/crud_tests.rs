use crate::{message, service, translation};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use anyhow::Result;
use uuid::Uuid;

use super::setup_test_db;

fn message_row(translation_id: Uuid, id: &str, ordinal: i32) -> message::ActiveModel {
    message::ActiveModel {
        translation_id: Set(translation_id),
        id: Set(id.to_string()),
        message: Set(format!("text for {id}")),
        description: Set(String::new()),
        positions: Set("[]".to_string()),
        status: Set("untranslated".to_string()),
        ordinal: Set(ordinal),
    }
}

/// Service -> translation -> message chain can be written and followed via relations
#[tokio::test]
async fn test_entity_chain_crud() -> Result<()> {
    let db = setup_test_db().await?;

    let svc = service::ActiveModel { id: Set(Uuid::new_v4()), name: Set("Checkout".into()) }.insert(&db).await?;
    let tr = translation::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_id: Set(svc.id),
        language: Set("en".into()),
        original: Set(true),
    }
    .insert(&db)
    .await?;
    message_row(tr.id, "hello", 0).insert(&db).await?;
    message_row(tr.id, "bye", 1).insert(&db).await?;

    let translations = svc.find_related(translation::Entity).all(&db).await?;
    assert_eq!(translations.len(), 1);
    assert_eq!(translations[0].language, "en");

    let messages = tr.find_related(message::Entity).order_by_asc(message::Column::Ordinal).all(&db).await?;
    let ids: Vec<_> = messages.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["hello", "bye"]);

    // Update in place
    let mut am: service::ActiveModel = svc.clone().into();
    am.name = Set("Checkout v2".into());
    am.update(&db).await?;
    let found = service::Entity::find_by_id(svc.id).one(&db).await?.expect("service");
    assert_eq!(found.name, "Checkout v2");
    Ok(())
}

/// Same language twice for one service violates the unique index
#[tokio::test]
async fn test_translation_language_unique() -> Result<()> {
    let db = setup_test_db().await?;
    let svc = service::ActiveModel { id: Set(Uuid::new_v4()), name: Set("Unique".into()) }.insert(&db).await?;
    let row = |id| translation::ActiveModel {
        id: Set(id),
        service_id: Set(svc.id),
        language: Set("lv".into()),
        original: Set(false),
    };
    row(Uuid::new_v4()).insert(&db).await?;
    assert!(row(Uuid::new_v4()).insert(&db).await.is_err());
    Ok(())
}

/// Deleting a service cascades to translations and messages
#[tokio::test]
async fn test_delete_cascades() -> Result<()> {
    let db = setup_test_db().await?;
    let svc = service::ActiveModel { id: Set(Uuid::new_v4()), name: Set("Cascade".into()) }.insert(&db).await?;
    let tr = translation::ActiveModel {
        id: Set(Uuid::new_v4()),
        service_id: Set(svc.id),
        language: Set("de".into()),
        original: Set(false),
    }
    .insert(&db)
    .await?;
    message_row(tr.id, "hello", 0).insert(&db).await?;

    let res = service::Entity::delete_by_id(svc.id).exec(&db).await?;
    assert_eq!(res.rows_affected, 1);

    let left = translation::Entity::find().filter(translation::Column::ServiceId.eq(svc.id)).all(&db).await?;
    assert!(left.is_empty());
    let left = message::Entity::find().filter(message::Column::TranslationId.eq(tr.id)).all(&db).await?;
    assert!(left.is_empty());
    Ok(())
}
