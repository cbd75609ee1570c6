use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::translation;

/// A message row. `positions` holds a JSON array of strings, `ordinal` the
/// order in which the message was first written to its translation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub translation_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text")]
    pub positions: String,
    pub status: String,
    pub ordinal: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Translation }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Translation => Entity::belongs_to(translation::Entity)
                .from(Column::TranslationId)
                .to(translation::Column::Id)
                .into(),
        }
    }
}

impl Related<translation::Entity> for Entity {
    fn to() -> RelationDef { Relation::Translation.def() }
}

impl ActiveModelBehavior for ActiveModel {}
