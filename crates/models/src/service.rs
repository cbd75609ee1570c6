use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Translation }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Translation => Entity::has_many(crate::translation::Entity).into(),
        }
    }
}

impl Related<crate::translation::Entity> for Entity {
    fn to() -> RelationDef { Relation::Translation.def() }
}

impl ActiveModelBehavior for ActiveModel {}
