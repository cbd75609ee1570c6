use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{message, service};

/// One language of a service. `(service_id, language)` is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "translation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub service_id: Uuid,
    pub language: String,
    pub original: bool,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Service, Message }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .into(),
            Relation::Message => Entity::has_many(message::Entity).into(),
        }
    }
}

impl Related<service::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl Related<message::Entity> for Entity {
    fn to() -> RelationDef { Relation::Message.def() }
}

impl ActiveModelBehavior for ActiveModel {}
