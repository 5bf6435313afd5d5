//! `SeaORM` Entity for connection_type table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::query::QueryField;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "connection_type")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub discarded: bool,
    pub gmt_create: DateTime,
    pub gmt_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::credential::Entity")]
    Credential,
}

impl Related<super::credential::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credential.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields exposed to list-endpoint filtering and sorting.
pub fn query_field(name: &str) -> Option<QueryField<Column>> {
    match name {
        "id" => Some(QueryField::text(Column::Id)),
        "name" => Some(QueryField::text(Column::Name)),
        _ => None,
    }
}
