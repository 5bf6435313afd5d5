//! `SeaORM` Entity for environment table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::query::QueryField;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "environment")]
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
    #[sea_orm(has_many = "super::server::Entity")]
    Server,
}

impl Related<super::server::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Server.def()
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
