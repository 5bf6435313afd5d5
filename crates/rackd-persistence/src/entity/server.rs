//! `SeaORM` Entity for server table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::query::QueryField;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "server")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub cpu: String,
    pub ram: String,
    pub hdd: String,
    pub status: Option<String>,
    pub environment_id: String,
    pub operating_system_id: String,
    pub discarded: bool,
    pub gmt_create: DateTime,
    pub gmt_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::environment::Entity",
        from = "Column::EnvironmentId",
        to = "super::environment::Column::Id"
    )]
    Environment,
    #[sea_orm(
        belongs_to = "super::operating_system::Entity",
        from = "Column::OperatingSystemId",
        to = "super::operating_system::Column::Id"
    )]
    OperatingSystem,
    #[sea_orm(has_many = "super::credential::Entity")]
    Credential,
    #[sea_orm(has_many = "super::server_application::Entity")]
    ServerApplication,
}

impl Related<super::environment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Environment.def()
    }
}

impl Related<super::operating_system::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OperatingSystem.def()
    }
}

impl Related<super::credential::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credential.def()
    }
}

impl Related<super::server_application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServerApplication.def()
    }
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        super::server_application::Relation::Application.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::server_application::Relation::Server.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields exposed to list-endpoint filtering and sorting.
pub fn query_field(name: &str) -> Option<QueryField<Column>> {
    match name {
        "id" => Some(QueryField::text(Column::Id)),
        "name" => Some(QueryField::text(Column::Name)),
        "cpu" => Some(QueryField::text(Column::Cpu)),
        "ram" => Some(QueryField::text(Column::Ram)),
        "hdd" => Some(QueryField::text(Column::Hdd)),
        "status" => Some(QueryField::text(Column::Status)),
        "environment_id" => Some(QueryField::text(Column::EnvironmentId)),
        "operating_system_id" => Some(QueryField::text(Column::OperatingSystemId)),
        _ => None,
    }
}
