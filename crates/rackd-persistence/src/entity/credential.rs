//! `SeaORM` Entity for credential table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::query::QueryField;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "credential")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub server_id: String,
    pub connection_type_id: String,
    pub username: String,
    pub password: String,
    pub local_ip: Option<String>,
    pub local_port: Option<i32>,
    pub public_ip: Option<String>,
    pub public_port: Option<i32>,
    pub discarded: bool,
    pub gmt_create: DateTime,
    pub gmt_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::server::Entity",
        from = "Column::ServerId",
        to = "super::server::Column::Id"
    )]
    Server,
    #[sea_orm(
        belongs_to = "super::connection_type::Entity",
        from = "Column::ConnectionTypeId",
        to = "super::connection_type::Column::Id"
    )]
    ConnectionType,
}

impl Related<super::server::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Server.def()
    }
}

impl Related<super::connection_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConnectionType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields exposed to list-endpoint filtering and sorting.
pub fn query_field(name: &str) -> Option<QueryField<Column>> {
    match name {
        "id" => Some(QueryField::text(Column::Id)),
        "server_id" => Some(QueryField::text(Column::ServerId)),
        "connection_type_id" => Some(QueryField::text(Column::ConnectionTypeId)),
        "username" => Some(QueryField::text(Column::Username)),
        "local_ip" => Some(QueryField::text(Column::LocalIp)),
        "local_port" => Some(QueryField::integer(Column::LocalPort)),
        "public_ip" => Some(QueryField::text(Column::PublicIp)),
        "public_port" => Some(QueryField::integer(Column::PublicPort)),
        _ => None,
    }
}
