//! Initial schema: the six inventory tables plus the server/application
//! association table. Natural-key uniqueness is enforced at the service
//! layer against non-discarded rows only, so the columns carry plain
//! (non-unique) indexes.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Environment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Environment::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Environment::Name).string().not_null())
                    .col(
                        ColumnDef::new(Environment::Discarded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Environment::GmtCreate).date_time().not_null())
                    .col(
                        ColumnDef::new(Environment::GmtModified)
                            .date_time()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OperatingSystem::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OperatingSystem::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OperatingSystem::Name).string().not_null())
                    .col(ColumnDef::new(OperatingSystem::Version).string().not_null())
                    .col(
                        ColumnDef::new(OperatingSystem::Architect)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OperatingSystem::Discarded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(OperatingSystem::GmtCreate)
                            .date_time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OperatingSystem::GmtModified)
                            .date_time()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Application::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Application::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Application::Name).string().not_null())
                    .col(ColumnDef::new(Application::Version).string().not_null())
                    .col(ColumnDef::new(Application::Architect).string().not_null())
                    .col(
                        ColumnDef::new(Application::Discarded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Application::GmtCreate)
                            .date_time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Application::GmtModified)
                            .date_time()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ConnectionType::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConnectionType::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ConnectionType::Name).string().not_null())
                    .col(
                        ColumnDef::new(ConnectionType::Discarded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ConnectionType::GmtCreate)
                            .date_time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConnectionType::GmtModified)
                            .date_time()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Server::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Server::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Server::Name).string().not_null())
                    .col(ColumnDef::new(Server::Cpu).string().not_null())
                    .col(ColumnDef::new(Server::Ram).string().not_null())
                    .col(ColumnDef::new(Server::Hdd).string().not_null())
                    .col(ColumnDef::new(Server::Status).string().null())
                    .col(
                        ColumnDef::new(Server::EnvironmentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Server::OperatingSystemId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Server::Discarded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Server::GmtCreate).date_time().not_null())
                    .col(ColumnDef::new(Server::GmtModified).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_server_environment")
                            .from(Server::Table, Server::EnvironmentId)
                            .to(Environment::Table, Environment::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_server_operating_system")
                            .from(Server::Table, Server::OperatingSystemId)
                            .to(OperatingSystem::Table, OperatingSystem::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Credential::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Credential::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Credential::ServerId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Credential::ConnectionTypeId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Credential::Username).string().not_null())
                    .col(ColumnDef::new(Credential::Password).string().not_null())
                    .col(ColumnDef::new(Credential::LocalIp).string().null())
                    .col(ColumnDef::new(Credential::LocalPort).integer().null())
                    .col(ColumnDef::new(Credential::PublicIp).string().null())
                    .col(ColumnDef::new(Credential::PublicPort).integer().null())
                    .col(
                        ColumnDef::new(Credential::Discarded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Credential::GmtCreate)
                            .date_time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Credential::GmtModified)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_credential_server")
                            .from(Credential::Table, Credential::ServerId)
                            .to(Server::Table, Server::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_credential_connection_type")
                            .from(Credential::Table, Credential::ConnectionTypeId)
                            .to(ConnectionType::Table, ConnectionType::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ServerApplication::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServerApplication::ServerId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServerApplication::ApplicationId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServerApplication::InstallDir)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServerApplication::LogDir)
                            .string()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ServerApplication::ServerId)
                            .col(ServerApplication::ApplicationId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_server_application_server")
                            .from(ServerApplication::Table, ServerApplication::ServerId)
                            .to(Server::Table, Server::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_server_application_application")
                            .from(ServerApplication::Table, ServerApplication::ApplicationId)
                            .to(Application::Table, Application::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServerApplication::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Credential::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Server::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConnectionType::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Application::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OperatingSystem::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Environment::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Environment {
    Table,
    Id,
    Name,
    Discarded,
    GmtCreate,
    GmtModified,
}

#[derive(DeriveIden)]
enum OperatingSystem {
    Table,
    Id,
    Name,
    Version,
    Architect,
    Discarded,
    GmtCreate,
    GmtModified,
}

#[derive(DeriveIden)]
enum Application {
    Table,
    Id,
    Name,
    Version,
    Architect,
    Discarded,
    GmtCreate,
    GmtModified,
}

#[derive(DeriveIden)]
enum ConnectionType {
    Table,
    Id,
    Name,
    Discarded,
    GmtCreate,
    GmtModified,
}

#[derive(DeriveIden)]
enum Server {
    Table,
    Id,
    Name,
    Cpu,
    Ram,
    Hdd,
    Status,
    EnvironmentId,
    OperatingSystemId,
    Discarded,
    GmtCreate,
    GmtModified,
}

#[derive(DeriveIden)]
enum Credential {
    Table,
    Id,
    ServerId,
    ConnectionTypeId,
    Username,
    Password,
    LocalIp,
    LocalPort,
    PublicIp,
    PublicPort,
    Discarded,
    GmtCreate,
    GmtModified,
}

#[derive(DeriveIden)]
enum ServerApplication {
    Table,
    ServerId,
    ApplicationId,
    InstallDir,
    LogDir,
}
