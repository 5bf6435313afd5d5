//! Credential service
//!
//! A credential belongs to exactly one server and references a connection
//! type (SSH, RDP, ...). Both must exist among active records.

use chrono::Utc;
use validator::Validate;

use rackd_api::{ListRequest, Page};
use rackd_common::RackdError;
use rackd_persistence::entity::{connection_type, credential, server};
use rackd_persistence::query;
use rackd_persistence::sea_orm::*;

use crate::events::{EventPublisher, publish_all};
use crate::model::{Credential, CredentialCreate, CredentialDto, CredentialUpdate};

const ENTITY: &str = "credential";

async fn find_active(
    db: &DatabaseConnection,
    id: &str,
) -> Result<Option<credential::Model>, DbErr> {
    credential::Entity::find_by_id(id)
        .filter(credential::Column::Discarded.eq(false))
        .one(db)
        .await
}

/// Natural key: (server, connection type, username), unique among active
/// records.
async fn natural_key_exists(
    db: &DatabaseConnection,
    server_id: &str,
    connection_type_id: &str,
    username: &str,
    exclude_id: Option<&str>,
) -> Result<bool, DbErr> {
    let mut select = credential::Entity::find()
        .filter(credential::Column::Discarded.eq(false))
        .filter(credential::Column::ServerId.eq(server_id))
        .filter(credential::Column::ConnectionTypeId.eq(connection_type_id))
        .filter(credential::Column::Username.eq(username));

    if let Some(id) = exclude_id {
        select = select.filter(credential::Column::Id.ne(id));
    }

    Ok(select.count(db).await? > 0)
}

async fn ensure_server_exists(db: &DatabaseConnection, id: &str) -> anyhow::Result<()> {
    let count = server::Entity::find_by_id(id)
        .filter(server::Column::Discarded.eq(false))
        .count(db)
        .await?;
    if count == 0 {
        return Err(RackdError::NotFound("server".to_string(), id.to_string()).into());
    }
    Ok(())
}

async fn ensure_connection_type_exists(db: &DatabaseConnection, id: &str) -> anyhow::Result<()> {
    let count = connection_type::Entity::find_by_id(id)
        .filter(connection_type::Column::Discarded.eq(false))
        .count(db)
        .await?;
    if count == 0 {
        return Err(RackdError::NotFound("connection_type".to_string(), id.to_string()).into());
    }
    Ok(())
}

pub async fn find_many(
    db: &DatabaseConnection,
    request: &ListRequest,
) -> anyhow::Result<Page<CredentialDto>> {
    query::validate_fields(&request.fields, credential::query_field, &[])?;

    let base = credential::Entity::find().filter(credential::Column::Discarded.eq(false));
    let filtered = query::apply_filters(base, &request.filters, credential::query_field)?;
    let total_count = filtered.clone().count(db).await?;
    let sorted = query::apply_sort(filtered, &request.sort, credential::query_field)?;
    let models = query::apply_window(sorted, &request.window).all(db).await?;

    Ok(Page::with_window(total_count, &request.window, models).map(CredentialDto::from))
}

pub async fn find_one(db: &DatabaseConnection, id: &str) -> anyhow::Result<CredentialDto> {
    match find_active(db, id).await? {
        Some(model) => Ok(model.into()),
        None => Err(RackdError::NotFound(ENTITY.to_string(), id.to_string()).into()),
    }
}

pub async fn add_one(
    db: &DatabaseConnection,
    publisher: &dyn EventPublisher,
    payload: CredentialCreate,
) -> anyhow::Result<CredentialDto> {
    payload
        .validate()
        .map_err(|e| RackdError::IllegalArgument(e.to_string()))?;

    ensure_server_exists(db, &payload.server_id).await?;
    ensure_connection_type_exists(db, &payload.connection_type_id).await?;

    if natural_key_exists(
        db,
        &payload.server_id,
        &payload.connection_type_id,
        &payload.username,
        None,
    )
    .await?
    {
        return Err(RackdError::AlreadyExists(ENTITY.to_string(), payload.username).into());
    }

    let mut aggregate = Credential::create(
        payload.server_id,
        payload.connection_type_id,
        payload.username,
        payload.password,
        payload.local_ip,
        payload.local_port,
        payload.public_ip,
        payload.public_port,
    );

    let now = Utc::now().naive_utc();
    let model = credential::ActiveModel {
        id: Set(aggregate.id.clone()),
        server_id: Set(aggregate.server_id.clone()),
        connection_type_id: Set(aggregate.connection_type_id.clone()),
        username: Set(aggregate.username.clone()),
        password: Set(aggregate.password.clone()),
        local_ip: Set(aggregate.local_ip.clone()),
        local_port: Set(aggregate.local_port),
        public_ip: Set(aggregate.public_ip.clone()),
        public_port: Set(aggregate.public_port),
        discarded: Set(false),
        gmt_create: Set(now),
        gmt_modified: Set(now),
    }
    .insert(db)
    .await?;

    publish_all(publisher, aggregate.take_events()).await;

    Ok(model.into())
}

pub async fn update_one(
    db: &DatabaseConnection,
    publisher: &dyn EventPublisher,
    id: &str,
    payload: CredentialUpdate,
) -> anyhow::Result<CredentialDto> {
    payload
        .validate()
        .map_err(|e| RackdError::IllegalArgument(e.to_string()))?;

    let model = match find_active(db, id).await? {
        Some(model) => model,
        None => return Err(RackdError::NotFound(ENTITY.to_string(), id.to_string()).into()),
    };

    let mut aggregate = Credential::from(model.clone());
    let mut active = model.clone().into_active_model();

    if let Some(connection_type_id) = payload.connection_type_id {
        ensure_connection_type_exists(db, &connection_type_id).await?;
        if aggregate.set_connection_type_id(connection_type_id.clone())? {
            active.connection_type_id = Set(connection_type_id);
        }
    }
    if let Some(username) = payload.username {
        if aggregate.set_username(username.clone())? {
            active.username = Set(username);
        }
    }
    if let Some(password) = payload.password {
        if aggregate.set_password(password.clone())? {
            active.password = Set(password);
        }
    }
    if let Some(local_ip) = payload.local_ip {
        if aggregate.set_local_ip(Some(local_ip.clone()))? {
            active.local_ip = Set(Some(local_ip));
        }
    }
    if let Some(local_port) = payload.local_port {
        if aggregate.set_local_port(Some(local_port))? {
            active.local_port = Set(Some(local_port));
        }
    }
    if let Some(public_ip) = payload.public_ip {
        if aggregate.set_public_ip(Some(public_ip.clone()))? {
            active.public_ip = Set(Some(public_ip));
        }
    }
    if let Some(public_port) = payload.public_port {
        if aggregate.set_public_port(Some(public_port))? {
            active.public_port = Set(Some(public_port));
        }
    }

    let events = aggregate.take_events();
    if events.is_empty() {
        return Ok(model.into());
    }

    if natural_key_exists(
        db,
        &aggregate.server_id,
        &aggregate.connection_type_id,
        &aggregate.username,
        Some(id),
    )
    .await?
    {
        return Err(RackdError::AlreadyExists(ENTITY.to_string(), aggregate.username).into());
    }

    active.gmt_modified = Set(Utc::now().naive_utc());
    let updated = active.update(db).await?;

    publish_all(publisher, events).await;

    Ok(updated.into())
}

pub async fn discard_one(
    db: &DatabaseConnection,
    publisher: &dyn EventPublisher,
    id: &str,
) -> anyhow::Result<()> {
    let model = match find_active(db, id).await? {
        Some(model) => model,
        None => return Err(RackdError::NotFound(ENTITY.to_string(), id.to_string()).into()),
    };

    let mut aggregate = Credential::from(model.clone());
    aggregate.discard()?;

    let mut active = model.into_active_model();
    active.discarded = Set(true);
    active.gmt_modified = Set(Utc::now().naive_utc());
    active.update(db).await?;

    publish_all(publisher, aggregate.take_events()).await;

    Ok(())
}
