//! Server service
//!
//! The server aggregate owns the credential set and the application
//! association set (install_dir/log_dir edge attributes). Referenced
//! environment, operating system, and application ids must exist among
//! active records.

use std::collections::HashMap;

use chrono::Utc;
use validator::Validate;

use rackd_api::{ListRequest, Page};
use rackd_common::{RackdError, is_valid_name};
use rackd_persistence::entity::{
    application, credential, environment, operating_system, server, server_application,
};
use rackd_persistence::query;
use rackd_persistence::sea_orm::*;

use crate::events::{EventPublisher, publish_all};
use crate::model::{
    CredentialDto, Server, ServerApplicationDto, ServerApplicationInput, ServerCreate, ServerDto,
    ServerStatus, ServerUpdate,
};

const ENTITY: &str = "server";

/// Relation names accepted in a `fields=` selection.
pub const RELATIONS: &[&str] = &["credentials", "applications"];

async fn find_active(db: &DatabaseConnection, id: &str) -> Result<Option<server::Model>, DbErr> {
    server::Entity::find_by_id(id)
        .filter(server::Column::Discarded.eq(false))
        .one(db)
        .await
}

/// Natural key: name, unique among active records.
async fn natural_key_exists(
    db: &DatabaseConnection,
    name: &str,
    exclude_id: Option<&str>,
) -> Result<bool, DbErr> {
    let mut select = server::Entity::find()
        .filter(server::Column::Discarded.eq(false))
        .filter(server::Column::Name.eq(name));

    if let Some(id) = exclude_id {
        select = select.filter(server::Column::Id.ne(id));
    }

    Ok(select.count(db).await? > 0)
}

async fn ensure_environment_exists(db: &DatabaseConnection, id: &str) -> anyhow::Result<()> {
    let count = environment::Entity::find_by_id(id)
        .filter(environment::Column::Discarded.eq(false))
        .count(db)
        .await?;
    if count == 0 {
        return Err(RackdError::NotFound("environment".to_string(), id.to_string()).into());
    }
    Ok(())
}

async fn ensure_operating_system_exists(db: &DatabaseConnection, id: &str) -> anyhow::Result<()> {
    let count = operating_system::Entity::find_by_id(id)
        .filter(operating_system::Column::Discarded.eq(false))
        .count(db)
        .await?;
    if count == 0 {
        return Err(RackdError::NotFound("operating_system".to_string(), id.to_string()).into());
    }
    Ok(())
}

async fn ensure_application_exists(db: &DatabaseConnection, id: &str) -> anyhow::Result<()> {
    let count = application::Entity::find_by_id(id)
        .filter(application::Column::Discarded.eq(false))
        .count(db)
        .await?;
    if count == 0 {
        return Err(RackdError::NotFound("application".to_string(), id.to_string()).into());
    }
    Ok(())
}

fn validate_status(status: Option<String>) -> Result<Option<String>, RackdError> {
    status
        .map(|s| s.parse::<ServerStatus>().map(|parsed| parsed.to_string()))
        .transpose()
}

fn wants(fields: &[String], relation: &str) -> bool {
    fields.is_empty() || fields.iter().any(|f| f == relation)
}

async fn load_credentials(
    db: &DatabaseConnection,
    server_ids: &[String],
) -> Result<HashMap<String, Vec<CredentialDto>>, DbErr> {
    let mut grouped: HashMap<String, Vec<CredentialDto>> = HashMap::new();
    if server_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = credential::Entity::find()
        .filter(credential::Column::Discarded.eq(false))
        .filter(credential::Column::ServerId.is_in(server_ids.iter().map(String::as_str)))
        .all(db)
        .await?;

    for row in rows {
        grouped
            .entry(row.server_id.clone())
            .or_default()
            .push(row.into());
    }

    Ok(grouped)
}

async fn load_applications(
    db: &DatabaseConnection,
    server_ids: &[String],
) -> Result<HashMap<String, Vec<ServerApplicationDto>>, DbErr> {
    let mut grouped: HashMap<String, Vec<ServerApplicationDto>> = HashMap::new();
    if server_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = server_application::Entity::find()
        .filter(server_application::Column::ServerId.is_in(server_ids.iter().map(String::as_str)))
        .all(db)
        .await?;

    for row in rows {
        grouped
            .entry(row.server_id.clone())
            .or_default()
            .push(row.into());
    }

    Ok(grouped)
}

async fn attach_relations(
    db: &DatabaseConnection,
    models: Vec<server::Model>,
    with_credentials: bool,
    with_applications: bool,
) -> Result<Vec<ServerDto>, DbErr> {
    let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();

    let mut credentials = if with_credentials {
        Some(load_credentials(db, &ids).await?)
    } else {
        None
    };
    let mut applications = if with_applications {
        Some(load_applications(db, &ids).await?)
    } else {
        None
    };

    Ok(models
        .into_iter()
        .map(|model| {
            let id = model.id.clone();
            let mut dto = ServerDto::from(model);
            if let Some(map) = credentials.as_mut() {
                dto.credentials = Some(map.remove(&id).unwrap_or_default());
            }
            if let Some(map) = applications.as_mut() {
                dto.applications = Some(map.remove(&id).unwrap_or_default());
            }
            dto
        })
        .collect())
}

async fn replace_application_edges(
    db: &DatabaseConnection,
    server_id: &str,
    inputs: &[ServerApplicationInput],
) -> anyhow::Result<()> {
    let mut seen: Vec<&str> = Vec::new();
    for input in inputs {
        if seen.contains(&input.application_id.as_str()) {
            return Err(RackdError::IllegalArgument(format!(
                "duplicate application '{}' in associations",
                input.application_id
            ))
            .into());
        }
        seen.push(&input.application_id);
        ensure_application_exists(db, &input.application_id).await?;
    }

    server_application::Entity::delete_many()
        .filter(server_application::Column::ServerId.eq(server_id))
        .exec(db)
        .await?;

    if !inputs.is_empty() {
        let edges: Vec<server_application::ActiveModel> = inputs
            .iter()
            .map(|input| server_application::ActiveModel {
                server_id: Set(server_id.to_string()),
                application_id: Set(input.application_id.clone()),
                install_dir: Set(input.install_dir.clone()),
                log_dir: Set(input.log_dir.clone()),
            })
            .collect();
        server_application::Entity::insert_many(edges).exec(db).await?;
    }

    Ok(())
}

pub async fn find_many(
    db: &DatabaseConnection,
    request: &ListRequest,
) -> anyhow::Result<Page<ServerDto>> {
    query::validate_fields(&request.fields, server::query_field, RELATIONS)?;

    let base = server::Entity::find().filter(server::Column::Discarded.eq(false));
    let filtered = query::apply_filters(base, &request.filters, server::query_field)?;
    let total_count = filtered.clone().count(db).await?;
    let sorted = query::apply_sort(filtered, &request.sort, server::query_field)?;
    let models = query::apply_window(sorted, &request.window).all(db).await?;

    let dtos = attach_relations(
        db,
        models,
        wants(&request.fields, "credentials"),
        wants(&request.fields, "applications"),
    )
    .await?;

    Ok(Page::with_window(total_count, &request.window, dtos))
}

pub async fn find_one(db: &DatabaseConnection, id: &str) -> anyhow::Result<ServerDto> {
    let model = match find_active(db, id).await? {
        Some(model) => model,
        None => return Err(RackdError::NotFound(ENTITY.to_string(), id.to_string()).into()),
    };

    let mut dtos = attach_relations(db, vec![model], true, true).await?;
    Ok(dtos.remove(0))
}

pub async fn add_one(
    db: &DatabaseConnection,
    publisher: &dyn EventPublisher,
    payload: ServerCreate,
) -> anyhow::Result<ServerDto> {
    payload
        .validate()
        .map_err(|e| RackdError::IllegalArgument(e.to_string()))?;
    if !is_valid_name(&payload.name) {
        return Err(RackdError::IllegalArgument(format!(
            "name '{}' contains illegal characters",
            payload.name
        ))
        .into());
    }

    let status = validate_status(payload.status)?;

    if natural_key_exists(db, &payload.name, None).await? {
        return Err(RackdError::AlreadyExists(ENTITY.to_string(), payload.name).into());
    }
    ensure_environment_exists(db, &payload.environment_id).await?;
    ensure_operating_system_exists(db, &payload.operating_system_id).await?;

    let mut aggregate = Server::create(
        payload.name,
        payload.cpu,
        payload.ram,
        payload.hdd,
        status,
        payload.environment_id,
        payload.operating_system_id,
    );

    let now = Utc::now().naive_utc();
    let model = server::ActiveModel {
        id: Set(aggregate.id.clone()),
        name: Set(aggregate.name.clone()),
        cpu: Set(aggregate.cpu.clone()),
        ram: Set(aggregate.ram.clone()),
        hdd: Set(aggregate.hdd.clone()),
        status: Set(aggregate.status.clone()),
        environment_id: Set(aggregate.environment_id.clone()),
        operating_system_id: Set(aggregate.operating_system_id.clone()),
        discarded: Set(false),
        gmt_create: Set(now),
        gmt_modified: Set(now),
    }
    .insert(db)
    .await?;

    if let Some(applications) = &payload.applications {
        replace_application_edges(db, &aggregate.id, applications).await?;
    }

    publish_all(publisher, aggregate.take_events()).await;

    let mut dtos = attach_relations(db, vec![model], true, true).await?;
    Ok(dtos.remove(0))
}

pub async fn update_one(
    db: &DatabaseConnection,
    publisher: &dyn EventPublisher,
    id: &str,
    payload: ServerUpdate,
) -> anyhow::Result<ServerDto> {
    payload
        .validate()
        .map_err(|e| RackdError::IllegalArgument(e.to_string()))?;

    let model = match find_active(db, id).await? {
        Some(model) => model,
        None => return Err(RackdError::NotFound(ENTITY.to_string(), id.to_string()).into()),
    };

    let mut aggregate = Server::from(model.clone());
    let mut active = model.clone().into_active_model();

    if let Some(name) = payload.name {
        if !is_valid_name(&name) {
            return Err(RackdError::IllegalArgument(format!(
                "name '{}' contains illegal characters",
                name
            ))
            .into());
        }
        if aggregate.set_name(name.clone())? {
            active.name = Set(name);
        }
    }
    if let Some(cpu) = payload.cpu {
        if aggregate.set_cpu(cpu.clone())? {
            active.cpu = Set(cpu);
        }
    }
    if let Some(ram) = payload.ram {
        if aggregate.set_ram(ram.clone())? {
            active.ram = Set(ram);
        }
    }
    if let Some(hdd) = payload.hdd {
        if aggregate.set_hdd(hdd.clone())? {
            active.hdd = Set(hdd);
        }
    }
    if payload.status.is_some() {
        let status = validate_status(payload.status)?;
        if aggregate.set_status(status.clone())? {
            active.status = Set(status);
        }
    }
    if let Some(environment_id) = payload.environment_id {
        ensure_environment_exists(db, &environment_id).await?;
        if aggregate.set_environment_id(environment_id.clone())? {
            active.environment_id = Set(environment_id);
        }
    }
    if let Some(operating_system_id) = payload.operating_system_id {
        ensure_operating_system_exists(db, &operating_system_id).await?;
        if aggregate.set_operating_system_id(operating_system_id.clone())? {
            active.operating_system_id = Set(operating_system_id);
        }
    }

    if natural_key_exists(db, &aggregate.name, Some(id)).await? {
        return Err(RackdError::AlreadyExists(ENTITY.to_string(), aggregate.name).into());
    }

    if let Some(applications) = &payload.applications {
        aggregate.replace_applications()?;
        replace_application_edges(db, id, applications).await?;
    }

    let events = aggregate.take_events();
    if !events.is_empty() {
        active.gmt_modified = Set(Utc::now().naive_utc());
        active.update(db).await?;
        publish_all(publisher, events).await;
    }

    find_one(db, id).await
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

    let mut aggregate = Server::from(model.clone());
    aggregate.discard()?;

    let mut active = model.into_active_model();
    active.discarded = Set(true);
    active.gmt_modified = Set(Utc::now().naive_utc());
    active.update(db).await?;

    publish_all(publisher, aggregate.take_events()).await;

    Ok(())
}
