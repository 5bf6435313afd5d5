//! Operating system service

use chrono::Utc;
use validator::Validate;

use rackd_api::{ListRequest, Page};
use rackd_common::{RackdError, is_valid_name};
use rackd_persistence::entity::operating_system;
use rackd_persistence::query;
use rackd_persistence::sea_orm::*;

use crate::events::{EventPublisher, publish_all};
use crate::model::{
    OperatingSystem, OperatingSystemCreate, OperatingSystemDto, OperatingSystemUpdate,
};

const ENTITY: &str = "operating_system";

async fn find_active(
    db: &DatabaseConnection,
    id: &str,
) -> Result<Option<operating_system::Model>, DbErr> {
    operating_system::Entity::find_by_id(id)
        .filter(operating_system::Column::Discarded.eq(false))
        .one(db)
        .await
}

/// Natural key: (name, version, architect), unique among active records.
async fn natural_key_exists(
    db: &DatabaseConnection,
    name: &str,
    version: &str,
    architect: &str,
    exclude_id: Option<&str>,
) -> Result<bool, DbErr> {
    let mut select = operating_system::Entity::find()
        .filter(operating_system::Column::Discarded.eq(false))
        .filter(operating_system::Column::Name.eq(name))
        .filter(operating_system::Column::Version.eq(version))
        .filter(operating_system::Column::Architect.eq(architect));

    if let Some(id) = exclude_id {
        select = select.filter(operating_system::Column::Id.ne(id));
    }

    Ok(select.count(db).await? > 0)
}

pub async fn find_many(
    db: &DatabaseConnection,
    request: &ListRequest,
) -> anyhow::Result<Page<OperatingSystemDto>> {
    query::validate_fields(&request.fields, operating_system::query_field, &[])?;

    let base =
        operating_system::Entity::find().filter(operating_system::Column::Discarded.eq(false));
    let filtered = query::apply_filters(base, &request.filters, operating_system::query_field)?;
    let total_count = filtered.clone().count(db).await?;
    let sorted = query::apply_sort(filtered, &request.sort, operating_system::query_field)?;
    let models = query::apply_window(sorted, &request.window).all(db).await?;

    Ok(Page::with_window(total_count, &request.window, models).map(OperatingSystemDto::from))
}

pub async fn find_one(db: &DatabaseConnection, id: &str) -> anyhow::Result<OperatingSystemDto> {
    match find_active(db, id).await? {
        Some(model) => Ok(model.into()),
        None => Err(RackdError::NotFound(ENTITY.to_string(), id.to_string()).into()),
    }
}

pub async fn add_one(
    db: &DatabaseConnection,
    publisher: &dyn EventPublisher,
    payload: OperatingSystemCreate,
) -> anyhow::Result<OperatingSystemDto> {
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

    if natural_key_exists(db, &payload.name, &payload.version, &payload.architect, None).await? {
        return Err(RackdError::AlreadyExists(ENTITY.to_string(), payload.name).into());
    }

    let mut aggregate =
        OperatingSystem::create(payload.name, payload.version, payload.architect);
    let now = Utc::now().naive_utc();
    let model = operating_system::ActiveModel {
        id: Set(aggregate.id.clone()),
        name: Set(aggregate.name.clone()),
        version: Set(aggregate.version.clone()),
        architect: Set(aggregate.architect.clone()),
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
    payload: OperatingSystemUpdate,
) -> anyhow::Result<OperatingSystemDto> {
    payload
        .validate()
        .map_err(|e| RackdError::IllegalArgument(e.to_string()))?;

    let model = match find_active(db, id).await? {
        Some(model) => model,
        None => return Err(RackdError::NotFound(ENTITY.to_string(), id.to_string()).into()),
    };

    let mut aggregate = OperatingSystem::from(model.clone());
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
    if let Some(version) = payload.version {
        if aggregate.set_version(version.clone())? {
            active.version = Set(version);
        }
    }
    if let Some(architect) = payload.architect {
        if aggregate.set_architect(architect.clone())? {
            active.architect = Set(architect);
        }
    }

    let events = aggregate.take_events();
    if events.is_empty() {
        return Ok(model.into());
    }

    if natural_key_exists(
        db,
        &aggregate.name,
        &aggregate.version,
        &aggregate.architect,
        Some(id),
    )
    .await?
    {
        return Err(RackdError::AlreadyExists(ENTITY.to_string(), aggregate.name).into());
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

    let mut aggregate = OperatingSystem::from(model.clone());
    aggregate.discard()?;

    let mut active = model.into_active_model();
    active.discarded = Set(true);
    active.gmt_modified = Set(Utc::now().naive_utc());
    active.update(db).await?;

    publish_all(publisher, aggregate.take_events()).await;

    Ok(())
}
