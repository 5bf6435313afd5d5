//! Service-level tests against an in-memory SQLite database.

use std::collections::HashSet;

use rackd_api::ListRequest;
use rackd_common::RackdError;
use rackd_inventory::events::{BroadcastEventPublisher, DomainEventKind};
use rackd_inventory::model::{
    ApplicationCreate, ApplicationUpdate, ConnectionTypeCreate, CredentialCreate,
    EnvironmentCreate, EnvironmentDto, ServerApplicationInput, ServerCreate, ServerDto,
    ServerUpdate,
};
use rackd_inventory::service::{
    application, connection_type, credential, environment, operating_system, server,
};
use rackd_inventory::model::OperatingSystemCreate;
use rackd_persistence::entity;
use rackd_persistence::sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema,
};

async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await.unwrap();

    let schema = Schema::new(DbBackend::Sqlite);
    let backend = db.get_database_backend();
    db.execute(backend.build(&schema.create_table_from_entity(entity::environment::Entity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(entity::operating_system::Entity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(entity::application::Entity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(entity::connection_type::Entity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(entity::server::Entity)))
        .await
        .unwrap();
    db.execute(backend.build(&schema.create_table_from_entity(entity::credential::Entity)))
        .await
        .unwrap();
    db.execute(
        backend.build(&schema.create_table_from_entity(entity::server_application::Entity)),
    )
    .await
    .unwrap();

    db
}

fn list(params: &[(&str, &str)]) -> ListRequest {
    let pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ListRequest::parse(&pairs).unwrap()
}

async fn create_environment(
    db: &DatabaseConnection,
    publisher: &BroadcastEventPublisher,
    name: &str,
) -> EnvironmentDto {
    environment::add_one(
        db,
        publisher,
        EnvironmentCreate {
            name: name.to_string(),
        },
    )
    .await
    .unwrap()
}

async fn create_server_fixture(
    db: &DatabaseConnection,
    publisher: &BroadcastEventPublisher,
    name: &str,
) -> ServerDto {
    let env = create_environment(db, publisher, &format!("env-for-{}", name)).await;
    let os = operating_system::add_one(
        db,
        publisher,
        OperatingSystemCreate {
            name: format!("os-for-{}", name),
            version: "22.04".to_string(),
            architect: "x86_64".to_string(),
        },
    )
    .await
    .unwrap();

    server::add_one(
        db,
        publisher,
        ServerCreate {
            name: name.to_string(),
            cpu: "4".to_string(),
            ram: "16GB".to_string(),
            hdd: "100GB".to_string(),
            status: Some("running".to_string()),
            environment_id: env.id,
            operating_system_id: os.id,
            applications: None,
        },
    )
    .await
    .unwrap()
}

fn kind_of(err: &anyhow::Error) -> &RackdError {
    err.downcast_ref::<RackdError>().expect("expected RackdError")
}

#[tokio::test]
async fn test_add_one_find_one_round_trip() {
    let db = setup_db().await;
    let publisher = BroadcastEventPublisher::new(64);

    let created = application::add_one(
        &db,
        &publisher,
        ApplicationCreate {
            name: "nginx".to_string(),
            version: "1.27".to_string(),
            architect: "x86_64".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(created.id.len(), 32);
    assert!(!created.discarded);

    let found = application::find_one(&db, &created.id).await.unwrap();
    assert_eq!(found.name, "nginx");
    assert_eq!(found.version, "1.27");
    assert_eq!(found.architect, "x86_64");
    assert!(!found.discarded);
}

#[tokio::test]
async fn test_natural_key_collision_only_against_active_records() {
    let db = setup_db().await;
    let publisher = BroadcastEventPublisher::new(64);

    let first = create_environment(&db, &publisher, "prod").await;

    let err = environment::add_one(
        &db,
        &publisher,
        EnvironmentCreate {
            name: "prod".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(kind_of(&err), RackdError::AlreadyExists(_, _)));

    // A discarded record's key is free for reuse.
    environment::discard_one(&db, &publisher, &first.id)
        .await
        .unwrap();
    let second = create_environment(&db, &publisher, "prod").await;
    assert_ne!(second.id, first.id);
}

#[tokio::test]
async fn test_discard_twice_fails_with_not_found() {
    let db = setup_db().await;
    let publisher = BroadcastEventPublisher::new(64);

    let env = create_environment(&db, &publisher, "staging").await;
    environment::discard_one(&db, &publisher, &env.id)
        .await
        .unwrap();

    let err = environment::discard_one(&db, &publisher, &env.id)
        .await
        .unwrap_err();
    assert!(matches!(kind_of(&err), RackdError::NotFound(_, _)));

    let err = environment::find_one(&db, &env.id).await.unwrap_err();
    assert!(matches!(kind_of(&err), RackdError::NotFound(_, _)));
}

#[tokio::test]
async fn test_find_many_without_per_page_returns_everything() {
    let db = setup_db().await;
    let publisher = BroadcastEventPublisher::new(64);

    for i in 0..7 {
        create_environment(&db, &publisher, &format!("env-{}", i)).await;
    }

    let page = environment::find_many(&db, &list(&[])).await.unwrap();
    assert_eq!(page.total_count, 7);
    assert_eq!(page.page_items.len(), 7);
    assert_eq!(page.pages_available, 1);
}

#[tokio::test]
async fn test_find_many_per_page_zero_returns_no_items_with_total() {
    let db = setup_db().await;
    let publisher = BroadcastEventPublisher::new(64);

    for i in 0..3 {
        create_environment(&db, &publisher, &format!("env-{}", i)).await;
    }

    let page = environment::find_many(&db, &list(&[("per_page", "0")]))
        .await
        .unwrap();
    assert_eq!(page.total_count, 3);
    assert!(page.page_items.is_empty());
}

#[tokio::test]
async fn test_page_union_covers_filtered_set_exactly() {
    let db = setup_db().await;
    let publisher = BroadcastEventPublisher::new(64);

    let mut all_ids = HashSet::new();
    for i in 0..5 {
        let env = create_environment(&db, &publisher, &format!("env-{}", i)).await;
        all_ids.insert(env.id);
    }

    let mut seen_ids = HashSet::new();
    let mut total_items = 0;
    for page_number in 1..=3 {
        let page = environment::find_many(
            &db,
            &list(&[
                ("per_page", "2"),
                ("page", &page_number.to_string()),
                ("sort", "name:asc"),
            ]),
        )
        .await
        .unwrap();
        assert_eq!(page.pages_available, 3);
        total_items += page.page_items.len();
        for item in page.page_items {
            assert!(seen_ids.insert(item.id), "duplicate row across pages");
        }
    }

    assert_eq!(total_items, 5);
    assert_eq!(seen_ids, all_ids);
}

#[tokio::test]
async fn test_sort_duplicate_field_first_wins() {
    let db = setup_db().await;
    let publisher = BroadcastEventPublisher::new(64);

    for name in ["charlie", "alpha", "bravo"] {
        create_environment(&db, &publisher, name).await;
    }

    let page = environment::find_many(&db, &list(&[("sort", "name:asc,name:desc")]))
        .await
        .unwrap();
    let names: Vec<String> = page.page_items.into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["alpha", "bravo", "charlie"]);
}

#[tokio::test]
async fn test_lk_filter_is_case_insensitive() {
    let db = setup_db().await;
    let publisher = BroadcastEventPublisher::new(64);

    create_environment(&db, &publisher, "Production").await;
    create_environment(&db, &publisher, "staging").await;

    let page = environment::find_many(&db, &list(&[("name", "lk:PROD")]))
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.page_items[0].name, "Production");
}

#[tokio::test]
async fn test_unknown_filter_field_rejects_request() {
    let db = setup_db().await;
    let publisher = BroadcastEventPublisher::new(64);
    create_environment(&db, &publisher, "prod").await;

    let err = environment::find_many(&db, &list(&[("flavor", "eq:salty")]))
        .await
        .unwrap_err();
    assert!(matches!(kind_of(&err), RackdError::Filter(_)));
}

#[tokio::test]
async fn test_btw_on_numeric_field_is_inclusive() {
    let db = setup_db().await;
    let publisher = BroadcastEventPublisher::new(64);

    let srv = create_server_fixture(&db, &publisher, "web-1").await;
    let ct = connection_type::add_one(
        &db,
        &publisher,
        ConnectionTypeCreate {
            name: "SSH".to_string(),
        },
    )
    .await
    .unwrap();

    for port in [9, 10, 15, 20, 21] {
        credential::add_one(
            &db,
            &publisher,
            CredentialCreate {
                server_id: srv.id.clone(),
                connection_type_id: ct.id.clone(),
                username: format!("user-{}", port),
                password: "secret".to_string(),
                local_ip: Some("10.0.0.1".to_string()),
                local_port: Some(port),
                public_ip: None,
                public_port: None,
            },
        )
        .await
        .unwrap();
    }

    let page = credential::find_many(&db, &list(&[("local_port", "btw:10,20")]))
        .await
        .unwrap();
    assert_eq!(page.total_count, 3);
    let ports: HashSet<i32> = page
        .page_items
        .iter()
        .map(|c| c.local_port.unwrap())
        .collect();
    assert_eq!(ports, HashSet::from([10, 15, 20]));
}

#[tokio::test]
async fn test_update_fires_one_event_per_changed_field() {
    let db = setup_db().await;
    let publisher = BroadcastEventPublisher::new(64);

    let app = application::add_one(
        &db,
        &publisher,
        ApplicationCreate {
            name: "redis".to_string(),
            version: "7.2".to_string(),
            architect: "x86_64".to_string(),
        },
    )
    .await
    .unwrap();

    let mut receiver = publisher.subscribe();

    // Same version, new name: exactly one FieldChanged event.
    let updated = application::update_one(
        &db,
        &publisher,
        &app.id,
        ApplicationUpdate {
            name: Some("valkey".to_string()),
            version: Some("7.2".to_string()),
            architect: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.name, "valkey");

    let event = receiver.try_recv().unwrap();
    assert_eq!(
        event.kind,
        DomainEventKind::FieldChanged {
            field: "name".to_string()
        }
    );
    assert!(receiver.try_recv().is_err(), "no further events expected");

    // No-op update publishes nothing.
    application::update_one(&db, &publisher, &app.id, ApplicationUpdate::default())
        .await
        .unwrap();
    assert!(receiver.try_recv().is_err());
}

#[tokio::test]
async fn test_update_rename_collision() {
    let db = setup_db().await;
    let publisher = BroadcastEventPublisher::new(64);

    create_environment(&db, &publisher, "prod").await;
    let staging = create_environment(&db, &publisher, "staging").await;

    let err = environment::update_one(
        &db,
        &publisher,
        &staging.id,
        rackd_inventory::model::EnvironmentUpdate {
            name: Some("prod".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(kind_of(&err), RackdError::AlreadyExists(_, _)));
}

#[tokio::test]
async fn test_server_requires_existing_references() {
    let db = setup_db().await;
    let publisher = BroadcastEventPublisher::new(64);

    let err = server::add_one(
        &db,
        &publisher,
        ServerCreate {
            name: "web-1".to_string(),
            cpu: "4".to_string(),
            ram: "16GB".to_string(),
            hdd: "100GB".to_string(),
            status: None,
            environment_id: "missing".to_string(),
            operating_system_id: "missing".to_string(),
            applications: None,
        },
    )
    .await
    .unwrap_err();

    match kind_of(&err) {
        RackdError::NotFound(entity, _) => assert_eq!(entity, "environment"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_server_rejects_invalid_status() {
    let db = setup_db().await;
    let publisher = BroadcastEventPublisher::new(64);

    let env = create_environment(&db, &publisher, "prod").await;
    let os = operating_system::add_one(
        &db,
        &publisher,
        OperatingSystemCreate {
            name: "Ubuntu".to_string(),
            version: "22.04".to_string(),
            architect: "x86_64".to_string(),
        },
    )
    .await
    .unwrap();

    let err = server::add_one(
        &db,
        &publisher,
        ServerCreate {
            name: "web-1".to_string(),
            cpu: "4".to_string(),
            ram: "16GB".to_string(),
            hdd: "100GB".to_string(),
            status: Some("online".to_string()),
            environment_id: env.id,
            operating_system_id: os.id,
            applications: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(kind_of(&err), RackdError::IllegalArgument(_)));
}

#[tokio::test]
async fn test_server_application_associations() {
    let db = setup_db().await;
    let publisher = BroadcastEventPublisher::new(64);

    let srv = create_server_fixture(&db, &publisher, "app-host").await;
    let app = application::add_one(
        &db,
        &publisher,
        ApplicationCreate {
            name: "nginx".to_string(),
            version: "1.27".to_string(),
            architect: "x86_64".to_string(),
        },
    )
    .await
    .unwrap();

    let updated = server::update_one(
        &db,
        &publisher,
        &srv.id,
        ServerUpdate {
            applications: Some(vec![ServerApplicationInput {
                application_id: app.id.clone(),
                install_dir: "/opt/nginx".to_string(),
                log_dir: "/var/log/nginx".to_string(),
            }]),
            ..ServerUpdate::default()
        },
    )
    .await
    .unwrap();

    let applications = updated.applications.unwrap();
    assert_eq!(applications.len(), 1);
    assert_eq!(applications[0].application_id, app.id);
    assert_eq!(applications[0].install_dir, "/opt/nginx");

    // Replacing with an empty set clears the association table.
    let cleared = server::update_one(
        &db,
        &publisher,
        &srv.id,
        ServerUpdate {
            applications: Some(vec![]),
            ..ServerUpdate::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cleared.applications.unwrap().len(), 0);
}

#[tokio::test]
async fn test_server_field_selection_controls_relation_loading() {
    let db = setup_db().await;
    let publisher = BroadcastEventPublisher::new(64);
    create_server_fixture(&db, &publisher, "web-1").await;

    // Scalar-only selection: relations are not loaded.
    let page = server::find_many(&db, &list(&[("fields", "name")]))
        .await
        .unwrap();
    assert!(page.page_items[0].credentials.is_none());
    assert!(page.page_items[0].applications.is_none());

    // Explicitly requested relation is loaded.
    let page = server::find_many(&db, &list(&[("fields", "name,credentials")]))
        .await
        .unwrap();
    assert!(page.page_items[0].credentials.is_some());
    assert!(page.page_items[0].applications.is_none());

    // No selection: everything is loaded.
    let page = server::find_many(&db, &list(&[])).await.unwrap();
    assert!(page.page_items[0].credentials.is_some());
    assert!(page.page_items[0].applications.is_some());

    // Unknown selection entries reject the request.
    let err = server::find_many(&db, &list(&[("fields", "name,bogus")]))
        .await
        .unwrap_err();
    assert!(matches!(kind_of(&err), RackdError::Filter(_)));
}
