//! HTTP API tests against an in-memory SQLite database.

use std::sync::Arc;

use actix_web::{App, test, web};
use serde_json::{Value, json};

use rackd_inventory::events::{BroadcastEventPublisher, EventPublisher};
use rackd_migration::{Migrator, MigratorTrait};
use rackd_persistence::sea_orm::{ConnectOptions, Database};
use rackd_server::{
    api, auth,
    middleware::auth::Authentication,
    model::{app_state::AppState, config::Configuration},
};

async fn test_state() -> Arc<AppState> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let event_publisher: Arc<dyn EventPublisher> = Arc::new(BroadcastEventPublisher::new(64));
    // Low cost keeps the test suite fast.
    let auth_password_hash = bcrypt::hash("rackd", 4).unwrap();

    Arc::new(AppState {
        configuration: Configuration::default(),
        database_connection: db,
        event_publisher,
        auth_password_hash,
    })
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(Authentication)
                .app_data(web::Data::from($state.clone()))
                .service(
                    web::scope("")
                        .service(auth::route::routes())
                        .configure(api::v1::configure),
                ),
        )
        .await
    };
}

macro_rules! login_token {
    ($app:expr) => {{
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"username": "rackd", "password": "rackd"}))
            .to_request();
        let resp = test::call_service($app, req).await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        body["accessToken"].as_str().unwrap().to_string()
    }};
}

macro_rules! authed {
    ($method:ident, $uri:expr, $token:expr) => {
        test::TestRequest::$method()
            .uri($uri)
            .insert_header(("Authorization", format!("Bearer {}", $token)))
    };
}

#[actix_web::test]
async fn test_health_is_public() {
    let state = test_state().await;
    let app = init_app!(&state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn test_requests_without_token_are_rejected() {
    let state = test_state().await;
    let app = init_app!(&state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/environment/environments")
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 403);

    let body: Value = test::read_body_json(resp).await;
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .starts_with("authentication error")
    );
}

#[actix_web::test]
async fn test_login_rejects_wrong_password() {
    let state = test_state().await;
    let app = init_app!(&state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({"username": "rackd", "password": "wrong"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 403);
}

#[actix_web::test]
async fn test_server_lifecycle_scenario() {
    let state = test_state().await;
    let app = init_app!(&state);
    let token = login_token!(&app);

    // Create environment
    let resp = test::call_service(
        &app,
        authed!(post, "/environment/environments", token)
            .set_json(json!({"name": "prod"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let environment: Value = test::read_body_json(resp).await;
    let environment_id = environment["id"].as_str().unwrap().to_string();

    // Create operating system
    let resp = test::call_service(
        &app,
        authed!(post, "/operating-system/operating-systems", token)
            .set_json(json!({"name": "Ubuntu", "version": "22.04", "architect": "x86_64"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let os: Value = test::read_body_json(resp).await;
    let os_id = os["id"].as_str().unwrap().to_string();

    // Create server
    let resp = test::call_service(
        &app,
        authed!(post, "/server/servers", token)
            .set_json(json!({
                "name": "web-1",
                "cpu": "4",
                "ram": "16GB",
                "hdd": "100GB",
                "environmentId": environment_id,
                "operatingSystemId": os_id
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let server: Value = test::read_body_json(resp).await;
    let server_id = server["id"].as_str().unwrap().to_string();
    assert_eq!(server["discarded"], json!(false));
    assert_eq!(server["name"], "web-1");

    // Filtered list finds exactly the one server
    let resp = test::call_service(
        &app,
        authed!(get, "/server/servers?name=eq:web-1", token).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let listed: Value = test::read_body_json(resp).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"].as_str().unwrap(), server_id);

    // Delete, then the id is gone
    let resp = test::call_service(
        &app,
        authed!(delete, &format!("/server/servers/{}", server_id), token).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let resp = test::call_service(
        &app,
        authed!(get, &format!("/server/servers/{}", server_id), token).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);

    // A second delete also misses
    let resp = test::call_service(
        &app,
        authed!(delete, &format!("/server/servers/{}", server_id), token).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_malformed_query_parts_return_400() {
    let state = test_state().await;
    let app = init_app!(&state);
    let token = login_token!(&app);

    for uri in [
        "/environment/environments?name=like:prod",
        "/environment/environments?sort=name",
        "/environment/environments?sort=name:up",
        "/environment/environments?page=zero",
        "/environment/environments?page=0",
        "/environment/environments?per_page=-1",
        "/environment/environments?flavor=eq:salty",
    ] {
        let resp = test::call_service(&app, authed!(get, uri, token).to_request()).await;
        assert_eq!(resp.status(), 400, "expected 400 for {}", uri);
    }
}

#[actix_web::test]
async fn test_duplicate_natural_key_returns_422() {
    let state = test_state().await;
    let app = init_app!(&state);
    let token = login_token!(&app);

    let resp = test::call_service(
        &app,
        authed!(post, "/environment/environments", token)
            .set_json(json!({"name": "prod"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);

    let resp = test::call_service(
        &app,
        authed!(post, "/environment/environments", token)
            .set_json(json!({"name": "prod"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 422);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().contains("already exists"));
}

#[actix_web::test]
async fn test_empty_page_returns_204() {
    let state = test_state().await;
    let app = init_app!(&state);
    let token = login_token!(&app);

    let resp = test::call_service(
        &app,
        authed!(get, "/environment/environments", token).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 204);
}

#[actix_web::test]
async fn test_pagination_link_header() {
    let state = test_state().await;
    let app = init_app!(&state);
    let token = login_token!(&app);

    for name in ["alpha", "bravo", "charlie"] {
        let resp = test::call_service(
            &app,
            authed!(post, "/environment/environments", token)
                .set_json(json!({"name": name}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 201);
    }

    let resp = test::call_service(
        &app,
        authed!(
            get,
            "/environment/environments?per_page=1&page=2&sort=name:asc",
            token
        )
        .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let link = resp
        .headers()
        .get("Link")
        .expect("Link header missing")
        .to_str()
        .unwrap()
        .to_string();
    assert!(link.contains("page=1>; rel=\"prev\""), "{}", link);
    assert!(link.contains("page=3>; rel=\"next\""), "{}", link);
    assert!(link.contains("rel=\"first\""), "{}", link);
    assert!(link.contains("page=3>; rel=\"last\""), "{}", link);

    let body: Value = test::read_body_json(resp).await;
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "bravo");
}

#[actix_web::test]
async fn test_field_selection_projects_scalar_fields() {
    let state = test_state().await;
    let app = init_app!(&state);
    let token = login_token!(&app);

    let resp = test::call_service(
        &app,
        authed!(post, "/environment/environments", token)
            .set_json(json!({"name": "prod"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);

    let resp = test::call_service(
        &app,
        authed!(get, "/environment/environments?fields=name", token).to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    let item = &body.as_array().unwrap()[0];
    let keys: Vec<&String> = item.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 2);
    assert!(item.get("id").is_some());
    assert!(item.get("name").is_some());
    assert!(item.get("discarded").is_none());
}

#[actix_web::test]
async fn test_update_applies_changes_and_rejects_rename_collision() {
    let state = test_state().await;
    let app = init_app!(&state);
    let token = login_token!(&app);

    let resp = test::call_service(
        &app,
        authed!(post, "/application/applications", token)
            .set_json(json!({"name": "nginx", "version": "1.27", "architect": "x86_64"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);

    let resp = test::call_service(
        &app,
        authed!(post, "/application/applications", token)
            .set_json(json!({"name": "redis", "version": "7.2", "architect": "x86_64"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let redis: Value = test::read_body_json(resp).await;
    let redis_id = redis["id"].as_str().unwrap().to_string();

    // Plain update succeeds
    let resp = test::call_service(
        &app,
        authed!(put, &format!("/application/applications/{}", redis_id), token)
            .set_json(json!({"version": "7.4"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["version"], "7.4");

    // Renaming onto an existing natural key is rejected
    let resp = test::call_service(
        &app,
        authed!(put, &format!("/application/applications/{}", redis_id), token)
            .set_json(json!({"name": "nginx", "version": "1.27"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 422);

    // Updating a missing id is a 404
    let resp = test::call_service(
        &app,
        authed!(put, "/application/applications/missing", token)
            .set_json(json!({"version": "9"}))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);
}
