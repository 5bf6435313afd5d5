//! Application endpoints

use actix_web::{HttpRequest, HttpResponse, Responder, Scope, delete, get, post, put, web};

use rackd_api::ListRequest;
use rackd_inventory::model::{ApplicationCreate, ApplicationUpdate};
use rackd_inventory::service::application;

use crate::api::model::{page_response, query_pairs};
use crate::model::app_state::AppState;
use crate::model::response::{Detail, error_response, rackd_error_response};

#[get("")]
pub async fn list_applications(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let pairs = match query_pairs(req.query_string()) {
        Ok(pairs) => pairs,
        Err(err) => return rackd_error_response(&err),
    };
    let request = match ListRequest::parse(&pairs) {
        Ok(request) => request,
        Err(err) => return rackd_error_response(&err),
    };

    match application::find_many(&state.database_connection, &request).await {
        Ok(page) => page_response(req.path(), &pairs, &request, page),
        Err(err) => error_response(&err),
    }
}

#[get("/{id}")]
pub async fn get_application(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    match application::find_one(&state.database_connection, path.as_str()).await {
        Ok(dto) => HttpResponse::Ok().json(dto),
        Err(err) => error_response(&err),
    }
}

#[post("")]
pub async fn create_application(
    state: web::Data<AppState>,
    payload: web::Json<ApplicationCreate>,
) -> impl Responder {
    match application::add_one(
        &state.database_connection,
        state.event_publisher.as_ref(),
        payload.into_inner(),
    )
    .await
    {
        Ok(dto) => HttpResponse::Created().json(dto),
        Err(err) => error_response(&err),
    }
}

#[put("/{id}")]
pub async fn update_application(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<ApplicationUpdate>,
) -> impl Responder {
    match application::update_one(
        &state.database_connection,
        state.event_publisher.as_ref(),
        path.as_str(),
        payload.into_inner(),
    )
    .await
    {
        Ok(dto) => HttpResponse::Ok().json(dto),
        Err(err) => error_response(&err),
    }
}

#[delete("/{id}")]
pub async fn delete_application(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    match application::discard_one(
        &state.database_connection,
        state.event_publisher.as_ref(),
        path.as_str(),
    )
    .await
    {
        Ok(()) => Detail::http_ok(format!("application '{}' discarded", path.as_str())),
        Err(err) => error_response(&err),
    }
}

pub fn routes() -> Scope {
    web::scope("/application/applications")
        .service(list_applications)
        .service(get_application)
        .service(create_application)
        .service(update_application)
        .service(delete_application)
}
