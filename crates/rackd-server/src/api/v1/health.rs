//! Liveness endpoint

use actix_web::{HttpResponse, Responder, Scope, get, web};
use serde_json::json;

#[get("")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "UP"}))
}

pub fn routes() -> Scope {
    web::scope("/health").service(health)
}
