//! v1 inventory endpoints

pub mod application;
pub mod connection_type;
pub mod credential;
pub mod environment;
pub mod health;
pub mod operating_system;
pub mod server;

use actix_web::web;

/// Register every inventory endpoint.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health::routes())
        .service(application::routes())
        .service(server::routes())
        .service(environment::routes())
        .service(operating_system::routes())
        .service(connection_type::routes())
        .service(credential::routes());
}
