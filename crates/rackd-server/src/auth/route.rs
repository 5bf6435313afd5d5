//! Login endpoint

use actix_web::{HttpResponse, Responder, Scope, post, web};
use tracing::warn;

use crate::model::app_state::AppState;
use crate::model::response::Detail;

use super::model::{LoginRequest, LoginResponse};
use super::service::encode_jwt_token;

#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> impl Responder {
    let username_ok = payload.username == state.configuration.auth_username();
    let password_ok =
        bcrypt::verify(&payload.password, &state.auth_password_hash).unwrap_or(false);

    if !username_ok || !password_ok {
        warn!(username = %payload.username, "rejected login attempt");
        return Detail::http_response(403, "authentication error: unknown user or wrong password");
    }

    let token_ttl = state.configuration.token_expire_seconds();
    match encode_jwt_token(
        &payload.username,
        &state.configuration.token_secret_key(),
        token_ttl,
    ) {
        Ok(access_token) => HttpResponse::Ok().json(LoginResponse {
            access_token,
            token_ttl,
        }),
        Err(err) => Detail::http_response(500, format!("failed to issue token: {}", err)),
    }
}

pub fn routes() -> Scope {
    web::scope("/auth").service(login)
}
