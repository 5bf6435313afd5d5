// Authentication middleware
// Validates the bearer token on every request except login, health, and
// CORS preflight. A missing or rejected token terminates the request with
// 403 before it reaches a handler.

use actix_service::forward_ready;
use actix_utils::future::{Ready, ok};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web::Data,
};

use futures::future::LocalBoxFuture;

use crate::{auth, model::app_state::AppState, model::response::Detail};

const ACCESS_TOKEN: &str = "accessToken";
const AUTHORIZATION_HEADER: &str = "Authorization";
const BEARER_PREFIX: &str = "Bearer ";

// Paths served without a token.
const PUBLIC_SUFFIXES: &[&str] = &["/auth/login", "/health"];

// Authentication middleware transformer
pub struct Authentication;

impl<S, B> Transform<S, ServiceRequest> for Authentication
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthenticationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthenticationMiddleware { service })
    }
}

pub struct AuthenticationMiddleware<S> {
    service: S,
}

/// Extract token from request using 3 sources in priority order:
/// 1. `accessToken` HTTP header
/// 2. `Authorization: Bearer <token>` header
/// 3. `accessToken` query parameter
fn extract_token(req: &ServiceRequest) -> Option<String> {
    if let Some(header_val) = req.headers().get(ACCESS_TOKEN)
        && let Ok(s) = header_val.to_str()
    {
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }

    if let Some(header_val) = req.headers().get(AUTHORIZATION_HEADER)
        && let Ok(s) = header_val.to_str()
    {
        let trimmed = s.trim();
        if let Some(token) = trimmed.strip_prefix(BEARER_PREFIX) {
            let token = token.trim();
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    if let Some(query) = req.uri().query() {
        for pair in query.split('&') {
            if let Some((key, value)) = pair.split_once('=')
                && key == ACCESS_TOKEN
                && !value.is_empty()
            {
                return Some(value.to_string());
            }
        }
    }

    None
}

fn is_public(req: &ServiceRequest) -> bool {
    Method::OPTIONS == *req.method()
        || PUBLIC_SUFFIXES
            .iter()
            .any(|suffix| req.path().ends_with(suffix))
}

fn validate(req: &ServiceRequest) -> Result<(), String> {
    let token = match extract_token(req) {
        Some(token) => token,
        None => return Err("token missing".to_string()),
    };

    let secret_key = match req.app_data::<Data<AppState>>() {
        Some(app_state) => app_state.configuration.token_secret_key(),
        None => {
            tracing::error!("AppState not found in request app_data");
            return Err("server misconfigured".to_string());
        }
    };

    auth::service::decode_jwt_token_cached(&token, &secret_key)
        .map(|_| ())
        .map_err(|err| err.to_string())
}

impl<S, B> Service<ServiceRequest> for AuthenticationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !is_public(&req)
            && let Err(reason) = validate(&req)
        {
            let (request, _) = req.into_parts();
            let response = HttpResponse::Forbidden()
                .json(Detail::new(format!("authentication error: {}", reason)))
                .map_into_right_body();

            return Box::pin(async move { Ok(ServiceResponse::new(request, response)) });
        }

        let res = self.service.call(req);

        Box::pin(async move { res.await.map(ServiceResponse::map_into_left_body) })
    }
}
