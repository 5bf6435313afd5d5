//! HTTP response types for the rackd server
//!
//! Every error surfaces to the caller as a JSON `detail` message with the
//! status code the error kind maps to; nothing is retried.

use actix_web::{HttpResponse, HttpResponseBuilder, http::StatusCode};
use serde::{Deserialize, Serialize};

use rackd_common::RackdError;

/// JSON `detail` body used for errors and confirmation messages
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Detail {
    pub detail: String,
}

impl Detail {
    pub fn new(detail: impl Into<String>) -> Self {
        Detail {
            detail: detail.into(),
        }
    }

    pub fn http_response(status: u16, detail: impl Into<String>) -> HttpResponse {
        HttpResponseBuilder::new(
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        )
        .json(Detail::new(detail))
    }

    pub fn http_ok(detail: impl Into<String>) -> HttpResponse {
        HttpResponse::Ok().json(Detail::new(detail))
    }
}

/// Map a domain error to its HTTP response.
pub fn rackd_error_response(err: &RackdError) -> HttpResponse {
    Detail::http_response(err.status_code(), err.to_string())
}

/// Map any service error to its HTTP response, downcasting to the domain
/// error when possible.
pub fn error_response(err: &anyhow::Error) -> HttpResponse {
    match err.downcast_ref::<RackdError>() {
        Some(domain_err) => rackd_error_response(domain_err),
        None => {
            tracing::error!("unhandled service error: {:#}", err);
            Detail::http_response(500, "internal server error")
        }
    }
}
