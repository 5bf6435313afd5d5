//! Error types for rackd
//!
//! This module defines:
//! - `RackdError`: Application-specific error enum
//! - `AppError`: Wrapper for integration with web frameworks

use std::fmt::{Display, Formatter};

/// Application-specific error types
#[derive(thiserror::Error, Debug)]
pub enum RackdError {
    #[error("caused: {0}")]
    IllegalArgument(String),

    #[error("{0} '{1}' not found")]
    NotFound(String, String),

    #[error("{0} '{1}' already exists")]
    AlreadyExists(String, String),

    #[error("{0} '{1}' is discarded and rejects mutation")]
    EntityDiscarded(String, String),

    #[error("pagination error: {0}")]
    Pagination(String),

    #[error("sort error: {0}")]
    Sort(String),

    #[error("filter error: {0}")]
    Filter(String),

    #[error("authentication error: {0}")]
    Authentication(String),

    #[error("database error: {0}")]
    Database(String),
}

impl RackdError {
    /// HTTP status code each error kind translates to at the router boundary.
    ///
    /// Every error is terminal for the request; nothing is retried.
    pub fn status_code(&self) -> u16 {
        match self {
            RackdError::NotFound(_, _) => 404,
            RackdError::AlreadyExists(_, _) | RackdError::EntityDiscarded(_, _) => 422,
            RackdError::Pagination(_)
            | RackdError::Sort(_)
            | RackdError::Filter(_)
            | RackdError::IllegalArgument(_) => 400,
            RackdError::Authentication(_) => 403,
            RackdError::Database(_) => 500,
        }
    }
}

/// Wrapper for application errors
#[derive(Debug)]
pub struct AppError {
    inner: anyhow::Error,
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError { inner: value }
    }
}

impl AppError {
    pub fn inner(&self) -> &anyhow::Error {
        &self.inner
    }

    pub fn downcast_ref<E: std::error::Error + Send + Sync + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RackdError::NotFound("server".to_string(), "abc123".to_string());
        assert_eq!(format!("{}", err), "server 'abc123' not found");

        let err = RackdError::AlreadyExists("environment".to_string(), "prod".to_string());
        assert_eq!(format!("{}", err), "environment 'prod' already exists");

        let err = RackdError::Filter("unknown operator 'xx'".to_string());
        assert_eq!(format!("{}", err), "filter error: unknown operator 'xx'");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            RackdError::NotFound("a".into(), "b".into()).status_code(),
            404
        );
        assert_eq!(
            RackdError::AlreadyExists("a".into(), "b".into()).status_code(),
            422
        );
        assert_eq!(RackdError::Pagination("x".into()).status_code(), 400);
        assert_eq!(RackdError::Sort("x".into()).status_code(), 400);
        assert_eq!(RackdError::Filter("x".into()).status_code(), 400);
        assert_eq!(RackdError::Authentication("x".into()).status_code(), 403);
    }

    #[test]
    fn test_app_error_downcast() {
        let app_err = AppError::from(anyhow::Error::new(RackdError::Sort("bad".to_string())));
        assert!(app_err.downcast_ref::<RackdError>().is_some());
        assert_eq!(format!("{}", app_err), "sort error: bad");
    }
}
