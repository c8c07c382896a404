use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// JSON error body: `{ "status": 404, "error": "Not Found", "message": "..." }`.
#[derive(Debug, Serialize)]
pub struct JsonApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &str, message: Option<String>) -> Self {
        Self { status, error: error.to_string(), message }
    }

    pub fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some("Authentication required".into()))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(message.into()))
    }

    fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "status": self.status.as_u16(),
            "error": self.error,
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        if e.is_persistence() {
            error!(err = %e, "persistence failure");
            return Self::internal();
        }
        match e {
            ServiceError::Validation(m) => Self::bad_request(m),
            ServiceError::Model(models::errors::ModelError::Validation(m)) => Self::bad_request(m),
            ServiceError::Conflict(m) => Self::new(StatusCode::BAD_REQUEST, "Conflict", Some(m)),
            ServiceError::NotFound(m) => Self::new(StatusCode::NOT_FOUND, "Not Found", Some(m)),
            ServiceError::Forbidden => Self::new(StatusCode::FORBIDDEN, "Forbidden", Some("Not allowed".into())),
            ServiceError::Unauthenticated => Self::unauthenticated(),
            ServiceError::Payment(m) => {
                error!(err = %m, "payment provider failure");
                Self::new(StatusCode::BAD_GATEWAY, "Payment Provider Error", None)
            }
            other => {
                error!(err = %other, "unmapped service error");
                Self::internal()
            }
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(m) => Self::bad_request(m),
            AuthError::Conflict(m) => Self::new(StatusCode::BAD_REQUEST, "Conflict", Some(m)),
            AuthError::NotFound => Self::new(StatusCode::NOT_FOUND, "Not Found", Some("User not found".into())),
            AuthError::Unauthorized | AuthError::TokenError(_) => {
                Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some("Invalid credentials".into()))
            }
            other => {
                error!(code = other.code(), err = %other, "auth failure");
                Self::internal()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_status() {
        let cases = [
            (ServiceError::Validation("name: required".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Conflict("dup".into()), StatusCode::BAD_REQUEST),
            (ServiceError::not_found("Business"), StatusCode::NOT_FOUND),
            (ServiceError::Forbidden, StatusCode::FORBIDDEN),
            (ServiceError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (ServiceError::Db("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::Payment("down".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
    }

    #[test]
    fn persistence_detail_is_not_returned() {
        let e = JsonApiError::from(ServiceError::Db("relation businesses does not exist".into()));
        assert!(e.message.is_none());
        let e = JsonApiError::from(ServiceError::Model(models::errors::ModelError::Db("disk I/O error".into())));
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(e.message.is_none());
    }
}
