//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// One offending field from schema validation.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by the identity and access-control collaborators.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("no valid session")]
    Unauthenticated,
    #[error("access denied")]
    Forbidden,
    #[error("identity provider: {0}")]
    Provider(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("no valid session")]
    Unauthenticated,
    #[error("forbidden")]
    Forbidden,
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("constraint violation: {0}")]
    Constraint(String),
    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Unauthenticated => AppError::Unauthenticated,
            AuthError::Forbidden => AppError::Forbidden,
            AuthError::Provider(msg) => {
                tracing::error!(error = %msg, "identity provider failure");
                AppError::Unauthenticated
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

#[derive(Serialize)]
struct MethodNotAllowedBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // 405 keeps the flat { message } body the admin frontend expects.
        if let AppError::MethodNotAllowed(_) = &self {
            return (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(MethodNotAllowedBody {
                    message: self.to_string(),
                }),
            )
                .into_response();
        }

        let (status, code, details) = match &self {
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated", None),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", None),
            AppError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                serde_json::to_value(fields).ok(),
            ),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", None),
            AppError::Constraint(_) => (StatusCode::CONFLICT, "constraint_violation", None),
            AppError::MethodNotAllowed(_) => unreachable!(),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request", None),
            AppError::Db(e) => {
                if matches!(e, sqlx::Error::RowNotFound) {
                    (StatusCode::NOT_FOUND, "not_found", None)
                } else {
                    tracing::error!(error = %e, "unexpected database error");
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
                }
            }
        };
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };
        (status, Json(body)).into_response()
    }
}
