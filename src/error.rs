//! Domain error types for the video feedback server.
//!
//! Every failure a handler can produce is one of these variants; the
//! `ResponseError` impl maps it to a status code and the JSON error envelope.

use std::collections::BTreeMap;
use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use utoipa::ToSchema;

/// Message returned for every unauthenticated request.
pub const AUTHENTICATION_REQUIRED: &str = "Authentication required.";

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or missing input, optionally with per-field messages.
    #[error("{message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, Vec<String>>,
    },

    /// No identity could be resolved from the request.
    #[error("{}", AUTHENTICATION_REQUIRED)]
    Unauthenticated,

    /// Sign-in with an unknown email or a wrong password.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// Identity resolved but its role is not allowed to perform the action.
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Uniqueness violation.
    #[error("{0}")]
    Conflict(String),

    /// Object store or chat provider call failed.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Required configuration is absent at request time.
    #[error("Server misconfigured: {0}")]
    Misconfigured(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Anything else.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation failure without field details.
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Validation failure attributed to a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut fields = BTreeMap::new();
        fields.insert(field.to_string(), vec![message.clone()]);
        AppError::Validation { message, fields }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::Unauthenticated | AppError::InvalidCredentials => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            AppError::Misconfigured(_) => "SERVER_MISCONFIGURED",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ExternalService(_)
            | AppError::Misconfigured(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (message, details) = match self {
            AppError::Validation { fields, .. } => (
                self.to_string(),
                (!fields.is_empty()).then(|| fields.clone()),
            ),
            AppError::ExternalService(detail) => {
                tracing::error!("External service error: {}", detail);
                (
                    "An upstream service request failed".to_string(),
                    None,
                )
            }
            AppError::Misconfigured(detail) => {
                tracing::error!("Server misconfigured: {}", detail);
                (self.to_string(), None)
            }
            AppError::Database(detail) => {
                tracing::error!("Database error: {}", detail);
                ("An internal database error occurred".to_string(), None)
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ("An unexpected error occurred".to_string(), None)
            }
            _ => (self.to_string(), None),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.code().to_string(),
            message,
            details,
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Field-level validation messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, Vec<String>>>,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::invalid(format!("JSON parsing error: {}", err))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        if let Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return AppError::Conflict(format!("Duplicate record: {}", detail));
        }
        match err {
            sea_orm::DbErr::RecordNotFound(what) => AppError::NotFound(what),
            other => AppError::Database(other.to_string()),
        }
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::invalid(format!("Invalid UUID: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: BTreeMap<String, Vec<String>> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{} is invalid ({})", field, e.code))
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        let summary = fields.keys().cloned().collect::<Vec<_>>().join(", ");
        AppError::Validation {
            message: format!("Invalid input: {}", summary),
            fields,
        }
    }
}

/// Map actix JSON body errors into the common envelope.
pub fn json_error_handler(
    err: actix_web::error::JsonPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    AppError::invalid(format!("Invalid request body: {}", err)).into()
}

/// Map actix path extraction errors into the common envelope.
pub fn path_error_handler(
    err: actix_web::error::PathError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    AppError::invalid(format!("Invalid path parameter: {}", err)).into()
}

/// Map actix query extraction errors into the common envelope.
pub fn query_error_handler(
    err: actix_web::error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    AppError::invalid(format!("Invalid query string: {}", err)).into()
}
